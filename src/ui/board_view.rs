use crate::api::client::ApiClient;
use crate::api::models::Conversation;
use crate::app::ConnectionConfig;
use crate::dashboard::Dashboard;
use chrono::{DateTime, Local};
use std::fmt::Write;

const PREVIEW_WIDTH: usize = 80;

pub fn render(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let title = dashboard
        .active_board()
        .map(|b| b.name.as_str())
        .unwrap_or("Select a board");
    let _ = write!(out, "== {}", title);
    if dashboard.is_loading() {
        out.push_str("  [syncing…]");
    }
    let _ = write!(out, "  {} conversations", dashboard.conversations().len());
    if let Some(cfg) = dashboard.config() {
        let _ = write!(out, "  account {}", cfg.account_id);
    }
    out.push('\n');
    if !dashboard.is_configured() {
        out.push_str("Not connected to the helpdesk. Run `configure` or press c.\n");
    }
    out.push('\n');
    out.push_str(&super::sidebar::render_sidebar(
        dashboard.boards(),
        dashboard.active_board().map(|b| b.id.as_str()),
    ));
    out.push('\n');

    if dashboard.active_board().is_none() {
        out.push_str("Create your first board to get started (press n).\n");
        return out;
    }
    let view = dashboard.kanban();
    if view.is_empty() {
        out.push_str("This board has no columns.\n");
        return out;
    }
    let _ = writeln!(out, "{} columns", view.len());
    let fallback = ConnectionConfig::default();
    let cfg = dashboard.config().unwrap_or(&fallback);
    for (column, cards) in view.iter() {
        let _ = writeln!(out, "--- {} ({}) ---", capitalize(column), cards.len());
        for conv in cards {
            out.push_str(&render_card(conv, cfg));
        }
        out.push('\n');
    }
    out
}

pub fn render_card(conv: &Conversation, cfg: &ConnectionConfig) -> String {
    let sender = &conv.meta.sender;
    let email = sender.email.as_deref().filter(|e| !e.is_empty()).unwrap_or("No email");
    let preview = conv.preview().map(|p| truncate(p, PREVIEW_WIDTH)).unwrap_or_else(|| "No recent messages...".into());
    let date = DateTime::from_timestamp(conv.timestamp, 0)
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".into());
    let agent = conv
        .meta
        .assignee
        .as_ref()
        .and_then(|a| a.avatar_url.as_deref())
        .unwrap_or("?");
    let mut out = String::new();
    let _ = writeln!(out, "  #{}  {} <{}>", conv.id, display_name(&sender.name), email);
    let _ = writeln!(out, "      {}", preview);
    let _ = writeln!(out, "      {} messages · {} · agent {}", conv.messages_count, date, agent);
    if cfg.is_complete() {
        let _ = writeln!(out, "      {}", ApiClient::conversation_link(cfg, conv.id));
    }
    out
}

fn display_name(name: &str) -> &str {
    if name.trim().is_empty() { "Unknown" } else { name }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= width {
        line.to_string()
    } else {
        let cut: String = line.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
