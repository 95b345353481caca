mod api;
mod app;
mod board;
mod dashboard;
mod error;
mod identity;
mod storage;
mod sync;
mod ui;
mod utils;
mod view_model;

use crate::app::ClientContext;
use crate::board::NewBoard;
use crate::dashboard::{Dashboard, DashboardEvent};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "cw-kanban", version, about = "Kanban board over Chatwoot conversations, grouped by label")]
struct Cli {
    /// Runtime config (TOML) for the identity and board store clients
    #[arg(long, global = true)]
    runtime_config: Option<PathBuf>,
    /// Connection settings file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Enter the Chatwoot base URL, account and token
    Configure,
    /// Manage board definitions
    Boards {
        #[command(subcommand)]
        action: BoardsCmd,
    },
    /// Fetch conversations once and print the board
    Sync {
        #[arg(long)]
        board: Option<String>,
    },
    /// Live board: re-syncs every five minutes and reads commands from stdin
    Watch,
}

#[derive(Subcommand)]
enum BoardsCmd {
    List,
    Create {
        #[arg(long)]
        name: Option<String>,
        /// Column label; repeat for more columns
        #[arg(long = "column")]
        columns: Vec<String>,
    },
    Delete {
        id: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("failed to build Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = runtime.block_on(run(cli)) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = ClientContext::from_paths(cli.runtime_config.as_deref(), cli.settings.as_deref())?;
    match cli.command.unwrap_or(Cmd::Watch) {
        Cmd::Configure => {
            let cfg = ui::config_form::prompt_connection(ctx.load_settings().as_ref())?;
            ctx.save_settings(&cfg)?;
            println!("Saved.");
            Ok(())
        }
        Cmd::Boards { action } => boards(ctx, action),
        Cmd::Sync { board } => sync_once(ctx, board).await,
        Cmd::Watch => watch(ctx).await,
    }
}

/// Route to the configuration form when settings are missing or incomplete.
fn ensure_configured(ctx: &ClientContext) -> Result<()> {
    if ctx.load_settings().is_some_and(|c| c.is_complete()) {
        return Ok(());
    }
    let cfg = ui::config_form::prompt_connection(ctx.load_settings().as_ref())?;
    ctx.save_settings(&cfg)
}

fn boards(ctx: ClientContext, action: BoardsCmd) -> Result<()> {
    let mut dashboard = Dashboard::new(ctx);
    if dashboard.subscribe().is_none() {
        println!("Boards are unavailable without a signed-in identity.");
        return Ok(());
    }
    match action {
        BoardsCmd::List => {
            let ctx = dashboard.context();
            for board in ctx.boards.list(&ctx.namespace())? {
                println!(
                    "{}  {}  [{}]  {}",
                    board.id,
                    board.name,
                    board.columns.join(", "),
                    board.created_at.to_rfc3339()
                );
            }
        }
        BoardsCmd::Create { name, columns } => {
            let board = match name {
                Some(name) => Some(NewBoard::new(&name, columns.iter().flat_map(|c| utils::split_labels(c)))?),
                None => ui::board_form::prompt_new_board()?,
            };
            if let Some(created) = board.and_then(|b| dashboard.create_board(&b)) {
                println!("{}", created.id);
            }
        }
        BoardsCmd::Delete { id } => dashboard.delete_board(&id),
    }
    Ok(())
}

async fn sync_once(ctx: ClientContext, board: Option<String>) -> Result<()> {
    ensure_configured(&ctx)?;
    let mut dashboard = Dashboard::new(ctx);
    let _subscription = dashboard.subscribe();
    if let Some(id) = board.as_deref() {
        if !dashboard.select_id(id) {
            log::warn!("unknown board {}", id);
        }
    }
    let (tx, mut rx) = mpsc::unbounded_channel::<DashboardEvent>();
    if dashboard.request_sync(&tx).is_some() {
        if let Some(event) = rx.recv().await {
            dashboard.handle(event, &tx);
        }
    }
    print!("{}", ui::board_view::render(&dashboard));
    Ok(())
}

async fn watch(ctx: ClientContext) -> Result<()> {
    ensure_configured(&ctx)?;
    let dashboard = Dashboard::new(ctx);
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let _input = ui::input::spawn_input_thread(dashboard.config().cloned(), cmd_tx);
    println!("{}", ui::input::HELP);
    dashboard::run(dashboard, cmd_rx, |d| {
        println!("\n{}", ui::board_view::render(d));
    })
    .await;
    Ok(())
}
