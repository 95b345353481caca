use crate::app::ConnectionConfig;
use crate::error::Result;
use crate::utils::normalize_url;
use dialoguer::{Input, Password};

fn required(label: &'static str) -> impl Fn(&String) -> std::result::Result<(), String> {
    move |value: &String| {
        if value.trim().is_empty() {
            Err(format!("{} is required", label))
        } else {
            Ok(())
        }
    }
}

fn valid_base_url(value: &String) -> std::result::Result<(), String> {
    required("Base URL")(value)?;
    url::Url::parse(&normalize_url(value))
        .map(|_| ())
        .map_err(|e| format!("not a URL: {}", e))
}

/// Ask for the helpdesk connection. Current values are offered as defaults
/// except the token, which is always re-entered.
pub fn prompt_connection(current: Option<&ConnectionConfig>) -> Result<ConnectionConfig> {
    println!("Connect the board to Chatwoot");
    let mut base = Input::<String>::new()
        .with_prompt("Chatwoot base URL (e.g. https://app.chatwoot.com)")
        .validate_with(valid_base_url);
    let mut account = Input::<String>::new()
        .with_prompt("Account ID")
        .validate_with(required("Account ID"));
    if let Some(cfg) = current {
        if !cfg.base_url.is_empty() {
            base = base.default(cfg.base_url.clone());
        }
        if !cfg.account_id.is_empty() {
            account = account.default(cfg.account_id.clone());
        }
    }
    let base_url = normalize_url(&base.interact_text()?);
    let account_id = account.interact_text()?.trim().to_string();
    let api_token = Password::new()
        .with_prompt("API access token")
        .validate_with(|v: &String| required("API access token")(v))
        .interact()?
        .trim()
        .to_string();
    Ok(ConnectionConfig {
        base_url,
        api_token,
        account_id,
    })
}
