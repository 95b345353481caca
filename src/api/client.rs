use crate::api::models::Conversation;
use crate::app::ConnectionConfig;
use crate::error::{Error, Result};
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;
use url::Url;

#[derive(Clone)]
pub struct ApiClient {
    pub http: HttpClient,
}

impl ApiClient {
    pub fn new() -> Result<Self> {
        let http = HttpClient::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { http })
    }

    fn account_url(config: &ConnectionConfig, path: &str) -> Result<String> {
        let base = config.base_url.trim().trim_end_matches('/');
        Url::parse(base)?;
        Ok(format!("{}/api/v1/accounts/{}/{}", base, config.account_id.trim(), path))
    }

    /// Link to the conversation in the helpdesk web app.
    pub fn conversation_link(config: &ConnectionConfig, id: u64) -> String {
        format!(
            "{}/app/accounts/{}/conversations/{}",
            config.base_url.trim().trim_end_matches('/'),
            config.account_id.trim(),
            id
        )
    }

    /// Fetch the account's conversation list. The payload may arrive bare or
    /// wrapped in `data`.
    pub async fn conversations(&self, config: &ConnectionConfig) -> Result<Vec<Conversation>> {
        if !config.is_complete() {
            return Err(Error::IncompleteConfig);
        }
        let endpoint = Self::account_url(config, "conversations")?;
        let resp = self
            .http
            .get(&endpoint)
            .header("api_access_token", config.api_token.trim())
            .header("Content-Type", "application/json")
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::Status(resp.status()));
        }
        let json: Value = resp.json().await.map_err(|e| Error::Decode(e.to_string()))?;
        let payload = json
            .get("payload")
            .or_else(|| json.get("data").and_then(|d| d.get("payload")))
            .cloned()
            .ok_or(Error::MissingPayload)?;
        let out: Vec<Conversation> = serde_json::from_value(payload).map_err(|e| Error::Decode(e.to_string()))?;
        log::debug!("fetched {} conversations from {}", out.len(), endpoint);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned response and hand back the raw request head.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut head = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                head.extend_from_slice(&buf[..n]);
                if n == 0 || head.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let resp = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(resp.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&head).to_string()
        });
        (format!("http://{}/", addr), handle)
    }

    fn config(base_url: String) -> ConnectionConfig {
        ConnectionConfig {
            base_url,
            account_id: "42".into(),
            api_token: "secret-token".into(),
        }
    }

    #[tokio::test]
    async fn fetches_payload_with_token_header() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"payload":[{"id":1,"labels":["todo"],"meta":{"sender":{"name":"Ana","email":"ana@x.io"}},"messages_count":2,"timestamp":1700000000}]}"#,
        )
        .await;
        let client = ApiClient::new().unwrap();
        let convs = client.conversations(&config(base)).await.unwrap();
        assert_eq!(convs.len(), 1);
        assert_eq!(convs[0].labels, vec!["todo".to_string()]);
        assert_eq!(convs[0].meta.sender.email.as_deref(), Some("ana@x.io"));

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /api/v1/accounts/42/conversations HTTP/1.1"), "{}", head);
        assert!(head.to_lowercase().contains("api_access_token: secret-token"));
    }

    #[tokio::test]
    async fn null_record_fields_do_not_fail_the_fetch() {
        let (base, _server) = serve_once(
            "200 OK",
            r#"{"data":{"payload":[{"id":1,"labels":null,"messages":null,"meta":{"sender":null}},{"id":2,"labels":["done"]}]}}"#,
        )
        .await;
        let client = ApiClient::new().unwrap();
        let convs = client.conversations(&config(base)).await.unwrap();
        assert_eq!(convs.len(), 2);
        assert!(convs[0].labels.is_empty());
        assert!(convs[0].messages.is_empty());
        assert_eq!(convs[1].labels, vec!["done".to_string()]);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base, _server) = serve_once("401 Unauthorized", r#"{"error":"nope"}"#).await;
        let client = ApiClient::new().unwrap();
        let err = client.conversations(&config(base)).await.unwrap_err();
        assert!(matches!(err, Error::Status(s) if s.as_u16() == 401));
    }

    #[tokio::test]
    async fn missing_payload_is_an_error() {
        let (base, _server) = serve_once("200 OK", r#"{"meta":{}}"#).await;
        let client = ApiClient::new().unwrap();
        let err = client.conversations(&config(base)).await.unwrap_err();
        assert!(matches!(err, Error::MissingPayload));
    }

    #[tokio::test]
    async fn incomplete_config_never_hits_the_network() {
        let client = ApiClient::new().unwrap();
        let mut cfg = config("http://127.0.0.1:9".into());
        cfg.api_token.clear();
        assert!(matches!(client.conversations(&cfg).await, Err(Error::IncompleteConfig)));
    }

    #[test]
    fn conversation_link_points_at_web_app() {
        let cfg = config("https://chat.example.com/".into());
        assert_eq!(
            ApiClient::conversation_link(&cfg, 17),
            "https://chat.example.com/app/accounts/42/conversations/17"
        );
    }
}
