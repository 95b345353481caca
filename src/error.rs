use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("could not decode conversations: {0}")]
    Decode(String),
    #[error("response carried no conversation payload")]
    MissingPayload,
    #[error("connection settings are incomplete")]
    IncompleteConfig,
    #[error("board store: {0}")]
    Store(#[from] rusqlite::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("runtime config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid board: {0}")]
    InvalidBoard(&'static str),
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
    #[error("prompt aborted: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
