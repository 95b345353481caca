use crate::api::client::ApiClient;
use crate::error::{Error, Result};
use crate::identity::{Identity, IdentityProvider, LocalIdentityProvider, bootstrap_identity};
use crate::storage::{BoardStore, SqliteBoardStore, board_namespace, default_db_path};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const SETTINGS_KEY: &str = "cw_kanban_config";
pub const DEFAULT_APP_ID: &str = "chatwoot-kanban-sync";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "example", "ChatwootKanban")
}

/// Helpdesk connection settings, stored as one JSON blob.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub account_id: String,
}

impl ConnectionConfig {
    pub fn is_complete(&self) -> bool {
        [&self.base_url, &self.api_token, &self.account_id]
            .iter()
            .all(|v| !v.trim().is_empty())
    }

    pub fn default_path() -> Option<PathBuf> {
        Some(project_dirs()?.config_dir().join(format!("{}.json", SETTINGS_KEY)))
    }

    /// Missing or unreadable settings both come back as `None` so the caller
    /// can route to the configuration form.
    pub fn load(path: &Path) -> Option<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("could not read {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice::<ConnectionConfig>(&bytes) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("ignoring malformed settings in {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }
}

/// Configuration injected at startup for the identity and board store clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    #[serde(default = "default_app_id")]
    pub app_id: String,
    #[serde(default)]
    pub initial_auth_token: Option<String>,
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

fn default_app_id() -> String {
    DEFAULT_APP_ID.to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            initial_auth_token: None,
            store_path: None,
        }
    }
}

impl RuntimeConfig {
    pub fn default_path() -> Option<PathBuf> {
        Some(project_dirs()?.config_dir().join("runtime.toml"))
    }

    /// A missing file means defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Client handles created once at startup and passed to whoever needs them.
#[derive(Clone)]
pub struct ClientContext {
    pub runtime: RuntimeConfig,
    pub identity: Option<Identity>,
    pub boards: Arc<dyn BoardStore>,
    pub api: ApiClient,
    pub settings_path: PathBuf,
}

impl ClientContext {
    pub fn new(
        runtime: RuntimeConfig,
        identity_provider: &dyn IdentityProvider,
        boards: Arc<dyn BoardStore>,
        api: ApiClient,
        settings_path: PathBuf,
    ) -> Self {
        let identity = bootstrap_identity(identity_provider, runtime.initial_auth_token.as_deref());
        Self {
            runtime,
            identity,
            boards,
            api,
            settings_path,
        }
    }

    /// Build the context from on-disk runtime config, overriding file
    /// locations when given.
    pub fn from_paths(runtime_path: Option<&Path>, settings_path: Option<&Path>) -> Result<Self> {
        let runtime = match runtime_path.map(Path::to_path_buf).or_else(RuntimeConfig::default_path) {
            Some(path) => RuntimeConfig::load(&path)?,
            None => RuntimeConfig::default(),
        };
        let store_path = runtime
            .store_path
            .clone()
            .or_else(default_db_path)
            .ok_or_else(|| Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "No data dir")))?;
        let settings_path = settings_path
            .map(Path::to_path_buf)
            .or_else(ConnectionConfig::default_path)
            .ok_or_else(|| Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "No config dir")))?;
        let boards: Arc<dyn BoardStore> = Arc::new(SqliteBoardStore::open(&store_path)?);
        Ok(Self::new(runtime, &LocalIdentityProvider, boards, ApiClient::new()?, settings_path))
    }

    pub fn namespace(&self) -> String {
        board_namespace(&self.runtime.app_id)
    }

    pub fn load_settings(&self) -> Option<ConnectionConfig> {
        ConnectionConfig::load(&self.settings_path)
    }

    pub fn save_settings(&self, config: &ConnectionConfig) -> Result<()> {
        config.save(&self.settings_path)?;
        log::info!("saved connection settings to {}", self.settings_path.display());
        Ok(())
    }
}
