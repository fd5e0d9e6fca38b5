//! Client configuration file (`config.json`) loading

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ContextError, Result};

/// Environment variable overriding the configuration directory
pub const ENV_CONFIG_DIR: &str = "DOCKER_CONFIG";

/// Environment variable carrying a complete configuration document inline
pub const ENV_AUTH_CONFIG: &str = "DOCKER_AUTH_CONFIG";

/// Name of the configuration directory under the user's home
pub const CONFIG_DIR_NAME: &str = ".docker";

/// Name of the configuration file inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Registry credentials entry
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, rename = "serveraddress", skip_serializing_if = "Option::is_none")]
    pub server_address: Option<String>,
    #[serde(default, rename = "identitytoken", skip_serializing_if = "Option::is_none")]
    pub identity_token: Option<String>,
    #[serde(default, rename = "registrytoken", skip_serializing_if = "Option::is_none")]
    pub registry_token: Option<String>,
}

/// The client configuration document.
///
/// Only the fields this workspace reads are typed; everything else is kept in `extra`
/// so a load/save cycle does not drop settings owned by other tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DockerConfig {
    #[serde(default)]
    pub auths: HashMap<String, AuthConfig>,

    #[serde(default, rename = "credsStore", skip_serializing_if = "Option::is_none")]
    pub creds_store: Option<String>,

    #[serde(default, rename = "credHelpers", skip_serializing_if = "HashMap::is_empty")]
    pub cred_helpers: HashMap<String, String>,

    #[serde(default, rename = "currentContext", skip_serializing_if = "Option::is_none")]
    pub current_context: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DockerConfig {
    /// The configured current context, treating an empty string as unset
    pub fn current_context(&self) -> Option<&str> {
        self.current_context.as_deref().filter(|c| !c.is_empty())
    }
}

/// Directory holding the configuration files.
///
/// `DOCKER_CONFIG` wins when set; otherwise `<home>/.docker`.
pub fn config_dir() -> Result<PathBuf> {
    match non_empty_env(ENV_CONFIG_DIR) {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => dirs::home_dir()
            .map(|home| home.join(CONFIG_DIR_NAME))
            .ok_or(ContextError::HomeDirNotFound),
    }
}

/// Path to `config.json`
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the configuration.
///
/// Checked in order:
/// 1. `DOCKER_AUTH_CONFIG`, parsed as the whole document
/// 2. `config.json` inside [`config_dir`]
pub fn load() -> Result<DockerConfig> {
    if let Some(inline) = non_empty_env(ENV_AUTH_CONFIG) {
        debug!("Loading client configuration from {}", ENV_AUTH_CONFIG);
        return serde_json::from_str(&inline).map_err(ContextError::AuthConfigEnv);
    }

    load_from_file(config_path()?)
}

/// Load the configuration from an explicit file
pub fn load_from_file(path: impl AsRef<Path>) -> Result<DockerConfig> {
    let path = path.as_ref();
    debug!("Loading client configuration from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|source| ContextError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ContextError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
