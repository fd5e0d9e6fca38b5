//! Client configuration and context resolution
//!
//! Answers one question for the model runner client: which endpoint should requests go to.
//! The answer comes from the current context, chosen from the environment and `config.json`,
//! and that context's metadata under `<config_dir>/contexts/meta`.

pub mod config;
pub mod error;
pub mod store;

pub use config::{config_dir, config_path, load, load_from_file, AuthConfig, DockerConfig};
pub use error::{ContextError, Result};
pub use store::{ContextMetadata, ContextStore, EndpointMeta};

use tracing::debug;

/// Environment variable naming an explicit daemon host
pub const ENV_HOST: &str = "DOCKER_HOST";

/// Environment variable selecting a context by name
pub const ENV_CONTEXT: &str = "DOCKER_CONTEXT";

/// Context used when nothing else is selected
pub const DEFAULT_CONTEXT: &str = "default";

/// Pick the context name from its inputs.
///
/// An explicit host always means the default context. Then an explicit context name, then the
/// configuration's `currentContext`. `None` for `config` means it could not be loaded.
pub fn resolve_context_name(
    config: Option<&DockerConfig>,
    docker_host: Option<&str>,
    docker_context: Option<&str>,
) -> String {
    let Some(config) = config else {
        return DEFAULT_CONTEXT.to_string();
    };

    if docker_host.is_some_and(|h| !h.is_empty()) {
        return DEFAULT_CONTEXT.to_string();
    }

    if let Some(name) = docker_context.filter(|c| !c.is_empty()) {
        return name.to_string();
    }

    config
        .current_context()
        .unwrap_or(DEFAULT_CONTEXT)
        .to_string()
}

/// Name of the current context
pub fn current_context() -> String {
    let loaded = match load() {
        Ok(config) => Some(config),
        Err(e) => {
            debug!("Client configuration unavailable, using default context: {}", e);
            None
        }
    };

    let host = config::non_empty_env(ENV_HOST);
    let context = config::non_empty_env(ENV_CONTEXT);
    resolve_context_name(loaded.as_ref(), host.as_deref(), context.as_deref())
}

/// Endpoint host of the current context
pub fn current_host() -> Result<String> {
    let name = current_context();
    let store = ContextStore::from_config_dir(config_dir()?);
    debug!("Resolving host for context {}", name);
    store.host_for(&name)
}
