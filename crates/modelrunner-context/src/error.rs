//! Context error types

use std::path::PathBuf;

use thiserror::Error;

/// Context result type
pub type Result<T> = std::result::Result<T, ContextError>;

/// Errors raised while loading the client configuration or resolving a context
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unmarshal DOCKER_AUTH_CONFIG: {0}")]
    AuthConfigEnv(#[source] serde_json::Error),

    #[error("Could not determine user home directory")]
    HomeDirNotFound,

    #[error("Failed to walk context metadata: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Docker host not set in Docker context")]
    HostNotSet,
}
