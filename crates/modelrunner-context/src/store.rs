//! Context metadata store

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{ContextError, Result};

/// Directory under the configuration directory holding context metadata
pub const CONTEXTS_DIR: &str = "contexts";

/// Subdirectory of [`CONTEXTS_DIR`] holding one directory per context
pub const META_DIR: &str = "meta";

/// Metadata file name inside each context directory
pub const META_FILE: &str = "meta.json";

/// Name of the endpoint the client connects through
pub const DOCKER_ENDPOINT: &str = "docker";

/// One endpoint of a context
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EndpointMeta {
    #[serde(default, rename = "Host", alias = "host")]
    pub host: String,

    #[serde(default, rename = "SkipTLSVerify", alias = "skipTLSVerify")]
    pub skip_tls_verify: bool,
}

/// Parsed `meta.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContextMetadata {
    #[serde(default, rename = "Name", alias = "name")]
    pub name: String,

    /// Free-form metadata such as `Description`
    #[serde(default, rename = "Metadata", alias = "metadata")]
    pub metadata: serde_json::Value,

    #[serde(default, rename = "Endpoints", alias = "endpoints")]
    pub endpoints: HashMap<String, EndpointMeta>,
}

impl ContextMetadata {
    /// Description from the free-form metadata, if any
    pub fn description(&self) -> Option<&str> {
        self.metadata.get("Description").and_then(|d| d.as_str())
    }

    /// Host of the `docker` endpoint, treating an empty host as unset
    pub fn docker_host(&self) -> Option<&str> {
        self.endpoints
            .get(DOCKER_ENDPOINT)
            .map(|e| e.host.as_str())
            .filter(|h| !h.is_empty())
    }
}

/// Read-only view over `<config_dir>/contexts/meta`
#[derive(Debug, Clone)]
pub struct ContextStore {
    root: PathBuf,
}

impl ContextStore {
    /// Store rooted at an explicit metadata directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store for the metadata directory under a configuration directory
    pub fn from_config_dir(config_dir: impl AsRef<Path>) -> Self {
        Self::new(config_dir.as_ref().join(CONTEXTS_DIR).join(META_DIR))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All contexts found under the root, in path order.
    ///
    /// Every directory below the root holding a `meta.json` counts, however deeply nested.
    /// A `meta.json` in the root itself is ignored. A missing root yields an empty list.
    pub fn list(&self) -> Result<Vec<ContextMetadata>> {
        if !self.root.exists() {
            debug!("Context metadata root {} does not exist", self.root.display());
            return Ok(Vec::new());
        }

        let mut contexts = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }

            let meta_path = entry.path().join(META_FILE);
            if !meta_path.is_file() {
                continue;
            }

            contexts.push(read_metadata(&meta_path)?);
        }

        debug!("Found {} contexts under {}", contexts.len(), self.root.display());
        Ok(contexts)
    }

    /// Host of the `docker` endpoint of the named context
    pub fn host_for(&self, name: &str) -> Result<String> {
        let contexts = self.list()?;
        let Some(context) = contexts.iter().find(|c| c.name == name) else {
            warn!("Context {} not found under {}", name, self.root.display());
            return Err(ContextError::HostNotSet);
        };

        context
            .docker_host()
            .map(str::to_string)
            .ok_or(ContextError::HostNotSet)
    }
}

fn read_metadata(path: &Path) -> Result<ContextMetadata> {
    let content = std::fs::read_to_string(path).map_err(|source| ContextError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ContextError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
