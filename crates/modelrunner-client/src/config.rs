//! Client configuration

use std::path::Path;
use std::time::Duration;

use ::config::{Config, Environment, File};
use modelrunner_http::HttpConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{error::ClientError, Result};

/// Prefix for environment overrides (e.g., `MODEL_RUNNER_BASE_URL`)
pub const ENV_PREFIX: &str = "MODEL_RUNNER";

/// Base URL used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost";

/// Where and how the client connects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme, host and optional port; the experimental prefix is appended per request
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds. Unset leaves long pulls unbounded.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Load from an optional file plus `MODEL_RUNNER_*` environment variables.
    ///
    /// Environment values override the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!("Loading client configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(false));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        let config: ClientConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration targeting a context endpoint host.
    ///
    /// `tcp://` hosts are reached over plain HTTP. Socket and pipe hosts are rejected.
    pub fn from_host(host: &str) -> Result<Self> {
        let url = Url::parse(host)
            .map_err(|e| ClientError::Config(format!("invalid host {}: {}", host, e)))?;

        let scheme = match url.scheme() {
            "tcp" | "http" => "http",
            "https" => "https",
            other => {
                return Err(ClientError::Config(format!(
                    "unsupported host scheme {}: {}",
                    other, host
                )))
            }
        };

        let Some(hostname) = url.host_str() else {
            return Err(ClientError::Config(format!("host missing in {}", host)));
        };

        let base_url = match url.port() {
            Some(port) => format!("{}://{}:{}", scheme, hostname, port),
            None => format!("{}://{}", scheme, hostname),
        };

        Ok(Self {
            base_url,
            ..Default::default()
        })
    }

    /// Configuration for the endpoint of the current context
    pub fn from_context() -> Result<Self> {
        let host = modelrunner_context::current_host()?;
        debug!("Current context endpoint: {}", host);
        Self::from_host(&host)
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ClientError::Config("base URL is required".to_string()));
        }
        self.parsed_base_url().map(|_| ())
    }

    pub(crate) fn parsed_base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL {}: {}", self.base_url, e)))
    }

    /// HTTP settings for the production executor
    pub fn http_config(&self) -> HttpConfig {
        let mut http = HttpConfig::new();
        if let Some(secs) = self.timeout_secs {
            http = http.with_timeout(Duration::from_secs(secs));
        }
        if let Some(agent) = &self.user_agent {
            http = http.with_user_agent(agent.clone());
        }
        http
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
