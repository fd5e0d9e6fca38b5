//! HTTP executor implementation

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Request, Response};
use tracing::debug;

use crate::{
    config::HttpConfig,
    error::{HttpError, Result},
};

/// Executes one prepared request.
///
/// Implementations must perform exactly one round trip and must not interpret the response
/// status: a 404 or a 503 is still `Ok(response)`. Only failures that produced no response at
/// all are errors.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response>;
}

/// Production executor backed by a pooled reqwest client
pub struct HttpClient {
    inner: reqwest::Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Create a new HTTP client with configuration
    pub fn new(config: HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if config.pool_enabled {
            builder = builder.pool_idle_timeout(config.pool_idle_timeout);
        } else {
            builder = builder.pool_max_idle_per_host(0);
        }

        let inner = builder
            .build()
            .map_err(|e| HttpError::BuildError(e.to_string()))?;

        Ok(Self { inner, config })
    }

    /// Create HTTP client with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(HttpConfig::default())
    }

    /// Get underlying reqwest client (for advanced usage)
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Get configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

#[async_trait]
impl HttpExecutor for HttpClient {
    async fn execute(&self, request: Request) -> Result<Response> {
        debug!("HTTP {}: {}", request.method(), request.url());
        let response = self.inner.execute(request).await?;
        debug!("HTTP response status: {}", response.status());
        Ok(response)
    }
}

#[async_trait]
impl HttpExecutor for reqwest::Client {
    async fn execute(&self, request: Request) -> Result<Response> {
        Ok(reqwest::Client::execute(self, request).await?)
    }
}

/// Create a shared HTTP executor (Arc-wrapped for cloning)
pub fn shared_client(config: HttpConfig) -> Result<Arc<dyn HttpExecutor>> {
    Ok(Arc::new(HttpClient::new(config)?))
}
