//! Request issuance and availability classification

use std::sync::Arc;

use futures::TryStreamExt;
use modelrunner_http::{
    header::{HeaderValue, CONTENT_TYPE},
    Body, HttpExecutor, Method, Request, Response, StatusCode, Url,
};
use serde::Serialize;
use tokio::io::AsyncBufRead;
use tokio_util::io::StreamReader;
use tracing::{debug, error};

use crate::{error::ClientError, routes::EXPERIMENTAL_PREFIX, Result};

/// Issues one request per call against `<base_url><experimental prefix><path>`.
///
/// A 503 answer is turned into [`ClientError::ServiceUnavailable`] and its body dropped. Every
/// other answer, whatever its status, is handed back with its body still open.
#[derive(Clone)]
pub struct Transport {
    executor: Arc<dyn HttpExecutor>,
    base_url: Url,
}

impl Transport {
    pub fn new(executor: Arc<dyn HttpExecutor>, base_url: Url) -> Self {
        Self { executor, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for a prefix-relative path (which may carry a query)
    pub fn url(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            EXPERIMENTAL_PREFIX,
            path
        );
        Url::parse(&joined).map_err(|e| ClientError::Request(format!("{}: {}", joined, e)))
    }

    /// Send a request, optionally with a JSON body
    pub async fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<Response> {
        let mut request = Request::new(method, self.url(path)?);
        if let Some(body) = body {
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *request.body_mut() = Some(Body::from(body));
        }

        debug!("{} {}", request.method(), path);

        let response = self.executor.execute(request).await.map_err(|source| {
            error!("Request to {} failed: {}", path, source);
            ClientError::Transport {
                path: path.to_string(),
                source,
            }
        })?;

        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            debug!("{} answered 503, service unavailable", path);
            drop(response);
            return Err(ClientError::ServiceUnavailable);
        }

        Ok(response)
    }

    /// Serialize `body` as JSON and send it
    pub async fn send_json<T: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &T,
    ) -> Result<Response> {
        let bytes = serde_json::to_vec(body).map_err(ClientError::Encode)?;
        self.send(method, path, Some(bytes)).await
    }
}

/// Read a whole response body as text
pub(crate) async fn read_body(response: Response, path: &str) -> Result<String> {
    response.text().await.map_err(|source| ClientError::Body {
        path: path.to_string(),
        source,
    })
}

/// Read a body for inclusion in an error message; read failures yield an empty string
pub(crate) async fn error_body(response: Response) -> String {
    response.text().await.unwrap_or_default()
}

/// Expose a streamed body as a buffered reader for line decoding
pub(crate) fn body_reader(response: Response) -> impl AsyncBufRead + Unpin {
    StreamReader::new(
        response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
    )
}
