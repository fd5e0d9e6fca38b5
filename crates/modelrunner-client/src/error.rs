//! Error types for model runner client operations

use modelrunner_http::HttpError;
use thiserror::Error;

/// Errors that can occur while talking to the model runner
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered 503; it is up but not ready to serve requests
    #[error("service unavailable")]
    ServiceUnavailable,

    /// No response was obtained at all
    #[error("error querying {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: HttpError,
    },

    /// The response body could not be read
    #[error("error reading response from {path}: {source}")]
    Body {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Identifier-scoped lookup answered 404
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Removal answered 404
    #[error("no such model: {0}")]
    NoSuchModel(String),

    /// The resolver found no catalog entry for a short identifier
    #[error("model with ID {0} not found")]
    UnknownIdentifier(String),

    #[error("Invalid model name: {0}")]
    InvalidModelName(String),

    /// A non-2xx status that has no more specific meaning
    #[error("{context} failed with status {status}: {body}")]
    Status {
        context: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to list models: {0}")]
    ListFailed(reqwest::StatusCode),

    #[error("unexpected status code: {}", .0.as_u16())]
    UnexpectedStatus(reqwest::StatusCode),

    #[error("error response: status={} body={body}", .status.as_u16())]
    ErrorResponse {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The stream delivered an `error` message
    #[error("error {operation} model: {message}")]
    Operation {
        operation: &'static str,
        message: String,
    },

    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    #[error("error parsing {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The stream closed before a `success` or `error` message
    #[error("unexpected end of stream while {operation} model {model}")]
    StreamTruncated {
        operation: &'static str,
        model: String,
    },

    #[error("error reading response stream: {0}")]
    Stream(#[source] std::io::Error),

    #[error("error marshaling request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("error creating request: {0}")]
    Request(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Context error: {0}")]
    Context(#[from] modelrunner_context::ContextError),
}

impl ClientError {
    /// True when the server explicitly signalled it is not ready
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, ClientError::ServiceUnavailable)
    }

    /// True for identifier-scoped "not found" outcomes
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ClientError::ModelNotFound(_)
                | ClientError::NoSuchModel(_)
                | ClientError::UnknownIdentifier(_)
        )
    }

    /// True for malformed or unrecognized stream content
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            ClientError::Decode { .. } | ClientError::UnknownMessageType(_)
        )
    }

    pub(crate) fn status(
        context: impl Into<String>,
        status: reqwest::StatusCode,
        body: impl Into<String>,
    ) -> Self {
        ClientError::Status {
            context: context.into(),
            status,
            body: body.into(),
        }
    }
}

impl From<::config::ConfigError> for ClientError {
    fn from(err: ::config::ConfigError) -> Self {
        ClientError::Config(err.to_string())
    }
}

/// Removal of a batch stopped early.
///
/// `removed` holds the success lines for every model removed before the failure.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RemoveFailure {
    pub removed: String,
    #[source]
    pub error: ClientError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let err = ClientError::status(
            "pulling ai/smollm2",
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "disk full",
        );
        assert_eq!(
            err.to_string(),
            "pulling ai/smollm2 failed with status 500 Internal Server Error: disk full"
        );
    }

    #[test]
    fn test_classification() {
        assert!(ClientError::ServiceUnavailable.is_service_unavailable());
        assert!(ClientError::NoSuchModel("x".into()).is_not_found());
        assert!(ClientError::UnknownIdentifier("x".into()).is_not_found());
        assert!(!ClientError::ServiceUnavailable.is_not_found());
        assert!(ClientError::UnknownMessageType("x".into()).is_decode());
    }

    #[test]
    fn test_stream_messages() {
        let err = ClientError::Operation {
            operation: "pulling",
            message: "manifest unknown".into(),
        };
        assert_eq!(err.to_string(), "error pulling model: manifest unknown");

        let err = ClientError::StreamTruncated {
            operation: "pushing",
            model: "ai/smollm2".into(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected end of stream while pushing model ai/smollm2"
        );
    }
}
