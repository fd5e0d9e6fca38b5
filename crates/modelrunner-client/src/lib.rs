//! Model runner client
//!
//! Talks to a local model runner over HTTP: pulls and pushes models with streamed progress,
//! lists and inspects the local store, tags and removes models, and streams chat completions.
//! Short identifiers are resolved against the live catalog before identifier-scoped calls.
//!
//! The HTTP executor is injected, so tests can substitute their own.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod resolver;
pub mod routes;
pub mod stream;
pub mod transport;

pub use client::{ModelRunnerClient, Status};
pub use crate::config::ClientConfig;
pub use error::{ClientError, RemoveFailure};
pub use models::{
    Model, ModelConfig, ModelCreateRequest, ModelList, OpenAIChatMessage, OpenAIChatRequest,
    OpenAIChatResponse, OpenAIModel, OpenAIModelList, ProgressMessage,
};
pub use stream::{ChatDecoder, ProgressDecoder, ProgressEvent, StreamOperation, StreamState};
pub use transport::Transport;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
