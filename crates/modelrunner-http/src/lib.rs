//! HTTP request execution for the model runner client
//!
//! The client never talks to the network directly. It builds a [`reqwest::Request`] and hands
//! it to an [`HttpExecutor`], which performs exactly one round trip and returns the raw
//! response, whatever its status. This keeps status classification in the caller and lets
//! tests substitute their own executor.
//!
//! ## Features
//!
//! - **Trait-based design**: Mockable via `HttpExecutor`
//! - **Configurable**: Timeouts, user-agent, connection pooling
//! - **No hidden retries**: One call in, one response out

pub mod client;
pub mod config;
pub mod error;

pub use client::{shared_client, HttpClient, HttpExecutor};
pub use config::HttpConfig;
pub use error::{HttpError, Result};

/// Re-export commonly used types
pub use reqwest::{header, Body, Method, Request, Response, StatusCode, Url};
