//! Model runner client
//!
//! Each operation is a short sequence: optional identifier resolution, one request, then
//! either a full-body decode or a streamed decode feeding the caller's sink.

use std::sync::Arc;

use modelrunner_http::{shared_client, HttpExecutor, Method, StatusCode, Url};
use tracing::{debug, error, info, warn};

use crate::{
    config::{ClientConfig, DEFAULT_BASE_URL},
    error::{ClientError, RemoveFailure},
    models::{Model, ModelCreateRequest, ModelList, OpenAIChatRequest, OpenAIModel, OpenAIModelList},
    resolver, routes,
    stream::{ChatDecoder, ProgressDecoder, StreamOperation},
    transport::{body_reader, error_body, read_body, Transport},
    Result,
};

/// Whether the runner is serving requests
#[derive(Debug)]
pub enum Status {
    /// Running, with the status text reported by the inference engines
    Running(String),
    /// Not running; the error is absent when the service reported itself unavailable
    NotRunning(Option<ClientError>),
}

impl Status {
    pub fn is_running(&self) -> bool {
        matches!(self, Status::Running(_))
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            Status::NotRunning(err) => err.as_ref(),
            Status::Running(_) => None,
        }
    }
}

/// Client for the model runner API
#[derive(Clone)]
pub struct ModelRunnerClient {
    transport: Transport,
}

impl ModelRunnerClient {
    /// Client for the default local endpoint using the given executor
    pub fn new(executor: Arc<dyn HttpExecutor>) -> Result<Self> {
        Self::with_base_url(executor, DEFAULT_BASE_URL)
    }

    /// Client for an explicit base URL using the given executor
    pub fn with_base_url(executor: Arc<dyn HttpExecutor>, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL {}: {}", base_url, e)))?;
        Ok(Self {
            transport: Transport::new(executor, base_url),
        })
    }

    /// Client with the production executor built from `config`
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let executor = shared_client(config.http_config())
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            transport: Transport::new(executor, config.parsed_base_url()?),
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Check whether the runner is up.
    ///
    /// Never fails: an unavailable service is reported as not running, and a failure to fetch
    /// the status text is reported inside the running status.
    pub async fn status(&self) -> Status {
        let path = routes::list_models();
        let response = match self.transport.send(Method::GET, &path, None).await {
            Ok(response) => response,
            Err(ClientError::ServiceUnavailable) => return Status::NotRunning(None),
            Err(e) => return Status::NotRunning(Some(e)),
        };

        if response.status() != StatusCode::OK {
            return Status::NotRunning(Some(ClientError::UnexpectedStatus(response.status())));
        }
        drop(response);

        let status_path = routes::status();
        let text = match self.transport.send(Method::GET, &status_path, None).await {
            Err(e) => format!("error querying status: {}", e),
            Ok(response) => match response.text().await {
                Ok(body) => body,
                Err(e) => format!("error reading status body: {}", e),
            },
        };

        Status::Running(text)
    }

    /// Pull a model, forwarding progress messages to `progress`.
    ///
    /// Returns the final success message.
    pub async fn pull(&self, model: &str, progress: impl FnMut(&str)) -> Result<String> {
        validate_name(model)?;
        debug!("Pulling model: {}", model);

        let path = routes::create_model();
        let request = ModelCreateRequest {
            from: model.to_string(),
        };
        let response = self.transport.send_json(Method::POST, &path, &request).await?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = error_body(response).await;
            error!("Failed to pull model {}: {}", model, body);
            return Err(ClientError::status(format!("pulling {}", model), status, body));
        }

        let message = ProgressDecoder::new(body_reader(response), StreamOperation::Pull, model)
            .finish(progress)
            .await?;
        info!("Pulled model: {}", model);
        Ok(message)
    }

    /// Push a model, forwarding progress messages to `progress`.
    ///
    /// Returns the final success message.
    pub async fn push(&self, model: &str, progress: impl FnMut(&str)) -> Result<String> {
        validate_name(model)?;
        debug!("Pushing model: {}", model);

        let path = routes::push_model(model);
        let response = self.transport.send(Method::POST, &path, None).await?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = error_body(response).await;
            error!("Failed to push model {}: {}", model, body);
            return Err(ClientError::status(format!("pushing {}", model), status, body));
        }

        let message = ProgressDecoder::new(body_reader(response), StreamOperation::Push, model)
            .finish(progress)
            .await?;
        info!("Pushed model: {}", model);
        Ok(message)
    }

    /// List all models
    pub async fn list(&self) -> Result<ModelList> {
        let body = self.get_raw(&routes::list_models(), "").await?;
        decode_body(&body)
    }

    /// List all models in OpenAI conventions
    pub async fn list_openai(&self) -> Result<OpenAIModelList> {
        let body = self.get_raw(&routes::openai_models(), "").await?;
        decode_body(&body)
    }

    /// Inspect one model. The identifier must resolve.
    pub async fn inspect(&self, model: &str) -> Result<Model> {
        validate_name(model)?;
        let model = self.resolve(model).await?;
        let body = self.get_raw(&routes::model(&model), &model).await?;
        decode_body(&body)
    }

    /// Inspect one model in OpenAI conventions. The identifier must resolve.
    pub async fn inspect_openai(&self, model: &str) -> Result<OpenAIModel> {
        validate_name(model)?;
        let model = self.resolve(model).await?;
        let body = self.get_raw(&routes::openai_model(&model), &model).await?;
        decode_body(&body)
    }

    /// Send one user prompt and stream the reply to `on_delta`.
    ///
    /// A stream that ends without `[DONE]` is not an error.
    pub async fn chat(&self, model: &str, prompt: &str, on_delta: impl FnMut(&str)) -> Result<()> {
        validate_name(model)?;
        let model = self.resolve_best_effort(model).await;
        debug!("Chatting with model: {}", model);

        let path = routes::chat_completions();
        let request = OpenAIChatRequest::user_prompt(model, prompt);
        let response = self.transport.send_json(Method::POST, &path, &request).await?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = error_body(response).await;
            error!("Chat request failed with status {}", status);
            return Err(ClientError::ErrorResponse { status, body });
        }

        ChatDecoder::new(body_reader(response)).finish(on_delta).await
    }

    /// Remove models in order, stopping at the first failure.
    ///
    /// Returns one `Model {id} removed successfully` line per removed model. On failure the
    /// lines gathered so far travel with the error.
    pub async fn remove<S: AsRef<str>>(
        &self,
        models: &[S],
        force: bool,
    ) -> std::result::Result<String, RemoveFailure> {
        let mut removed = String::new();
        for model in models {
            if let Err(error) = self.remove_one(model.as_ref(), force, &mut removed).await {
                error!("Removal stopped: {}", error);
                return Err(RemoveFailure { removed, error });
            }
        }
        Ok(removed)
    }

    async fn remove_one(&self, model: &str, force: bool, removed: &mut String) -> Result<()> {
        validate_name(model)?;
        let model = self.resolve_best_effort(model).await;

        let path = routes::remove_model(&model, force);
        let response = self.transport.send(Method::DELETE, &path, None).await?;

        match response.status() {
            StatusCode::OK => {
                info!("Removed model: {}", model);
                removed.push_str(&format!("Model {} removed successfully\n", model));
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(ClientError::NoSuchModel(model)),
            status => {
                let body = match response.text().await {
                    Ok(body) => body,
                    Err(e) => format!("(failed to read response body: {})", e),
                };
                Err(ClientError::status(format!("removing {}", model), status, body))
            }
        }
    }

    /// Add `repo:tag` to a model. Returns the server's confirmation text.
    pub async fn tag(&self, source: &str, repo: &str, tag: &str) -> Result<String> {
        validate_name(source)?;
        let source = self.resolve_best_effort(source).await;
        debug!("Tagging {} as {}:{}", source, repo, tag);

        let path = routes::tag_model(&source, repo, tag);
        let response = self.transport.send(Method::POST, &path, None).await?;

        if response.status() != StatusCode::CREATED {
            let status = response.status();
            let body = error_body(response).await;
            return Err(ClientError::status("tagging", status, body));
        }

        read_body(response, &path).await
    }

    /// Resolve an identifier to its canonical form, fetching the catalog if needed
    pub async fn resolve(&self, token: &str) -> Result<String> {
        resolver::resolve(token, || self.list()).await
    }

    /// Resolve, falling back to the token itself on any failure
    async fn resolve_best_effort(&self, token: &str) -> String {
        match self.resolve(token).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("Using {} unresolved: {}", token, e);
                token.to_string()
            }
        }
    }

    /// GET a route and return its body. A 404 with a non-empty `model` is "not found".
    async fn get_raw(&self, path: &str, model: &str) -> Result<String> {
        let response = self.transport.send(Method::GET, path, None).await?;

        match response.status() {
            StatusCode::OK => read_body(response, path).await,
            StatusCode::NOT_FOUND if !model.is_empty() => {
                Err(ClientError::ModelNotFound(model.to_string()))
            }
            status => {
                error!("GET {} failed with status {}", path, status);
                Err(ClientError::ListFailed(status))
            }
        }
    }
}

fn validate_name(model: &str) -> Result<()> {
    if model.trim().is_empty() {
        return Err(ClientError::InvalidModelName(
            "Model name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn decode_body<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| ClientError::Decode {
        what: "response body",
        source,
    })
}
