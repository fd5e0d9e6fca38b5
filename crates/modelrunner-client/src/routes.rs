//! Route construction
//!
//! Every path here is relative to the experimental prefix; [`crate::transport::Transport`]
//! joins it onto the base URL.

/// Prefix applied to every route while the endpoints are experimental
pub const EXPERIMENTAL_PREFIX: &str = "/exp/vDD4.40";

/// Root of the model management routes
pub const MODELS_PREFIX: &str = "/models";

/// Root of the inference routes
pub const INFERENCE_PREFIX: &str = "/engines";

pub fn list_models() -> String {
    MODELS_PREFIX.to_string()
}

pub fn create_model() -> String {
    format!("{MODELS_PREFIX}/create")
}

pub fn model(id: &str) -> String {
    format!("{MODELS_PREFIX}/{id}")
}

pub fn push_model(id: &str) -> String {
    format!("{MODELS_PREFIX}/{id}/push")
}

pub fn remove_model(id: &str, force: bool) -> String {
    format!("{MODELS_PREFIX}/{id}?force={force}")
}

/// Tag route; repository and tag are percent-encoded
pub fn tag_model(id: &str, repo: &str, tag: &str) -> String {
    format!(
        "{MODELS_PREFIX}/{id}/tag?repo={}&tag={}",
        urlencoding::encode(repo),
        urlencoding::encode(tag)
    )
}

pub fn status() -> String {
    format!("{INFERENCE_PREFIX}/status")
}

pub fn openai_models() -> String {
    format!("{INFERENCE_PREFIX}/v1/models")
}

pub fn openai_model(id: &str) -> String {
    format!("{INFERENCE_PREFIX}/v1/models/{id}")
}

pub fn chat_completions() -> String {
    format!("{INFERENCE_PREFIX}/v1/chat/completions")
}
