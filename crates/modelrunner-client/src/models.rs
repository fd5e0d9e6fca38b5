//! Wire records exchanged with the model runner

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Reads an explicit `null` as the default value, the way the runner encodes empty slices
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Describes a model's weights
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelConfig {
    /// File format (e.g., "gguf")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,

    /// Quantization level (e.g., "IQ2_XXS/Q4_K_M")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub quantization: String,

    /// Parameter count (e.g., "361.82 M")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parameters: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub architecture: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub size: String,
}

/// A model in the local store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Model {
    /// Content identifier (e.g., "sha256:354bf30d0aa3...")
    pub id: String,

    /// References the model is known by (e.g., "ai/smollm2:latest")
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub files: Vec<String>,

    /// Creation time, Unix seconds on the wire
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub config: ModelConfig,
}

/// A collection of models as returned by the listing route
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ModelList(pub Vec<Model>);

impl ModelList {
    /// Convert to the OpenAI list shape; an empty input yields an empty list
    pub fn to_openai(&self) -> OpenAIModelList {
        OpenAIModelList {
            object: "list".to_string(),
            data: self.0.iter().map(OpenAIModel::from).collect(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Model> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<Model> {
        self.0
    }
}

impl From<Vec<Model>> for ModelList {
    fn from(models: Vec<Model>) -> Self {
        Self(models)
    }
}

/// A model in OpenAI conventions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenAIModel {
    /// The model tag
    pub id: String,

    /// Always "model"
    pub object: String,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,

    /// Always "docker"
    pub owned_by: String,
}

impl From<&Model> for OpenAIModel {
    fn from(model: &Model) -> Self {
        Self {
            id: model.tags.first().unwrap_or(&model.id).clone(),
            object: "model".to_string(),
            created: model.created,
            owned_by: "docker".to_string(),
        }
    }
}

/// A list of models in OpenAI conventions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenAIModelList {
    /// Always "list"
    pub object: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<OpenAIModel>,
}

/// Pull request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelCreateRequest {
    /// Reference to pull
    pub from: String,
}

/// One line of a pull or push progress stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressMessage {
    /// "progress", "success" or "error"
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenAIChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenAIChatRequest {
    pub model: String,
    pub messages: Vec<OpenAIChatMessage>,
    pub stream: bool,
}

impl OpenAIChatRequest {
    /// Streaming request carrying a single user message
    pub fn user_prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![OpenAIChatMessage {
                role: "user".to_string(),
                content: prompt.into(),
            }],
            stream: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatDelta {
    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatChoice {
    #[serde(default)]
    pub delta: ChatDelta,

    #[serde(default)]
    pub index: u32,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// One chunk of a streamed chat completion
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenAIChatResponse {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub object: String,

    #[serde(default)]
    pub created: i64,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

impl OpenAIChatResponse {
    /// Text of the first choice, if non-empty
    pub fn delta_text(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|c| c.delta.content.as_str())
            .filter(|c| !c.is_empty())
    }
}

// Tests live in tests/models.rs
