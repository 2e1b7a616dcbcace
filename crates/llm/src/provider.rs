use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use explainer_citation::Annotation;

/// A chat message for the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One completed LLM response.
///
/// `annotations` carries the provider's citation side channel when it has
/// one (OpenAI file-citation markers). Providers without inline citation
/// markers return it empty and the fenced JSON quote block in `text` is the
/// only citation source.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub text: String,
    pub annotations: Vec<Annotation>,
}

/// Trait for LLM providers — each backend implements this.
#[async_trait]
pub trait LlmProvider: Send + Sync + std::fmt::Debug {
    /// Send a chat completion request and return the assistant's response.
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Completion, LlmError>;

    /// Label used in logs and API responses, e.g. "openai/gpt-4o".
    fn model_label(&self) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} — {body}")]
    ApiError { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    ParseError(String),
    #[error("provider not configured: {0}")]
    NotConfigured(String),
}
