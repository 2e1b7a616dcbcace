use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::provider::{Completion, LlmError, LlmProvider, Message, Role};

/// Anthropic messages API backend.
///
/// Claude's citation metadata indexes into the source document rather than
/// the response text, so it cannot drive inline marker substitution; the
/// fenced JSON quote block is the citation channel for this provider.
#[derive(Debug)]
pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl ClaudeProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Completion, LlmError> {
        let url = "https://api.anthropic.com/v1/messages";

        // Claude API uses a separate system parameter
        let system_msg = messages
            .iter()
            .find(|m| matches!(m.role, Role::System))
            .map(|m| m.content.clone());

        let api_messages: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| !matches!(m.role, Role::System))
            .map(|m| {
                json!({
                    "role": match m.role {
                        Role::User => "user",
                        Role::Assistant => "assistant",
                        Role::System => unreachable!(),
                    },
                    "content": m.content,
                })
            })
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": api_messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        if let Some(system) = system_msg {
            body["system"] = json!(system);
        }

        debug!("Claude request to {}", url);

        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let resp: serde_json::Value = response.json().await?;
        let blocks = resp["content"]
            .as_array()
            .ok_or_else(|| LlmError::ParseError("missing content array".into()))?;

        let text: String = blocks
            .iter()
            .filter_map(|b| b["text"].as_str())
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(LlmError::ParseError("no text blocks in response".into()));
        }

        Ok(Completion {
            text,
            annotations: Vec::new(),
        })
    }

    fn model_label(&self) -> String {
        format!("anthropic/{}", self.model)
    }
}
