use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use explainer_citation::Annotation;

use crate::provider::{Completion, LlmError, LlmProvider, Message, Role};

#[derive(Debug)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Completion, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let api_messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| {
                json!({
                    "role": match m.role {
                        Role::System => "system",
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    "content": m.content,
                })
            })
            .collect();

        let body = json!({
            "model": self.model,
            "messages": api_messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        debug!("OpenAI request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
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
        let message = &resp["choices"][0]["message"];
        let text = message["content"]
            .as_str()
            .ok_or_else(|| LlmError::ParseError("missing choices[0].message.content".into()))?
            .to_string();

        let annotations = parse_annotations(&message["annotations"]);

        Ok(Completion { text, annotations })
    }

    fn model_label(&self) -> String {
        format!("openai/{}", self.model)
    }
}

/// Map the message's `annotations` array (file-citation style) to reconciler
/// input. Entries without an inline marker `text` are skipped: with nothing
/// literal to substitute, they cannot be inlined.
fn parse_annotations(value: &serde_json::Value) -> Vec<Annotation> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let marker = entry["text"].as_str()?;
            let start = entry["start_index"].as_u64()? as usize;
            let end = entry["end_index"].as_u64()? as usize;
            let source_ref = entry["file_citation"]["file_id"]
                .as_str()
                .map(|s| s.to_string());
            Some(Annotation {
                start,
                end,
                marker_text: marker.to_string(),
                source_ref,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_file_citation_annotations() {
        let value = json!([
            {
                "type": "file_citation",
                "text": "【4:0†source】",
                "start_index": 120,
                "end_index": 133,
                "file_citation": { "file_id": "file-abc123" }
            }
        ]);
        let annotations = parse_annotations(&value);
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].marker_text, "【4:0†source】");
        assert_eq!(annotations[0].start, 120);
        assert_eq!(annotations[0].end, 133);
        assert_eq!(annotations[0].source_ref.as_deref(), Some("file-abc123"));
    }

    #[test]
    fn entries_without_marker_text_are_skipped() {
        let value = json!([
            { "type": "url_citation", "start_index": 0, "end_index": 5 }
        ]);
        assert!(parse_annotations(&value).is_empty());
    }

    #[test]
    fn missing_annotations_field_is_empty() {
        assert!(parse_annotations(&serde_json::Value::Null).is_empty());
    }
}
