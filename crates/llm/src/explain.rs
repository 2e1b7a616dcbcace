//! The explain pipeline: prompt construction, provider invocation, and
//! citation reconciliation of the response.

use tracing::{debug, info, warn};

use explainer_citation::{reconcile, ReconciledResult};
use explainer_core::config::{LlmConfig, OllamaConfig};

use crate::provider::{LlmError, LlmProvider, Message, Role};

/// The fixed journalism-style system prompt.
///
/// The quote-block instruction at the end is load-bearing: the reconciler
/// parses exactly this shape (one JSON object, integer-string keys, quoted
/// source passages as values) out of the response.
const EXPLAIN_SYSTEM_PROMPT: &str = "\
You are an experienced explanatory journalist. A reader has given you a \
document they do not fully understand. Explain it in plain language:\n\
- Lead with what the document is and why it matters.\n\
- Break down the key points in the order a reader needs them.\n\
- Define jargon the first time it appears.\n\
- Keep a neutral, factual tone; do not editorialize.\n\
- Where you rely on a specific passage, mark the claim inline with [0], [1], \
... in order of first use.\n\
\n\
End your response with a fenced code block tagged `json` containing a single \
JSON object that maps each citation number (as a base-10 string key) to the \
exact passage quoted from the document, e.g.:\n\
```json\n{\"0\": \"quoted passage\", \"1\": \"another passage\"}\n```\n\
Do not put anything after that block.";

/// Documents beyond this size are truncated before prompting.
const MAX_DOCUMENT_CHARS: usize = 150_000;

/// A fully processed explanation.
#[derive(Debug, Clone)]
pub struct Explanation {
    pub result: ReconciledResult,
    /// Provider/model label, e.g. "openai/gpt-4o".
    pub model: String,
}

/// Runs the document → explanation pipeline against one provider.
///
/// Holds no process-wide state: build one from config at startup (or per
/// request) and pass it where it is needed.
pub struct Explainer {
    provider: Box<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl Explainer {
    pub fn new(provider: Box<dyn LlmProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }

    /// Build from config, creating the appropriate provider.
    pub fn from_config(
        llm_config: &LlmConfig,
        ollama_config: &OllamaConfig,
    ) -> Result<Self, LlmError> {
        let provider = crate::providers::create_provider(llm_config, ollama_config)?;
        Ok(Self::new(
            provider,
            llm_config.temperature,
            llm_config.max_tokens,
        ))
    }

    pub fn model_label(&self) -> String {
        self.provider.model_label()
    }

    /// Explain `document_text` and reconcile the citations in the response.
    pub async fn explain(&self, document_text: &str) -> Result<Explanation, LlmError> {
        let user_prompt = build_user_prompt(document_text);

        info!(
            "Explaining document ({} chars) with {}",
            document_text.chars().count(),
            self.provider.model_label()
        );

        let messages = vec![
            Message {
                role: Role::System,
                content: EXPLAIN_SYSTEM_PROMPT.to_string(),
            },
            Message {
                role: Role::User,
                content: user_prompt,
            },
        ];

        let completion = self
            .provider
            .complete(messages, self.temperature, self.max_tokens)
            .await?;

        debug!("LLM response: {} chars", completion.text.chars().count());

        let result = reconcile(&completion.text, &completion.annotations);
        for warning in &result.warnings {
            warn!("citation reconciliation: {}", warning);
        }
        info!(
            "Reconciled {} citation(s), {} warning(s)",
            result.citations.len(),
            result.warnings.len()
        );

        Ok(Explanation {
            result,
            model: self.provider.model_label(),
        })
    }
}

fn build_user_prompt(document_text: &str) -> String {
    let truncated: String = document_text.chars().take(MAX_DOCUMENT_CHARS).collect();
    if truncated.chars().count() < document_text.chars().count() {
        warn!(
            "document truncated to {} chars for prompting",
            MAX_DOCUMENT_CHARS
        );
    }
    format!("Explain the following document:\n\n---\n{truncated}\n---")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::provider::Completion;
    use explainer_citation::Annotation;

    /// Canned provider for pipeline tests.
    #[derive(Debug)]
    struct FixedProvider {
        text: String,
        annotations: Vec<Annotation>,
    }

    #[async_trait]
    impl LlmProvider for FixedProvider {
        async fn complete(
            &self,
            _messages: Vec<Message>,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<Completion, LlmError> {
            Ok(Completion {
                text: self.text.clone(),
                annotations: self.annotations.clone(),
            })
        }

        fn model_label(&self) -> String {
            "test/fixed".to_string()
        }
    }

    #[tokio::test]
    async fn pipeline_reconciles_block_only_response() {
        let provider = FixedProvider {
            text: "The law changes tax rates [0].\n```json\n{\"0\": \"Section 2 adjusts rates\"}\n```"
                .to_string(),
            annotations: vec![],
        };
        let explainer = Explainer::new(Box::new(provider), 0.2, 1024);

        let explanation = explainer.explain("irrelevant").await.unwrap();
        assert_eq!(explanation.result.text, "The law changes tax rates [0].");
        assert_eq!(explanation.result.citations.len(), 1);
        assert_eq!(
            explanation.result.citations[0].quote,
            "Section 2 adjusts rates"
        );
        assert_eq!(explanation.model, "test/fixed");
    }

    #[tokio::test]
    async fn pipeline_reconciles_annotation_markers() {
        let text = "Rates change 【1†src】 next year.";
        let start = text.chars().position(|c| c == '【').unwrap();
        let provider = FixedProvider {
            text: text.to_string(),
            annotations: vec![Annotation {
                start,
                end: start + "【1†src】".chars().count(),
                marker_text: "【1†src】".to_string(),
                source_ref: Some("file-1".to_string()),
            }],
        };
        let explainer = Explainer::new(Box::new(provider), 0.2, 1024);

        let explanation = explainer.explain("doc").await.unwrap();
        assert_eq!(explanation.result.text, "Rates change [0] next year.");
        assert_eq!(explanation.result.citations[0].quote, "【1†src】");
        assert_eq!(
            explanation.result.citations[0].source_ref.as_deref(),
            Some("file-1")
        );
    }

    #[test]
    fn user_prompt_wraps_document() {
        let prompt = build_user_prompt("body text");
        assert!(prompt.contains("body text"));
        assert!(prompt.starts_with("Explain the following document:"));
    }

    #[test]
    fn system_prompt_demands_the_quote_block() {
        assert!(EXPLAIN_SYSTEM_PROMPT.contains("```json"));
        assert!(EXPLAIN_SYSTEM_PROMPT.contains("base-10"));
    }

    #[tokio::test]
    async fn plain_response_passes_through() {
        let provider = FixedProvider {
            text: "No citations in this one.".to_string(),
            annotations: vec![],
        };
        let explainer = Explainer::new(Box::new(provider), 0.0, 16);
        let explanation = explainer.explain("x").await.unwrap();
        assert_eq!(explanation.result.text, "No citations in this one.");
        assert!(explanation.result.citations.is_empty());
    }
}
