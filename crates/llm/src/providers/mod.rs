pub mod claude;
pub mod ollama;
pub mod openai;

use explainer_core::config::{LlmConfig, OllamaConfig};

use crate::provider::{LlmError, LlmProvider};

/// Create the appropriate LLM provider based on config.
pub fn create_provider(
    llm_config: &LlmConfig,
    ollama_config: &OllamaConfig,
) -> Result<Box<dyn LlmProvider>, LlmError> {
    match llm_config.provider.as_str() {
        "openai" => {
            let api_key = llm_config
                .openai_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            let base_url = llm_config
                .openai_base_url
                .as_deref()
                .unwrap_or("https://api.openai.com");
            Ok(Box::new(openai::OpenAiProvider::new(
                api_key.clone(),
                llm_config.openai_model.clone(),
                base_url.to_string(),
            )))
        }
        "anthropic" | "claude" => {
            let api_key = llm_config
                .anthropic_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("ANTHROPIC_API_KEY not set".into()))?;
            Ok(Box::new(claude::ClaudeProvider::new(
                api_key.clone(),
                llm_config.anthropic_model.clone(),
            )))
        }
        "ollama" => Ok(Box::new(ollama::OllamaProvider::new(
            ollama_config.url.clone(),
            ollama_config.model.clone(),
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config(provider: &str) -> LlmConfig {
        LlmConfig {
            provider: provider.to_string(),
            openai_api_key: None,
            openai_model: "gpt-4o".to_string(),
            openai_base_url: None,
            anthropic_api_key: None,
            anthropic_model: "claude-sonnet-4-5-20250929".to_string(),
            temperature: 0.2,
            max_tokens: 1024,
        }
    }

    fn ollama_config() -> OllamaConfig {
        OllamaConfig {
            url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
        }
    }

    #[test]
    fn openai_without_key_is_not_configured() {
        let err = create_provider(&base_config("openai"), &ollama_config()).unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured(_)));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = create_provider(&base_config("davinci"), &ollama_config()).unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured(_)));
    }

    #[test]
    fn ollama_needs_no_key() {
        let provider = create_provider(&base_config("ollama"), &ollama_config()).unwrap();
        assert_eq!(provider.model_label(), "ollama/llama3.2");
    }
}
