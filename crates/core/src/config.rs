use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

/// All runtime configuration, read from environment variables.
///
/// There is deliberately no process-wide config singleton: callers build a
/// `Config` once at startup and pass the sections they need down explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
    pub extract: ExtractConfig,
    pub fetch: FetchConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            llm: LlmConfig::from_env(),
            ollama: OllamaConfig::from_env(),
            extract: ExtractConfig::from_env(),
            fetch: FetchConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  server:   {}:{}", self.server.host, self.server.port);
        tracing::info!("  llm:      provider={}", self.llm.provider);
        tracing::info!("  ollama:   url={}", self.ollama.url);
        tracing::info!("  extract:  ocr_command={}", self.extract.ocr_command.as_deref().unwrap_or("(none)"));
        tracing::info!("  fetch:    max_bytes={}", self.fetch.max_bytes);
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "server": { "host": self.server.host, "port": self.server.port },
            "llm": {
                "provider": self.llm.provider,
                "configured": self.llm.is_configured(),
            },
            "ollama": { "url": self.ollama.url, "model": self.ollama.model },
            "extract": { "max_upload_mb": self.extract.max_upload_mb },
            "fetch": { "max_bytes": self.fetch.max_bytes },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_u16("PORT", 3001),
            cors_origin: env_or("CORS_ORIGIN", "*"),
        }
    }
}

// ── LLM (OpenAI / Anthropic / Ollama) ─────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai", "anthropic", "ollama"
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env() -> Self {
        Self {
            provider: env_or("LLM_PROVIDER", "openai"),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_model: env_or("OPENAI_MODEL", "gpt-4o"),
            openai_base_url: env_opt("OPENAI_BASE_URL"),
            anthropic_api_key: env_opt("ANTHROPIC_API_KEY"),
            anthropic_model: env_or("ANTHROPIC_MODEL", "claude-sonnet-4-5-20250929"),
            temperature: env_or("LLM_TEMPERATURE", "0.2").parse().unwrap_or(0.2),
            max_tokens: env_u32("LLM_MAX_TOKENS", 4096),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "anthropic" => self.anthropic_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
}

impl OllamaConfig {
    fn from_env() -> Self {
        Self {
            url: env_or("OLLAMA_URL", "http://localhost:11434"),
            model: env_or("OLLAMA_MODEL", "llama3.2"),
        }
    }
}

// ── Extraction ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Command invoked for OCR fallback on scanned PDFs, e.g.
    /// "uv run python scripts/ocr_pdf.py". None disables the fallback.
    pub ocr_command: Option<String>,
    /// Upload size cap enforced by the server, in megabytes.
    pub max_upload_mb: usize,
}

impl ExtractConfig {
    fn from_env() -> Self {
        Self {
            ocr_command: env_opt("OCR_COMMAND"),
            max_upload_mb: env_usize("MAX_UPLOAD_MB", 25),
        }
    }
}

// ── URL fetching ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum response body size accepted from a fetched URL.
    pub max_bytes: usize,
    pub timeout_secs: u32,
    pub user_agent: String,
}

impl FetchConfig {
    fn from_env() -> Self {
        Self {
            max_bytes: env_usize("FETCH_MAX_BYTES", 2 * 1024 * 1024),
            timeout_secs: env_u32("FETCH_TIMEOUT_SECS", 20),
            user_agent: env_or("FETCH_USER_AGENT", "document-explainer/0.1"),
        }
    }
}
