mod api;
mod render;
mod router;
mod state;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use explainer_core::Config;
use explainer_ingest::Fetcher;
use explainer_llm::Explainer;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    explainer_core::config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    config.log_summary();

    let explainer = Explainer::from_config(&config.llm, &config.ollama)
        .context("failed to create LLM provider")?;
    let fetcher = Fetcher::new(&config.fetch).context("failed to create URL fetcher")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState {
        config,
        explainer,
        fetcher,
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Document Explainer listening on {}", addr);

    axum::serve(listener, router::build_router(state))
        .await
        .context("server error")?;
    Ok(())
}
