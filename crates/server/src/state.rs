use explainer_core::Config;
use explainer_ingest::Fetcher;
use explainer_llm::Explainer;

/// Request-scoped collaborators shared across handlers.
///
/// Built once at startup from explicit config; no process-wide singletons.
pub struct AppState {
    pub config: Config,
    pub explainer: Explainer,
    pub fetcher: Fetcher,
}
