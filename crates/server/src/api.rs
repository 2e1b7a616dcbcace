use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use explainer_citation::ReconciledResult;
use explainer_ingest::document::extract_text;
use explainer_llm::{Explanation, LlmError};

use crate::render;
use crate::state::AppState;

// ── Health & config ───────────────────────────────────────────────

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub llm_configured: bool,
}

/// Service health and provider readiness.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Service",
    responses((status = 200, description = "Service health", body = HealthResponse))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        llm_configured: state.config.llm.is_configured(),
    })
}

/// Redacted runtime configuration (no secrets).
#[utoipa::path(
    get,
    path = "/config",
    tag = "Service",
    responses((status = 200, description = "Redacted configuration", body = Object))
)]
pub async fn config_summary(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(state.config.redacted_summary())
}

// ── Shared explain plumbing ───────────────────────────────────────

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ExplainParams {
    /// "json" (default) or "html" for the hover-quote page.
    pub format: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CitationView {
    pub index: usize,
    /// The inline marker, e.g. "[0]".
    pub marker: String,
    pub quote: String,
    pub source_ref: Option<String>,
    /// False when the quote block referenced an index with no inline marker.
    pub inline: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ExplainResponse {
    /// Explanation text with `[n]` citation markers.
    pub text: String,
    pub citations: Vec<CitationView>,
    /// Human-readable reconciliation warnings; empty on a clean pass.
    pub warnings: Vec<String>,
    pub model: String,
    /// Filename or URL the document came from, when there was one.
    pub origin: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn llm_error(e: LlmError) -> ApiError {
    let status = match &e {
        LlmError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    };
    warn!("explain failed: {}", e);
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

fn citation_views(result: &ReconciledResult) -> Vec<CitationView> {
    result
        .citations
        .iter()
        .map(|c| CitationView {
            index: c.index,
            marker: c.marker_text.clone(),
            quote: c.quote.clone(),
            source_ref: c.source_ref.clone(),
            inline: result.text.contains(&c.marker_text),
        })
        .collect()
}

/// Shape the finished explanation as JSON or as the rendered HTML page.
fn respond(explanation: Explanation, origin: Option<String>, params: &ExplainParams) -> Response {
    match params.format.as_deref() {
        Some("html") => match render::render_page(&explanation, origin.as_deref()) {
            Ok(page) => Html(page).into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("render failed: {e}"),
                }),
            )
                .into_response(),
        },
        _ => Json(ExplainResponse {
            citations: citation_views(&explanation.result),
            warnings: explanation
                .result
                .warnings
                .iter()
                .map(|w| w.to_string())
                .collect(),
            text: explanation.result.text,
            model: explanation.model,
            origin,
        })
        .into_response(),
    }
}

// ── Explain endpoints ─────────────────────────────────────────────

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ExplainTextRequest {
    /// Pasted document text.
    pub text: String,
}

/// Explain pasted text.
#[utoipa::path(
    post,
    path = "/explain",
    tag = "Explain",
    params(ExplainParams),
    request_body = ExplainTextRequest,
    responses(
        (status = 200, description = "Explanation with reconciled citations", body = ExplainResponse),
        (status = 400, description = "Empty input", body = ErrorResponse),
        (status = 502, description = "LLM provider failure", body = ErrorResponse),
        (status = 503, description = "No LLM provider configured", body = ErrorResponse)
    )
)]
pub async fn explain_text(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExplainParams>,
    Json(request): Json<ExplainTextRequest>,
) -> Result<Response, ApiError> {
    if request.text.trim().is_empty() {
        return Err(bad_request("text must not be empty"));
    }

    let explanation = state
        .explainer
        .explain(&request.text)
        .await
        .map_err(llm_error)?;
    Ok(respond(explanation, None, &params))
}

/// Explain an uploaded document (multipart field `file`).
#[utoipa::path(
    post,
    path = "/explain/upload",
    tag = "Explain",
    params(ExplainParams),
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "Document file (pdf, txt, md)"),
    responses(
        (status = 200, description = "Explanation with reconciled citations", body = ExplainResponse),
        (status = 400, description = "Missing, oversized, or unextractable file", body = ErrorResponse),
        (status = 502, description = "LLM provider failure", body = ErrorResponse)
    )
)]
pub async fn explain_upload(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExplainParams>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .ok_or_else(|| bad_request("file field has no filename"))?
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(format!("failed to read upload: {e}")))?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }
    let (filename, bytes) = upload.ok_or_else(|| bad_request("missing multipart field 'file'"))?;

    let max_bytes = state.config.extract.max_upload_mb * 1024 * 1024;
    if bytes.len() > max_bytes {
        return Err(bad_request(format!(
            "upload exceeds the {} MB limit",
            state.config.extract.max_upload_mb
        )));
    }

    info!("upload: {} ({} bytes)", filename, bytes.len());

    // PDF extraction can chew CPU for a while; keep it off the async runtime.
    let extract_config = state.config.extract.clone();
    let name = filename.clone();
    let document = tokio::task::spawn_blocking(move || extract_text(&bytes, &name, &extract_config))
        .await
        .map_err(|e| bad_request(format!("extraction task failed: {e}")))?
        .map_err(|e| bad_request(e.to_string()))?;

    info!(
        "extracted {} as {} ({} chars)",
        filename,
        document.kind.as_str(),
        document.total_chars()
    );

    let explanation = state
        .explainer
        .explain(&document.full_text())
        .await
        .map_err(llm_error)?;
    Ok(respond(explanation, Some(filename), &params))
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ExplainUrlRequest {
    /// Page to fetch and explain (http or https).
    pub url: String,
}

/// Fetch a URL and explain its visible text.
#[utoipa::path(
    post,
    path = "/explain/url",
    tag = "Explain",
    params(ExplainParams),
    request_body = ExplainUrlRequest,
    responses(
        (status = 200, description = "Explanation with reconciled citations", body = ExplainResponse),
        (status = 400, description = "Invalid or unfetchable URL", body = ErrorResponse),
        (status = 502, description = "LLM provider failure", body = ErrorResponse)
    )
)]
pub async fn explain_url(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExplainParams>,
    Json(request): Json<ExplainUrlRequest>,
) -> Result<Response, ApiError> {
    let document = state
        .fetcher
        .fetch(&request.url)
        .await
        .map_err(|e| bad_request(e.to_string()))?;

    let explanation = state
        .explainer
        .explain(&document.full_text())
        .await
        .map_err(llm_error)?;
    Ok(respond(explanation, Some(request.url), &params))
}
