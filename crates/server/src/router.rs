//! HTTP router construction.
//!
//! Assembles the explain routes, middleware, and OpenAPI docs into a single
//! `Router`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Document Explainer API",
        description = "Upload, paste, or link a document; get a plain-language explanation with reconciled inline citations."
    ),
    paths(
        api::health,
        api::config_summary,
        api::explain_text,
        api::explain_upload,
        api::explain_url
    ),
    components(schemas(
        api::HealthResponse,
        api::ExplainTextRequest,
        api::ExplainUrlRequest,
        api::ExplainResponse,
        api::CitationView,
        api::ErrorResponse
    ))
)]
struct ApiDoc;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Body limit: configured upload cap plus headroom for multipart framing.
    let body_limit = state.config.extract.max_upload_mb * 1024 * 1024 + 1024 * 1024;

    Router::new()
        .route("/health", get(api::health))
        .route("/config", get(api::config_summary))
        .route("/explain", post(api::explain_text))
        .route("/explain/upload", post(api::explain_upload))
        .route("/explain/url", post(api::explain_url))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use explainer_core::Config;
    use explainer_ingest::Fetcher;
    use explainer_llm::Explainer;

    fn test_state() -> Arc<AppState> {
        let mut config = Config::from_env();
        // Ollama needs no API key, so provider construction always succeeds.
        config.llm.provider = "ollama".to_string();
        let explainer = Explainer::from_config(&config.llm, &config.ollama).unwrap();
        let fetcher = Fetcher::new(&config.fetch).unwrap();
        Arc::new(AppState {
            config,
            explainer,
            fetcher,
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = build_router(test_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["llm_configured"], true);
    }

    #[tokio::test]
    async fn config_summary_has_no_secrets() {
        let response = build_router(test_state())
            .oneshot(Request::get("/config").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["llm"]["provider"].is_string());
        assert!(json["llm"].get("openai_api_key").is_none());
    }

    #[tokio::test]
    async fn empty_text_is_rejected() {
        let request = Request::post("/explain")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"text": "   "}"#))
            .unwrap();
        let response = build_router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn non_http_url_is_rejected() {
        let request = Request::post("/explain/url")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"url": "ftp://example.com/file"}"#))
            .unwrap();
        let response = build_router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("http"));
    }

    #[tokio::test]
    async fn upload_without_file_field_is_rejected() {
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{boundary}--\r\n"
        );
        let request = Request::post("/explain/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = build_router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("file"));
    }

    #[tokio::test]
    async fn docs_are_served() {
        let response = build_router(test_state())
            .oneshot(Request::get("/docs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
