pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::drafting::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Uploads (transcripts, curriculum screenshots) exceed axum's 2 MB default.
    let body_limit = state.config.max_upload_mb * 1024 * 1024;

    Router::new()
        .route("/health", get(health::health_handler))
        // Session API
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route("/api/v1/sessions/:id", get(handlers::handle_get_session))
        .route(
            "/api/v1/sessions/:id/draft/:language",
            put(handlers::handle_replace_draft),
        )
        .route(
            "/api/v1/sessions/:id/revise/:language",
            post(handlers::handle_revise_draft),
        )
        .route(
            "/api/v1/sessions/:id/translate",
            post(handlers::handle_translate_session),
        )
        .route(
            "/api/v1/sessions/:id/export/:language",
            get(handlers::handle_export),
        )
        // Stateless API
        .route("/api/v1/translate", post(handlers::handle_translate))
        .route("/api/v1/edit", post(handlers::handle_edit))
        .route("/api/v1/headers", post(handlers::handle_headers))
        .route("/api/v1/documents", post(handlers::handle_render_document))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::drafting::session::SessionStore;
    use crate::llm_client::testing::ScriptedGateway;

    fn app() -> Router {
        build_router(AppState {
            llm: Arc::new(ScriptedGateway::replying("unused")),
            sessions: SessionStore::default(),
            config: Config::for_tests(),
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "statement-api");
    }

    #[tokio::test]
    async fn test_documents_endpoint_renders_without_model_call() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/documents")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"content":"**Hi**\n--- Motivation ---\nBody","header":"Title","language":"en"}"#,
            ))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-disposition"],
            "attachment; filename=personal_statement_en.docx"
        );
    }

    #[tokio::test]
    async fn test_unknown_language_segment_is_rejected() {
        let uri = format!("/api/v1/sessions/{}/export/fr", uuid::Uuid::new_v4());
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
