//! HTTP API surface.

mod debug;
mod documents;
mod error;
mod qa;
mod summaries;

pub use error::ApiError;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::AppState;

/// Assemble the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/api/v1/document/index", post(documents::index_document))
        .route(
            "/api/v1/document/index-with-summary",
            post(documents::index_document_with_summary),
        )
        .route(
            "/api/v1/document/{document_id}/generate-summary",
            post(summaries::generate_summary),
        )
        .route(
            "/api/v1/document/{document_id}/generate-comprehensive-summaries",
            post(summaries::generate_comprehensive_summaries),
        )
        .route("/api/v1/qa/ask", post(qa::ask))
        .route("/api/v1/qa/ask-multiple", post(qa::ask_multiple))
        .route("/api/v1/debug/document/{document_id}", get(debug::document))
        .route("/api/v1/debug/search/{document_id}", get(debug::search))
        .route("/api/v1/debug/retrieve/{document_id}", get(debug::retrieve))
        .route("/api/v1/debug/collections", get(debug::collections))
        // Uploads can be large scanned documents
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::embedding::{EmbeddingBackend, Result as EmbeddingResult};
    use crate::genai::GeminiClient;
    use crate::rag::VectorIndex;

    use super::*;

    /// Deterministic embedder so tests never touch an embedding service.
    struct StubEmbedder;

    #[async_trait]
    impl EmbeddingBackend for StubEmbedder {
        fn model(&self) -> &str {
            "stub-embedder"
        }

        async fn embed(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let sum: u32 = t.bytes().map(u32::from).sum();
                    vec![(sum % 101) as f32 + 1.0, (t.len() % 97) as f32]
                })
                .collect())
        }
    }

    /// App wired to a stub embedder and a dead generative endpoint, so
    /// generation failures surface through the in-band error path.
    fn test_app(dir: &tempfile::TempDir) -> Router {
        let mut config = AppConfig::default();
        config.data_dir = dir.path().to_path_buf();
        config.genai.base_url = Some("http://127.0.0.1:9".to_string());

        let index = VectorIndex::new(config.index_db_path()).unwrap();
        let genai = GeminiClient::new(&config.genai).unwrap();

        let state = AppState {
            config,
            index: Mutex::new(index),
            embedder: Arc::new(StubEmbedder),
            genai,
        };

        router(Arc::new(state))
    }

    fn multipart_upload(uri: &str, filename: &str, content: &str) -> Request<Body> {
        let boundary = "test-boundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\r\n{content}\r\n--{boundary}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_csv_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        let response = app
            .oneshot(multipart_upload(
                "/api/v1/document/index",
                "table.csv",
                "a,b,c",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .contains("Unsupported file type"));
    }

    #[tokio::test]
    async fn test_whitespace_upload_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        let response = app
            .oneshot(multipart_upload(
                "/api/v1/document/index",
                "blank.txt",
                "   ",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_txt_upload_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        let response = app
            .clone()
            .oneshot(multipart_upload(
                "/api/v1/document/index",
                "notes.txt",
                "The warehouse relocated to Tampere in March.",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["filename"], "notes.txt");
        assert!(body["total_chunks_indexed"].as_u64().unwrap() >= 1);

        let document_id = body["document_id"].as_str().unwrap().to_string();

        // The collection is visible through the debug surface
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/debug/document/{}", document_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["total_chunks"].as_u64().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ask_missing_question_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        let response = app
            .oneshot(json_post(
                "/api/v1/qa/ask",
                serde_json::json!({ "document_id": "some-doc" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "Missing document_id or question.");
    }

    #[tokio::test]
    async fn test_ask_unknown_document_answers_no_context() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        let response = app
            .oneshot(json_post(
                "/api/v1/qa/ask",
                serde_json::json!({
                    "document_id": "never-indexed",
                    "question": "What is this about?",
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body["answer"],
            crate::genai::NO_CONTEXT_ANSWER
        );
    }

    #[tokio::test]
    async fn test_ask_reports_generation_failure_in_band() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        let response = app
            .clone()
            .oneshot(multipart_upload(
                "/api/v1/document/index",
                "notes.txt",
                "The quarterly budget was approved on Friday.",
            ))
            .await
            .unwrap();
        let document_id = body_json(response).await["document_id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .oneshot(json_post(
                "/api/v1/qa/ask",
                serde_json::json!({
                    "document_id": document_id,
                    "question": "When was the budget approved?",
                }),
            ))
            .await
            .unwrap();

        // The dead generative endpoint fails, but the response stays
        // success-shaped with the failure reported as text.
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["answer"].as_str().unwrap().starts_with("Error:"));
        assert_eq!(body["sources_used"].as_array().unwrap().len(), 1);
        let similarity = body["sources_used"][0]["similarity"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&similarity));
    }

    #[tokio::test]
    async fn test_summary_for_unknown_document_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/document/nope/generate-summary?summary_type=overview")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ask_multiple_missing_ids_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        let response = app
            .oneshot(json_post(
                "/api/v1/qa/ask-multiple",
                serde_json::json!({ "question": "Compare them" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ask_multiple_returns_sources() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        let mut ids = Vec::new();
        for content in ["Contract A covers shipping.", "Contract B covers storage."] {
            let response = app
                .clone()
                .oneshot(multipart_upload("/api/v1/document/index", "c.txt", content))
                .await
                .unwrap();
            ids.push(
                body_json(response).await["document_id"]
                    .as_str()
                    .unwrap()
                    .to_string(),
            );
        }

        let response = app
            .oneshot(json_post(
                "/api/v1/qa/ask-multiple",
                serde_json::json!({
                    "document_ids": ids,
                    "question": "What do the contracts cover?",
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let sources = body["sources"].as_array().unwrap();
        assert!(!sources.is_empty());
        assert!(sources.len() <= 10);
        for source in sources {
            let similarity = source["similarity"].as_f64().unwrap();
            assert!((0.0..=1.0).contains(&similarity));
            assert!(source["source_info"].as_str().unwrap().starts_with("Document: "));
        }
    }
}
