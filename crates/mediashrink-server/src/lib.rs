//! HTTP front end for the MediaShrink compression dispatcher
//!
//! Routes:
//! - `POST /api/compress`: multipart upload with a `file` field, answered
//!   with the compressed bytes as an attachment
//! - `GET /health`: liveness probe

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::ServerArgs;
pub use error::ApiError;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/api/compress", post(handlers::compress))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use mediashrink_core::{CompressionDispatcher, StrategyRegistry};
    use tower::ServiceExt;

    const BOUNDARY: &str = "mediashrink-test-boundary";

    fn router(scratch: &std::path::Path) -> Router {
        let dispatcher = CompressionDispatcher::new(StrategyRegistry::default(), scratch);
        create_router(Arc::new(AppState::new(dispatcher, 1024 * 1024)))
    }

    fn multipart_body(field: &str, file_name: Option<&str>, data: &[u8]) -> Vec<u8> {
        let disposition = match file_name {
            Some(name) => format!("form-data; name=\"{}\"; filename=\"{}\"", field, name),
            None => format!("form-data; name=\"{}\"", field),
        };
        let mut body = format!(
            "--{}\r\nContent-Disposition: {}\r\nContent-Type: application/octet-stream\r\n\r\n",
            BOUNDARY, disposition
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload(body: Vec<u8>) -> Request<Body> {
        Request::post("/api/compress")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn error_message(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        value["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let temp = tempfile::TempDir::new().unwrap();
        let response = router(temp.path())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let temp = tempfile::TempDir::new().unwrap();
        let response = router(temp.path())
            .oneshot(upload(multipart_body("document", Some("a.jpg"), b"data")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(response).await, "No file provided");
    }

    #[tokio::test]
    async fn test_file_field_without_name() {
        let temp = tempfile::TempDir::new().unwrap();
        let response = router(temp.path())
            .oneshot(upload(multipart_body("file", None, b"data")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsupported_type() {
        let temp = tempfile::TempDir::new().unwrap();
        let scratch = temp.path().join("temp");
        let response = router(&scratch)
            .oneshot(upload(multipart_body("file", Some("setup.exe"), b"MZ")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(error_message(response).await.starts_with("Unsupported file type"));
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn test_internal_failure_is_generic() {
        let temp = tempfile::TempDir::new().unwrap();
        let response = router(temp.path())
            .oneshot(upload(multipart_body("file", Some("bad.zip"), b"not a zip")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_message(response).await, "Failed to compress file");
    }
}
