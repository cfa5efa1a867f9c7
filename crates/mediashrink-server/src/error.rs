use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mediashrink_core::CompressError;
use serde_json::json;
use thiserror::Error;

/// Body returned for every request that fails inside the compression path
pub const INTERNAL_ERROR_MESSAGE: &str = "Failed to compress file";

/// Errors surfaced by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Compress(#[from] CompressError),

    #[error("Malformed upload: {0}")]
    Upload(#[from] MultipartError),

    #[error("Failed to build response: {0}")]
    Response(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Compress(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Upload(e) => e.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Compress(e) if e.is_client_error() => {
                tracing::warn!("Rejected upload: {}", e);
                e.to_string()
            }
            ApiError::Upload(e) => {
                tracing::warn!("Malformed upload: {}", e);
                e.body_text()
            }
            other => {
                tracing::error!("Compression request failed: {}", other);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(CompressError::NoFile).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CompressError::UnsupportedType("exe".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CompressError::Archive("bad".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Response("bad header".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
