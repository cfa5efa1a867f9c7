use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use mediashrink_core::{CompressError, CompressedResponse, CompressionRequest};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;

/// Multipart field carrying the upload
pub const FILE_FIELD: &str = "file";

/// Header naming the degradation cause when the original bytes are returned
pub const DEGRADED_HEADER: &str = "x-compression-degraded";

/// POST /api/compress - Compress one uploaded file
pub async fn compress(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let request = read_upload(multipart).await?;
    tracing::info!(
        "POST /api/compress ({}, {} bytes)",
        request.file_name(),
        request.len()
    );

    let response = state.dispatcher.dispatch(&request).await?;
    into_http(response)
}

/// GET /health - Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Pull the `file` field out of the form
///
/// Other fields are skipped. A `file` field without a file name counts as
/// no file at all.
async fn read_upload(mut multipart: Multipart) -> Result<CompressionRequest, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_owned) else {
            return Err(CompressError::NoFile.into());
        };
        let data: Bytes = field.bytes().await?;
        return Ok(CompressionRequest::new(file_name, data));
    }

    Err(CompressError::NoFile.into())
}

fn into_http(response: CompressedResponse) -> Result<Response, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(response.mime_type()));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&response.content_disposition())
            .map_err(|e| ApiError::Response(e.to_string()))?,
    );
    headers.insert(CONTENT_LENGTH, HeaderValue::from(response.bytes().len()));
    if let Some(reason) = &response.degraded {
        headers.insert(
            HeaderName::from_static(DEGRADED_HEADER),
            HeaderValue::from_static(reason.tag()),
        );
    }

    let body = Body::from(response.result.bytes);
    Ok((StatusCode::OK, headers, body).into_response())
}
