use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use efference_cloud::StorageError;
use serde_json::json;

/// Errors returned by the dataset handlers.
///
/// Rendered as `{ "error": ..., "code": ... }`, the same shape the platform
/// API uses.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type ServeResult<T> = Result<T, ServeError>;

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServeError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ServeError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ServeError::Storage(err) => {
                tracing::error!(error = %err, "Object storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message, "code": code }))).into_response()
    }
}
