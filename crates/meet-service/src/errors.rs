//! Meet Service error types.
//!
//! All errors map to appropriate HTTP status codes via the `IntoResponse` impl.
//! Error messages returned to clients are intentionally generic to avoid
//! leaking internal details. Actual errors are logged server-side.
//!
//! Room-full admission denials are not errors; the join handler renders
//! them directly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Meet Service error type.
///
/// Maps to appropriate HTTP status codes:
/// - NotFound: 404 Not Found
/// - BadRequest: 400 Bad Request
/// - Storage: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum MeetError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl MeetError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            MeetError::NotFound(_) => 404,
            MeetError::BadRequest(_) => 400,
            MeetError::Storage(_) => 500,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for MeetError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            MeetError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", resource.clone())
            }
            MeetError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone())
            }
            MeetError::Storage(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "meet.storage", error = %err, "Storage operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "An internal storage error occurred".to_string(),
                )
            }
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}

/// Convert filesystem errors to MeetError
impl From<std::io::Error> for MeetError {
    fn from(err: std::io::Error) -> Self {
        MeetError::Storage(err.to_string())
    }
}
