//! JSON error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::AppError;

/// Failure surfaced to an HTTP client as `{status: "error", message}`.
#[derive(Debug)]
pub enum ApiError {
    /// Request body could not be understood.
    BadRequest(String),
    /// Shared state or another internal dependency failed.
    Internal(AppError),
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Internal(err) => {
                error!(%err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        let body = ErrorBody {
            status: "error",
            message,
        };
        (code, Json(body)).into_response()
    }
}
