//! Maps domain `AppError` to HTTP responses.
//!
//! Only errors raised before a WebSocket session exists reach this path;
//! everything after the upgrade travels as `call-error` events instead.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use huddle_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Newtype carrying an [`AppError`] out of a handler.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match &err.kind {
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::TargetUnavailable => StatusCode::NOT_FOUND,
            ErrorKind::TargetBusy => StatusCode::CONFLICT,
            ErrorKind::CallerNotEligible => StatusCode::FORBIDDEN,
            ErrorKind::StaleCallReference => StatusCode::GONE,
            ErrorKind::Serialization => StatusCode::BAD_REQUEST,
            ErrorKind::Configuration | ErrorKind::Internal => {
                tracing::error!(error = %err.message, "Internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiErrorResponse {
            error: err.kind.to_string(),
            message: err.message,
        };

        (status, Json(body)).into_response()
    }
}
