//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use faithgate_core::submission::{Rejection, RejectionCode};

/// API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Content was refused by moderation.
    #[error("content rejected: {}", .0.reason)]
    Rejected(Rejection),

    /// Text exceeds the configured size limit.
    #[error("text too long: {len} bytes (max {max})")]
    TextTooLong { len: usize, max: usize },
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub code: String,
    pub reason: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, reason) = match self {
            ApiError::Rejected(rejection) => {
                let (status, code) = match rejection.code {
                    RejectionCode::CaptionRequired => (StatusCode::BAD_REQUEST, "CAPTION_REQUIRED"),
                    RejectionCode::ContentRejected => (StatusCode::BAD_REQUEST, "CONTENT_REJECTED"),
                    RejectionCode::FaithOrSafetyFail => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "FAITH_OR_SAFETY_FAIL")
                    }
                };
                (status, code, rejection.reason)
            }
            err @ ApiError::TextTooLong { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "TEXT_TOO_LONG", err.to_string())
            }
        };

        let body = ErrorResponse {
            ok: false,
            code: code.to_string(),
            reason,
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
