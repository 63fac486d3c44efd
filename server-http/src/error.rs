use crate::models::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

/// Error returned to HTTP callers. Carries only a generic, user-facing
/// message; the underlying error is logged when the value is built.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Translate a core error. `generation_message` is what the caller sees
    /// when generation itself failed.
    pub fn from_lookup(err: shared::Error, generation_message: &str) -> Self {
        match err {
            shared::Error::Validation(message) => {
                warn!("Rejected request: {}", message);
                Self::new(StatusCode::BAD_REQUEST, message)
            }
            shared::Error::BackendUnconfigured => {
                error!("Request received but generation backend is not configured");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "AI Model not configured")
            }
            shared::Error::Generation(detail) => {
                error!("Generation failed: {}", detail);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, generation_message)
            }
            other => {
                error!("Request failed: {}", other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }

    pub fn timeout() -> Self {
        warn!("Request timed out");
        Self::new(StatusCode::GATEWAY_TIMEOUT, "Request timed out")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}
