//! Error types for the autofill API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use review_core::SessionError;

use crate::extraction::ExtractionError;
use crate::llm::ModelError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Review session not found: {0}")]
    SessionNotFound(Uuid),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        ApiError::Extraction(err.to_string())
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        ApiError::Extraction(err.to_string())
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
    status: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ApiError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                format!("Review session not found: {}", id),
            ),
            ApiError::Session(SessionError::Terminal) => (
                StatusCode::CONFLICT,
                "TERMINAL",
                "Review session is complete; start a new one".to_string(),
            ),
            ApiError::Session(SessionError::NotSaved) => (
                StatusCode::CONFLICT,
                "NOT_SAVED",
                "Current field has not been saved".to_string(),
            ),
            // Upstream failure text is passed through verbatim so the UI can
            // display it next to its placeholder fields.
            ApiError::Extraction(msg) => (StatusCode::BAD_GATEWAY, "EXTRACTION_FAILED", msg.clone()),
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal error".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}
