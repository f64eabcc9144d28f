//! Unified error handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Invalid entity kind: {0}")]
    InvalidKind(String),

    #[error("Cannot address temporary id: {0}")]
    TemporaryId(String),

    #[error("Not found: {kind}/{id}")]
    NotFound { kind: String, id: String },

    #[error("Service unavailable for {0}")]
    Unavailable(String),
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::InvalidKind(kind) => (
                StatusCode::BAD_REQUEST,
                "invalid entity kind".to_string(),
                Some(kind.clone()),
            ),
            AppError::TemporaryId(id) => (
                StatusCode::BAD_REQUEST,
                "temporary id".to_string(),
                Some(id.clone()),
            ),
            AppError::NotFound { kind, id } => (
                StatusCode::NOT_FOUND,
                "not found".to_string(),
                Some(format!("{}/{}", kind, id)),
            ),
            AppError::Unavailable(kind) => {
                tracing::error!("Refusing mutation of {}: failure injection enabled", kind);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service unavailable".to_string(),
                    Some(kind.clone()),
                )
            }
        };

        if status.is_client_error() {
            tracing::warn!("Rejected request: {}", self);
        }

        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;
