//! Error types for the optimistic client.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by [`Remote`](crate::Remote) calls and the
/// [`OptimisticClient`](crate::OptimisticClient).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server answered {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error(transparent)]
    Engine(#[from] paddock_engine::Error),

    #[error("{0} has not been confirmed by the server yet")]
    Unsettled(String),

    #[error("{0} environment variable is required")]
    MissingConfig(&'static str),
}

impl ClientError {
    /// The HTTP status of a server-side rejection, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Request(err) => err.status(),
            _ => None,
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
