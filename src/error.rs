//! Error types for openmic
//!
//! One error enum shared by the party engine and the HTTP layer, using
//! thiserror for propagation and an axum response mapping at the edge.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for openmic
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected input or unmet state precondition (400)
    #[error("{0}")]
    Validation(String),

    /// Caller may not perform this operation (403)
    #[error("{0}")]
    Permission(String),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a 400 validation failure
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Shorthand for a 403 permission failure
    pub fn permission(msg: impl Into<String>) -> Self {
        Error::Permission(msg.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Permission(_) => StatusCode::FORBIDDEN,
            Error::Config(_)
            | Error::Io(_)
            | Error::Serialization(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Convenience Result type using openmic Error
pub type Result<T> = std::result::Result<T, Error>;
