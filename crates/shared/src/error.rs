//! Application-wide error types.

use serde_json::{Value, json};
use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Every failure leaving the API is one of these kinds. The message is meant
/// for humans; the code returned by [`AppError::error_code`] is stable.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request rejected by the access gate.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Missing or malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No record with the given key.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Object storage I/O failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Relational store I/O failure.
    #[error("Repository error: {0}")]
    Repository(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Storage(_) | Self::Repository(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Repository(_) => "REPOSITORY_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns `true` for failures caused by the server rather than the caller.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Message safe to show to the client.
    ///
    /// Server-side failures get a generic message so store internals never
    /// reach the caller.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(msg) | Self::Validation(msg) | Self::NotFound(msg) => msg.clone(),
            Self::Storage(_) => "Storage operation failed".to_string(),
            Self::Repository(_) => "Database operation failed".to_string(),
            Self::Internal(_) => "An error occurred".to_string(),
        }
    }

    /// JSON body in the `{error, message}` shape shared by every endpoint.
    #[must_use]
    pub fn body(&self) -> Value {
        json!({
            "error": self.error_code(),
            "message": self.public_message(),
        })
    }
}
