//! Resource engine error types.

use campus_shared::AppError;
use thiserror::Error;

use crate::storage::StorageError;

/// Resource operation errors.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Input could not be coerced or is missing required fields.
    #[error("{0}")]
    Validation(String),

    /// No record under the given key.
    #[error("{resource} '{id}' not found")]
    NotFound {
        /// Resource type name.
        resource: &'static str,
        /// Key as supplied.
        id: String,
    },

    /// Route names no declared resource type.
    #[error("unknown resource type '{0}'")]
    UnknownResource(String),

    /// Object storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Relational store failure.
    #[error("repository error: {0}")]
    Repository(String),
}

impl ResourceError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        if err.is_rejection() {
            Self::Validation(err.to_string())
        } else {
            Self::Storage(err.to_string())
        }
    }
}

impl From<ResourceError> for AppError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::Validation(msg) => Self::Validation(msg),
            e @ (ResourceError::NotFound { .. } | ResourceError::UnknownResource(_)) => {
                Self::NotFound(e.to_string())
            }
            ResourceError::Storage(e) => e.into(),
            ResourceError::Repository(msg) => Self::Repository(msg),
        }
    }
}
