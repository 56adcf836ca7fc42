//! Error types for the edit engine.

use recordkit_model::StoreError;
use thiserror::Error;

/// Result type for engine operations.
pub type CrudResult<T> = Result<T, CrudError>;

/// Errors that can occur while updating or hydrating an entry.
#[derive(Debug, Error)]
pub enum CrudError {
    /// The requested key does not resolve to a stored entity.
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    /// No key was given and the request context names no current entry.
    #[error("no current entry in request context")]
    NoCurrentEntry,

    /// Store, persister or metadata failure.
    #[error("storage error: {0}")]
    Store(StoreError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for CrudError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => Self::EntityNotFound(key),
            other => Self::Store(other),
        }
    }
}
