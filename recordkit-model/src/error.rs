//! Error types shared by the collaborator contracts.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store, persister and metadata collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record matches the requested key.
    #[error("entity not found: {0}")]
    NotFound(String),

    /// Failure reported by the backing store.
    #[error("backend error: {0}")]
    Backend(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
