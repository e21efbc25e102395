//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Version not found.
    #[error("version not found: {0}")]
    NotFound(String),

    /// A second active version was about to be written.
    #[error("document {document_id} already has active version {version}")]
    ActiveVersionExists { document_id: String, version: u32 },

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A lock guarding in-process state was poisoned.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// A blocking task failed to complete.
    #[error("blocking task failed: {0}")]
    Task(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
