//! Error types for the verifier.
//!
//! Verification outcomes (`NotFound`, `Tampered`, ...) are not errors; they
//! are returned inside a [`crate::VerificationReport`]. The variants here
//! are structural and configuration failures.

use civseal_core::{CoreError, DocumentId};
use civseal_store::StoreError;
use thiserror::Error;

/// Errors that can occur during verifier operations.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Input is not record-shaped or lacks an identifier.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Update target does not match the record's own identifier.
    #[error("identifier mismatch: expected {expected}, record carries {found}")]
    IdentifierMismatch { expected: String, found: String },

    /// No usable signing key. Fatal at startup.
    #[error("signing key not configured: {0}")]
    KeyNotConfigured(String),

    /// A configuration value other than the key is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// First ingest of an identifier that already has versions.
    #[error("document already registered: {0}")]
    DocumentExists(DocumentId),

    /// Update of an identifier with no versions.
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    /// Every compare-and-set attempt lost to a concurrent update.
    #[error("concurrent update of {document_id} not resolved after {attempts} attempts")]
    ConcurrentUpdate {
        document_id: DocumentId,
        attempts: u32,
    },

    /// Signing failed after the key was loaded.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<CoreError> for KernelError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidRecord(msg) => KernelError::InvalidRecord(msg),
            CoreError::MissingIdentifier => {
                KernelError::InvalidRecord("record has no nomor_kk".into())
            }
            CoreError::InvalidKey(msg) | CoreError::KeyGeneration(msg) => {
                KernelError::KeyNotConfigured(msg)
            }
            other => KernelError::Crypto(other.to_string()),
        }
    }
}

/// Result type for verifier operations.
pub type Result<T> = std::result::Result<T, KernelError>;
