//! Error types for civseal core.

use thiserror::Error;

/// Errors raised by the pure primitives.
///
/// Verification failures are not errors: [`crate::PublicKey::verify`]
/// reports them as `false`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("record has no document identifier")]
    MissingIdentifier,

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}
