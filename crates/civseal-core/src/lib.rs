//! # civseal Core
//!
//! Pure primitives for issuing and checking attestations over household
//! registration records (Kartu Keluarga).
//!
//! This crate contains no I/O and no storage. It is pure computation over
//! records, fingerprints, and signatures.
//!
//! ## Key Types
//!
//! - [`Record`] / [`Member`] - The structured content of a registration document
//! - [`Fingerprint`] - BLAKE3 digest of a record's canonical encoding
//! - [`Keypair`], [`PublicKey`], [`Signature`] - ML-DSA-65 signing and verification
//! - [`RecordVersion`] - One signed, versioned snapshot of a record
//!
//! ## Canonicalization
//!
//! Records are hashed over a normalized, sorted-key JSON encoding. See the
//! [`canonical`] module.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod record;
pub mod types;
pub mod version;

pub use canonical::{canonical_bytes, canonicalize_value, fingerprint};
pub use crypto::{Fingerprint, Keypair, PublicKey, Signature, SignedFingerprint, ALGORITHM};
pub use error::CoreError;
pub use record::{Member, Record};
pub use types::{DocumentId, VersionStatus};
pub use version::{NewVersion, RecordVersion, VersionRef};
