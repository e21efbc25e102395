//! # civseal
//!
//! Tamper-evident attestation for household registration records (Kartu
//! Keluarga): every registered record is canonicalized, fingerprinted with
//! BLAKE3, signed with ML-DSA-65, and stored as an immutable version.
//!
//! ## Overview
//!
//! - **Ingest**: a new document becomes version 1, `Active`
//! - **Update**: a corrected document supersedes the active version; older
//!   versions are kept, marked `Inactive`
//! - **Verify**: a presented record, or a stored version addressed by a QR
//!   link, is classified as one of `NotFound`, `Tampered`,
//!   `SignatureInvalid`, `Inactive`, or `Valid`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use civseal::{Config, Verifier};
//! use civseal::core::Record;
//! use civseal::store::SqliteLedger;
//!
//! async fn example() -> civseal::Result<()> {
//!     // Keys come from ML_DSA_PRIVATE_KEY_BASE64 / ML_DSA_PUBLIC_KEY_BASE64
//!     let config = Config::from_env()?;
//!     let ledger = SqliteLedger::open("civseal.db")?;
//!     let verifier = Verifier::new(config, ledger);
//!
//!     let record = Record::from_json(r#"{"nomor_kk": "3201010101010001"}"#)?;
//!     let receipt = verifier.ingest(record.clone()).await?;
//!
//!     let report = verifier.verify_record(&record).await?;
//!     assert!(report.valid);
//!
//!     let report = verifier
//!         .verify_version(&receipt.document_id, receipt.version)
//!         .await?;
//!     println!("{}", report.status_label);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `civseal::core` - Record model, canonicalization, fingerprints, signatures
//! - `civseal::store` - Version ledger trait, SQLite and in-memory backends

pub mod config;
pub mod error;
pub mod outcome;
pub mod signer;
pub mod verifier;

// Re-export component crates
pub use civseal_core as core;
pub use civseal_store as store;

// Re-export main types for convenience
pub use config::Config;
pub use error::{KernelError, Result};
pub use outcome::{Check, Outcome, VerificationReport};
pub use signer::Signer;
pub use verifier::{IngestReceipt, Verifier};

// Re-export commonly used core types
pub use civseal_core::{
    DocumentId, Fingerprint, Keypair, Member, PublicKey, Record, RecordVersion, Signature,
    VersionStatus,
};
