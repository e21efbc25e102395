//! # civseal Testkit
//!
//! Testing utilities for civseal.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known records with their expected canonical bytes and fingerprints
//! - **Generators**: Proptest strategies for records, presentation variants, and keys
//! - **Fixtures**: A deterministic keypair, an in-memory ledger, and sample records
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the canonical encoding so other implementations can
//! check themselves against it:
//!
//! ```rust
//! use civseal_testkit::vectors::{all_vectors, record_from_vector};
//! use civseal_core::fingerprint;
//!
//! for vector in all_vectors() {
//!     let record = record_from_vector(&vector).unwrap();
//!     assert_eq!(fingerprint(&record).to_hex(), vector.fingerprint_hex);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use civseal_testkit::generators::record_and_variant;
//!
//! proptest! {
//!     #[test]
//!     fn presentation_does_not_matter((a, b) in record_and_variant()) {
//!         prop_assert_eq!(civseal_core::fingerprint(&a), civseal_core::fingerprint(&b));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use civseal_testkit::fixtures::{sample_record, TestFixture, FIXED_TIME};
//!
//! let fixture = TestFixture::new().unwrap();
//! let entry = fixture.make_entry(sample_record(), FIXED_TIME).unwrap();
//! assert_eq!(entry.document_id.as_str(), "3201010101010001");
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{sample_member, sample_record, tampered_sample, TestFixture};
pub use generators::{presentation_variant, record, record_and_variant};
pub use vectors::{all_vectors, record_from_vector, verify_all_vectors, GoldenVector};
