//! # civseal Store
//!
//! The version ledger: persistence for signed record versions, keyed by
//! `(document_id, version)`, with at most one `Active` version per document.
//!
//! ## Key Types
//!
//! - [`Ledger`] - The async trait for all ledger operations
//! - [`SqliteLedger`] - SQLite-based persistent ledger
//! - [`MemoryLedger`] - In-memory ledger for tests and embedding
//! - [`CommitResult`] - Outcome of the atomic supersede primitive
//!
//! ## Usage
//!
//! ```rust,no_run
//! use civseal_store::{Ledger, SqliteLedger};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let ledger = SqliteLedger::open("civseal.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let ledger = SqliteLedger::open_memory().unwrap();
//!
//!     // let versions = ledger.list_versions(&document_id).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Gapless versions**: every write takes `max(existing) + 1`, or 1.
//! - **Single active version**: writing a second `Active` version without
//!   deactivating the first is refused, never silently accepted.
//! - **Compare-and-set**: [`Ledger::commit`] deactivates prior versions and
//!   writes the new one in one step, guarded by the expected head version.
//! - **All-or-nothing writes**: readers never observe a partial version.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;
pub use traits::{select_by_fingerprint, CommitResult, Ledger, LedgerExt};
