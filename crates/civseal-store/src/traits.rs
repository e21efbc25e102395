//! Ledger trait: the abstract interface for record version persistence.
//!
//! This trait keeps the verifier storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use civseal_core::{DocumentId, Fingerprint, NewVersion, RecordVersion, VersionRef};

use crate::error::Result;

/// Result of the atomic supersede primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResult {
    /// The new version was written; `deactivated` lists the version numbers
    /// that were switched to `Inactive` in the same step.
    Committed {
        version: RecordVersion,
        deactivated: Vec<u32>,
    },
    /// The head version moved since the caller read it. Nothing was written.
    Conflict {
        /// The head version observed inside the critical section.
        current_head: Option<u32>,
    },
}

/// The Ledger trait: async interface for record version persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// # Design Notes
///
/// - **Version assignment**: the ledger, not the caller, assigns version
///   numbers as `max(existing) + 1`, or 1 for an unknown document.
/// - **Single active version**: `put` refuses a second `Active` version with
///   [`crate::StoreError::ActiveVersionExists`].
/// - **Atomic supersede**: `commit` is the only way to replace an active
///   version and is serialized per document identifier.
#[async_trait]
pub trait Ledger: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Persist a new version at `max(existing) + 1`.
    ///
    /// Does not deactivate other versions.
    async fn put(&self, entry: NewVersion) -> Result<RecordVersion>;

    /// Switch a version from `Active` to `Inactive`, stamping `at`.
    ///
    /// Returns `true` if the status changed, `false` if it was already
    /// inactive. Fails with `NotFound` if the version does not exist.
    async fn deactivate(&self, version_ref: &VersionRef, at: i64) -> Result<bool>;

    /// Compare-and-set supersede.
    ///
    /// In one critical section: read the head version of
    /// `entry.document_id`; if it differs from `expected_head`, return
    /// `Conflict`. Otherwise deactivate every `Active` version of the
    /// document (stamped with `entry.created_at`) and write `entry` at
    /// `head + 1` (or 1).
    async fn commit(&self, entry: NewVersion, expected_head: Option<u32>) -> Result<CommitResult>;

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Get one version of a document.
    async fn get(&self, document_id: &DocumentId, version: u32) -> Result<Option<RecordVersion>>;

    /// All versions of a document, ascending by version number.
    ///
    /// Empty for an unknown document.
    async fn list_versions(&self, document_id: &DocumentId) -> Result<Vec<RecordVersion>>;

    /// Highest version number stored for a document.
    async fn head_version(&self, document_id: &DocumentId) -> Result<Option<u32>>;

    /// Every document identifier with at least one version, ascending.
    async fn list_documents(&self) -> Result<Vec<DocumentId>>;

    /// Every stored version, ordered by document identifier then version.
    async fn all_versions(&self) -> Result<Vec<RecordVersion>>;
}

/// Extension trait for common ledger queries.
pub trait LedgerExt: Ledger {
    /// The currently active version of a document, if any.
    fn active_version(
        &self,
        document_id: &DocumentId,
    ) -> impl std::future::Future<Output = Result<Option<RecordVersion>>> + Send;

    /// Scan every version of a document for one whose stored fingerprint
    /// equals `fingerprint`. An active match wins; otherwise the lowest
    /// matching version.
    fn find_by_fingerprint(
        &self,
        document_id: &DocumentId,
        fingerprint: &Fingerprint,
    ) -> impl std::future::Future<Output = Result<Option<RecordVersion>>> + Send;
}

impl<L: Ledger + ?Sized> LedgerExt for L {
    async fn active_version(&self, document_id: &DocumentId) -> Result<Option<RecordVersion>> {
        let versions = self.list_versions(document_id).await?;
        Ok(versions.into_iter().rev().find(|v| v.is_active()))
    }

    async fn find_by_fingerprint(
        &self,
        document_id: &DocumentId,
        fingerprint: &Fingerprint,
    ) -> Result<Option<RecordVersion>> {
        let versions = self.list_versions(document_id).await?;
        Ok(select_by_fingerprint(versions, fingerprint))
    }
}

/// Pick the version whose stored fingerprint equals `fingerprint` from an
/// ascending version list. An active match wins; otherwise the lowest.
pub fn select_by_fingerprint(
    versions: impl IntoIterator<Item = RecordVersion>,
    fingerprint: &Fingerprint,
) -> Option<RecordVersion> {
    let target = fingerprint.to_hex();
    let mut matches = versions
        .into_iter()
        .filter(|v| v.fingerprint_hex == target);

    let first = matches.next()?;
    if first.is_active() {
        return Some(first);
    }
    Some(matches.find(|v| v.is_active()).unwrap_or(first))
}
