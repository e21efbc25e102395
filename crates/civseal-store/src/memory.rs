//! In-memory implementation of the Ledger trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use civseal_core::{DocumentId, NewVersion, RecordVersion, VersionRef};

use crate::error::{Result, StoreError};
use crate::traits::{CommitResult, Ledger};

/// In-memory ledger implementation.
///
/// All data is lost when the ledger is dropped. Thread-safe via RwLock;
/// every write happens under a single write guard, so readers never see a
/// half-applied commit.
pub struct MemoryLedger {
    inner: RwLock<BTreeMap<DocumentId, BTreeMap<u32, RecordVersion>>>,
}

type Documents = BTreeMap<DocumentId, BTreeMap<u32, RecordVersion>>;

impl MemoryLedger {
    /// Create a new empty in-memory ledger.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Documents>> {
        self.inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Documents>> {
        self.inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn next_version(versions: &BTreeMap<u32, RecordVersion>) -> Result<u32> {
    match versions.keys().next_back() {
        None => Ok(1),
        Some(head) => head
            .checked_add(1)
            .ok_or_else(|| StoreError::InvalidData("version number overflow".into())),
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn put(&self, entry: NewVersion) -> Result<RecordVersion> {
        let mut inner = self.write()?;
        let versions = inner.entry(entry.document_id.clone()).or_default();

        if entry.status.is_active() {
            if let Some(active) = versions.values().find(|v| v.is_active()) {
                return Err(StoreError::ActiveVersionExists {
                    document_id: entry.document_id.to_string(),
                    version: active.version,
                });
            }
        }

        let version = next_version(versions)?;
        let stored = entry.into_version(version);
        versions.insert(version, stored.clone());
        Ok(stored)
    }

    async fn deactivate(&self, version_ref: &VersionRef, at: i64) -> Result<bool> {
        let mut inner = self.write()?;
        let stored = inner
            .get_mut(&version_ref.document_id)
            .and_then(|versions| versions.get_mut(&version_ref.version))
            .ok_or_else(|| {
                StoreError::NotFound(format!(
                    "{} v{}",
                    version_ref.document_id, version_ref.version
                ))
            })?;
        Ok(stored.deactivate(at))
    }

    async fn commit(&self, entry: NewVersion, expected_head: Option<u32>) -> Result<CommitResult> {
        let mut inner = self.write()?;
        let versions = inner.entry(entry.document_id.clone()).or_default();

        let current_head = versions.keys().next_back().copied();
        if current_head != expected_head {
            return Ok(CommitResult::Conflict { current_head });
        }

        let version = next_version(versions)?;
        let at = entry.created_at;
        let deactivated: Vec<u32> = versions
            .values_mut()
            .filter_map(|v| v.deactivate(at).then_some(v.version))
            .collect();

        let stored = entry.into_version(version);
        versions.insert(version, stored.clone());

        Ok(CommitResult::Committed {
            version: stored,
            deactivated,
        })
    }

    async fn get(&self, document_id: &DocumentId, version: u32) -> Result<Option<RecordVersion>> {
        let inner = self.read()?;
        Ok(inner
            .get(document_id)
            .and_then(|versions| versions.get(&version))
            .cloned())
    }

    async fn list_versions(&self, document_id: &DocumentId) -> Result<Vec<RecordVersion>> {
        let inner = self.read()?;
        Ok(inner
            .get(document_id)
            .map(|versions| versions.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn head_version(&self, document_id: &DocumentId) -> Result<Option<u32>> {
        let inner = self.read()?;
        Ok(inner
            .get(document_id)
            .and_then(|versions| versions.keys().next_back().copied()))
    }

    async fn list_documents(&self) -> Result<Vec<DocumentId>> {
        let inner = self.read()?;
        Ok(inner
            .iter()
            .filter(|(_, versions)| !versions.is_empty())
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn all_versions(&self) -> Result<Vec<RecordVersion>> {
        let inner = self.read()?;
        Ok(inner
            .values()
            .flat_map(|versions| versions.values().cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::LedgerExt;
    use civseal_core::{fingerprint, Keypair, Record, VersionStatus};

    fn make_entry(keypair: &Keypair, id: &str, address: &str) -> NewVersion {
        let record = Record {
            family_number: id.into(),
            address: address.into(),
            ..Default::default()
        };
        let signed = keypair.sign(&fingerprint(&record)).unwrap();
        NewVersion::active(
            record.document_id().unwrap(),
            record,
            signed,
            "Registrar",
            1_736_870_400_000,
        )
    }

    #[tokio::test]
    async fn test_memory_ledger_basic() {
        let ledger = MemoryLedger::new();
        let keypair = Keypair::from_seed(&[3; 32]).unwrap();
        let entry = make_entry(&keypair, "3201", "jl. a");
        let id = entry.document_id.clone();

        let stored = ledger.put(entry).await.unwrap();
        assert_eq!(stored.version, 1);

        let fetched = ledger.get(&id, 1).await.unwrap().unwrap();
        assert_eq!(fetched, stored);
        assert!(ledger.get(&id, 2).await.unwrap().is_none());
        assert_eq!(ledger.head_version(&id).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_put_refuses_second_active() {
        let ledger = MemoryLedger::new();
        let keypair = Keypair::from_seed(&[3; 32]).unwrap();

        ledger.put(make_entry(&keypair, "3201", "a")).await.unwrap();
        let err = ledger
            .put(make_entry(&keypair, "3201", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ActiveVersionExists { version: 1, .. }));

        let mut inactive = make_entry(&keypair, "3201", "c");
        inactive.status = VersionStatus::Inactive;
        assert_eq!(ledger.put(inactive).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_commit_supersedes_and_detects_conflict() {
        let ledger = MemoryLedger::new();
        let keypair = Keypair::from_seed(&[3; 32]).unwrap();
        let id = DocumentId::new("3201").unwrap();

        let first = ledger
            .commit(make_entry(&keypair, "3201", "a"), None)
            .await
            .unwrap();
        assert!(matches!(first, CommitResult::Committed { ref deactivated, .. } if deactivated.is_empty()));

        let second = ledger
            .commit(make_entry(&keypair, "3201", "b"), Some(1))
            .await
            .unwrap();
        match second {
            CommitResult::Committed {
                version,
                deactivated,
            } => {
                assert_eq!(version.version, 2);
                assert_eq!(deactivated, vec![1]);
            }
            other => panic!("unexpected {:?}", other),
        }

        let stale = ledger
            .commit(make_entry(&keypair, "3201", "c"), Some(1))
            .await
            .unwrap();
        assert_eq!(
            stale,
            CommitResult::Conflict {
                current_head: Some(2)
            }
        );

        let versions = ledger.list_versions(&id).await.unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].status, VersionStatus::Inactive);
        assert_eq!(versions[0].deactivated_at, Some(1_736_870_400_000));
        assert_eq!(ledger.active_version(&id).await.unwrap().unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_deactivate_is_idempotent() {
        let ledger = MemoryLedger::new();
        let keypair = Keypair::from_seed(&[3; 32]).unwrap();
        let stored = ledger.put(make_entry(&keypair, "3201", "a")).await.unwrap();

        assert!(ledger.deactivate(&stored.version_ref(), 5).await.unwrap());
        assert!(!ledger.deactivate(&stored.version_ref(), 6).await.unwrap());

        let missing = VersionRef::new(stored.document_id.clone(), 9);
        assert!(matches!(
            ledger.deactivate(&missing, 7).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_listing_and_fingerprint_scan() {
        let ledger = MemoryLedger::new();
        let keypair = Keypair::from_seed(&[3; 32]).unwrap();
        let a = make_entry(&keypair, "3201", "a");
        let wanted = civseal_core::Fingerprint::from_hex(&a.fingerprint_hex).unwrap();
        ledger.commit(a, None).await.unwrap();
        ledger
            .commit(make_entry(&keypair, "3201", "b"), Some(1))
            .await
            .unwrap();
        ledger
            .commit(make_entry(&keypair, "1101", "x"), None)
            .await
            .unwrap();

        let docs = ledger.list_documents().await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].as_str(), "1101");
        assert_eq!(ledger.all_versions().await.unwrap().len(), 3);

        let id = DocumentId::new("3201").unwrap();
        let hit = ledger.find_by_fingerprint(&id, &wanted).await.unwrap();
        assert_eq!(hit.unwrap().version, 1);

        let unknown = DocumentId::new("9999").unwrap();
        assert!(ledger.list_versions(&unknown).await.unwrap().is_empty());
    }
}
