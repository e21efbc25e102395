//! SQLite implementation of the Ledger trait.
//!
//! This is the primary storage backend for civseal. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking. Every write
//! runs inside an IMMEDIATE transaction so that two processes sharing one
//! database file still serialize their supersedes.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use civseal_core::{
    DocumentId, NewVersion, PublicKey, Record, RecordVersion, Signature, VersionRef,
    VersionStatus,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{CommitResult, Ledger};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_COLUMNS: &str = "document_id, version, record, fingerprint_hex, signature, \
     public_key, algorithm, signer_name, status, created_at, deactivated_at";

/// SQLite-based ledger implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteLedger {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLedger {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection from a blocking thread.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

fn conversion_error(col: usize, ty: Type, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, ty, msg.into())
}

// Helper to convert a row (selected with SELECT_COLUMNS) to a RecordVersion
fn row_to_version(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecordVersion> {
    let document_id: String = row.get(0)?;
    let document_id =
        DocumentId::new(&document_id).map_err(|e| conversion_error(0, Type::Text, e.to_string()))?;

    let record_cbor: Vec<u8> = row.get(2)?;
    let record: Record = ciborium::from_reader(record_cbor.as_slice())
        .map_err(|e| conversion_error(2, Type::Blob, e.to_string()))?;

    let status: String = row.get(8)?;
    let status: VersionStatus = status
        .parse()
        .map_err(|e: civseal_core::CoreError| conversion_error(8, Type::Text, e.to_string()))?;

    Ok(RecordVersion {
        document_id,
        version: row.get(1)?,
        record,
        fingerprint_hex: row.get(3)?,
        signature: Signature::from_bytes(row.get::<_, Vec<u8>>(4)?),
        public_key: PublicKey::from_bytes(row.get::<_, Vec<u8>>(5)?),
        algorithm: row.get(6)?,
        signer_name: row.get(7)?,
        status,
        created_at: row.get(9)?,
        deactivated_at: row.get(10)?,
    })
}

fn encode_record(record: &Record) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(record, &mut buf)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn head_version(conn: &Connection, document_id: &str) -> Result<Option<u32>> {
    let head: Option<u32> = conn.query_row(
        "SELECT MAX(version) FROM record_versions WHERE document_id = ?1",
        params![document_id],
        |row| row.get(0),
    )?;
    Ok(head)
}

fn next_version(head: Option<u32>) -> Result<u32> {
    match head {
        None => Ok(1),
        Some(head) => head
            .checked_add(1)
            .ok_or_else(|| StoreError::InvalidData("version number overflow".into())),
    }
}

fn insert_version(conn: &Connection, version: &RecordVersion) -> Result<()> {
    let record = encode_record(&version.record)?;
    conn.execute(
        "INSERT INTO record_versions (
            document_id, version, record, fingerprint_hex, signature, public_key,
            algorithm, signer_name, status, created_at, deactivated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            version.document_id.as_str(),
            version.version,
            record,
            version.fingerprint_hex,
            version.signature.as_bytes(),
            version.public_key.as_bytes(),
            version.algorithm,
            version.signer_name,
            version.status.as_str(),
            version.created_at,
            version.deactivated_at,
        ],
    )?;
    Ok(())
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn put(&self, entry: NewVersion) -> Result<RecordVersion> {
        self.run(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let id = entry.document_id.to_string();

            if entry.status.is_active() {
                let active: Option<u32> = tx
                    .query_row(
                        "SELECT version FROM record_versions
                         WHERE document_id = ?1 AND status = 'active'",
                        params![id],
                        |row| row.get(0),
                    )
                    .optional()?;
                if let Some(version) = active {
                    return Err(StoreError::ActiveVersionExists {
                        document_id: id,
                        version,
                    });
                }
            }

            let version = next_version(head_version(&tx, &id)?)?;
            let stored = entry.into_version(version);
            insert_version(&tx, &stored)?;
            tx.commit()?;

            tracing::debug!(document_id = %id, version, "stored record version");
            Ok(stored)
        })
        .await
    }

    async fn deactivate(&self, version_ref: &VersionRef, at: i64) -> Result<bool> {
        let id = version_ref.document_id.to_string();
        let version = version_ref.version;

        self.run(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let changed = tx.execute(
                "UPDATE record_versions SET status = 'inactive', deactivated_at = ?3
                 WHERE document_id = ?1 AND version = ?2 AND status = 'active'",
                params![id, version, at],
            )?;

            if changed == 0 {
                let exists: Option<u32> = tx
                    .query_row(
                        "SELECT version FROM record_versions
                         WHERE document_id = ?1 AND version = ?2",
                        params![id, version],
                        |row| row.get(0),
                    )
                    .optional()?;
                if exists.is_none() {
                    return Err(StoreError::NotFound(format!("{} v{}", id, version)));
                }
            }

            tx.commit()?;
            Ok(changed > 0)
        })
        .await
    }

    async fn commit(&self, entry: NewVersion, expected_head: Option<u32>) -> Result<CommitResult> {
        self.run(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let id = entry.document_id.to_string();

            let current_head = head_version(&tx, &id)?;
            if current_head != expected_head {
                // Dropping the transaction rolls it back; nothing was written.
                return Ok(CommitResult::Conflict { current_head });
            }

            let deactivated: Vec<u32> = {
                let mut stmt = tx.prepare(
                    "SELECT version FROM record_versions
                     WHERE document_id = ?1 AND status = 'active'
                     ORDER BY version ASC",
                )?;
                let rows = stmt.query_map(params![id], |row| row.get(0))?;
                rows.collect::<std::result::Result<Vec<u32>, _>>()?
            };

            tx.execute(
                "UPDATE record_versions SET status = 'inactive', deactivated_at = ?2
                 WHERE document_id = ?1 AND status = 'active'",
                params![id, entry.created_at],
            )?;

            let version = next_version(current_head)?;
            let stored = entry.into_version(version);
            insert_version(&tx, &stored)?;
            tx.commit()?;

            tracing::debug!(
                document_id = %id,
                version,
                deactivated = deactivated.len(),
                "committed record version"
            );
            Ok(CommitResult::Committed {
                version: stored,
                deactivated,
            })
        })
        .await
    }

    async fn get(&self, document_id: &DocumentId, version: u32) -> Result<Option<RecordVersion>> {
        let id = document_id.to_string();
        self.run(move |conn| {
            let sql = format!(
                "SELECT {} FROM record_versions WHERE document_id = ?1 AND version = ?2",
                SELECT_COLUMNS
            );
            let found = conn
                .query_row(&sql, params![id, version], row_to_version)
                .optional()?;
            Ok(found)
        })
        .await
    }

    async fn list_versions(&self, document_id: &DocumentId) -> Result<Vec<RecordVersion>> {
        let id = document_id.to_string();
        self.run(move |conn| {
            let sql = format!(
                "SELECT {} FROM record_versions WHERE document_id = ?1 ORDER BY version ASC",
                SELECT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![id], row_to_version)?;
            Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
        })
        .await
    }

    async fn head_version(&self, document_id: &DocumentId) -> Result<Option<u32>> {
        let id = document_id.to_string();
        self.run(move |conn| head_version(conn, &id)).await
    }

    async fn list_documents(&self) -> Result<Vec<DocumentId>> {
        self.run(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT document_id FROM record_versions ORDER BY document_id ASC",
            )?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            ids.into_iter()
                .map(|id| DocumentId::new(&id).map_err(|e| StoreError::InvalidData(e.to_string())))
                .collect()
        })
        .await
    }

    async fn all_versions(&self) -> Result<Vec<RecordVersion>> {
        self.run(|conn| {
            let sql = format!(
                "SELECT {} FROM record_versions ORDER BY document_id ASC, version ASC",
                SELECT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_version)?;
            Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::LedgerExt;
    use civseal_core::{fingerprint, Keypair, Member};

    fn make_entry(keypair: &Keypair, id: &str, address: &str, at: i64) -> NewVersion {
        let record = Record {
            family_number: id.into(),
            head_of_family: "Budi Santoso".into(),
            address: address.into(),
            members: vec![Member {
                name: "Budi Santoso".into(),
                nik: "3201010101010002".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let signed = keypair.sign(&fingerprint(&record)).unwrap();
        NewVersion::active(record.document_id().unwrap(), record, signed, "Registrar", at)
    }

    #[tokio::test]
    async fn test_put_and_get_roundtrips_every_column() {
        let ledger = SqliteLedger::open_memory().unwrap();
        let keypair = Keypair::from_seed(&[5; 32]).unwrap();
        let entry = make_entry(&keypair, "3201", "Jl. Merdeka", 100);
        let id = entry.document_id.clone();

        let stored = ledger.put(entry).await.unwrap();
        assert_eq!(stored.version, 1);

        let fetched = ledger.get(&id, 1).await.unwrap().unwrap();
        assert_eq!(fetched, stored);
        assert_eq!(fetched.record.address, "Jl. Merdeka");
        assert!(fetched
            .public_key
            .verify(&fetched.stored_fingerprint().unwrap(), &fetched.signature));
    }

    #[tokio::test]
    async fn test_put_refuses_second_active() {
        let ledger = SqliteLedger::open_memory().unwrap();
        let keypair = Keypair::from_seed(&[5; 32]).unwrap();

        ledger.put(make_entry(&keypair, "3201", "a", 1)).await.unwrap();
        let err = ledger
            .put(make_entry(&keypair, "3201", "b", 2))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ActiveVersionExists { version: 1, .. }));

        let id = DocumentId::new("3201").unwrap();
        assert_eq!(ledger.list_versions(&id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_commit_supersedes_atomically() {
        let ledger = SqliteLedger::open_memory().unwrap();
        let keypair = Keypair::from_seed(&[5; 32]).unwrap();
        let id = DocumentId::new("3201").unwrap();

        ledger
            .commit(make_entry(&keypair, "3201", "a", 10), None)
            .await
            .unwrap();
        let result = ledger
            .commit(make_entry(&keypair, "3201", "b", 20), Some(1))
            .await
            .unwrap();

        match result {
            CommitResult::Committed {
                version,
                deactivated,
            } => {
                assert_eq!(version.version, 2);
                assert_eq!(deactivated, vec![1]);
            }
            other => panic!("unexpected {:?}", other),
        }

        let v1 = ledger.get(&id, 1).await.unwrap().unwrap();
        assert_eq!(v1.status, VersionStatus::Inactive);
        assert_eq!(v1.deactivated_at, Some(20));
        assert_eq!(ledger.active_version(&id).await.unwrap().unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_commit_conflict_writes_nothing() {
        let ledger = SqliteLedger::open_memory().unwrap();
        let keypair = Keypair::from_seed(&[5; 32]).unwrap();
        let id = DocumentId::new("3201").unwrap();

        ledger
            .commit(make_entry(&keypair, "3201", "a", 10), None)
            .await
            .unwrap();
        let stale = ledger
            .commit(make_entry(&keypair, "3201", "b", 20), None)
            .await
            .unwrap();
        assert_eq!(
            stale,
            CommitResult::Conflict {
                current_head: Some(1)
            }
        );

        let versions = ledger.list_versions(&id).await.unwrap();
        assert_eq!(versions.len(), 1);
        assert!(versions[0].is_active());
    }

    #[tokio::test]
    async fn test_deactivate_reports_change_and_missing() {
        let ledger = SqliteLedger::open_memory().unwrap();
        let keypair = Keypair::from_seed(&[5; 32]).unwrap();
        let stored = ledger
            .put(make_entry(&keypair, "3201", "a", 1))
            .await
            .unwrap();

        assert!(ledger.deactivate(&stored.version_ref(), 7).await.unwrap());
        assert!(!ledger.deactivate(&stored.version_ref(), 8).await.unwrap());

        let fetched = ledger.get(&stored.document_id, 1).await.unwrap().unwrap();
        assert_eq!(fetched.deactivated_at, Some(7));

        let missing = VersionRef::new(stored.document_id.clone(), 42);
        assert!(matches!(
            ledger.deactivate(&missing, 9).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_listing_order() {
        let ledger = SqliteLedger::open_memory().unwrap();
        let keypair = Keypair::from_seed(&[5; 32]).unwrap();

        for id in ["3201", "1101", "5171"] {
            ledger
                .commit(make_entry(&keypair, id, "a", 1), None)
                .await
                .unwrap();
        }
        ledger
            .commit(make_entry(&keypair, "1101", "b", 2), Some(1))
            .await
            .unwrap();

        let docs: Vec<String> = ledger
            .list_documents()
            .await
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(docs, vec!["1101", "3201", "5171"]);

        let all: Vec<(String, u32)> = ledger
            .all_versions()
            .await
            .unwrap()
            .into_iter()
            .map(|v| (v.document_id.to_string(), v.version))
            .collect();
        assert_eq!(
            all,
            vec![
                ("1101".to_string(), 1),
                ("1101".to_string(), 2),
                ("3201".to_string(), 1),
                ("5171".to_string(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_persistence_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let keypair = Keypair::from_seed(&[5; 32]).unwrap();

        {
            let ledger = SqliteLedger::open(&path).unwrap();
            ledger
                .commit(make_entry(&keypair, "3201", "a", 1), None)
                .await
                .unwrap();
            ledger
                .commit(make_entry(&keypair, "3201", "b", 2), Some(1))
                .await
                .unwrap();
        }

        let ledger = SqliteLedger::open(&path).unwrap();
        let id = DocumentId::new("3201").unwrap();
        assert_eq!(ledger.head_version(&id).await.unwrap(), Some(2));
        let active = ledger.active_version(&id).await.unwrap().unwrap();
        assert_eq!(active.version, 2);
        assert_eq!(active.record.address, "b");
    }
}
