//! Database schema migrations for SQLite.
//!
//! Each migration transforms the schema from version N to N+1. Applied
//! versions are recorded in `schema_migrations`.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// Idempotent: safe to call on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema v{} is newer than supported v{}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
            tracing::debug!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: record versions.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE record_versions (
            document_id TEXT NOT NULL,        -- trimmed nomor_kk
            version INTEGER NOT NULL,         -- 1, 2, 3, ... per document
            record BLOB NOT NULL,             -- CBOR-encoded record as submitted
            fingerprint_hex TEXT NOT NULL,    -- lowercase hex BLAKE3 of canonical bytes
            signature BLOB NOT NULL,          -- ML-DSA-65 signature over the fingerprint
            public_key BLOB NOT NULL,         -- ML-DSA-65 public key
            algorithm TEXT NOT NULL,
            signer_name TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('active', 'inactive')),
            created_at INTEGER NOT NULL,      -- Unix ms
            deactivated_at INTEGER,           -- Unix ms, NULL while active

            PRIMARY KEY (document_id, version)
        );

        -- At most one active version per document
        CREATE UNIQUE INDEX idx_record_versions_active
            ON record_versions(document_id) WHERE status = 'active';

        CREATE INDEX idx_record_versions_fingerprint
            ON record_versions(document_id, fingerprint_hex);
        "#,
    )?;

    Ok(())
}

/// Current time in milliseconds. Clamps to 0 if the clock is before the epoch.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
