//! The Verifier: ingest and verification over a version ledger.
//!
//! Ingest canonicalizes, digests, and signs a record, then hands it to the
//! ledger's compare-and-set `commit`. Verification walks the five-state
//! chain `NotFound -> Tampered -> SignatureInvalid -> Inactive -> Valid`
//! and stops at the first state that applies.

use std::sync::Arc;

use civseal_core::{
    fingerprint, DocumentId, Fingerprint, NewVersion, Record, RecordVersion, ALGORITHM,
};
use civseal_store::{select_by_fingerprint, CommitResult, Ledger, SqliteLedger};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::error::{KernelError, Result};
use crate::outcome::VerificationReport;

/// What the caller gets back from a successful ingest or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub document_id: DocumentId,
    pub version: u32,
    /// Lowercase hex BLAKE3 fingerprint of the canonical record.
    pub fingerprint_hex: String,
    /// Stored-record verification link, if a base URL is configured.
    pub verify_url: Option<String>,
    /// Creation time (Unix ms).
    pub created_at: i64,
}

/// The main Verifier struct.
///
/// Provides:
/// - First ingest and supersede (update) of records
/// - Verification of a presented record against every stored version
/// - Verification of one stored version by its address
/// - Version history queries
pub struct Verifier<L: Ledger> {
    config: Config,
    ledger: Arc<L>,
}

impl<L: Ledger> Verifier<L> {
    /// Create a verifier over a ledger it owns.
    pub fn new(config: Config, ledger: L) -> Self {
        Self::with_shared_ledger(config, Arc::new(ledger))
    }

    /// Create a verifier over a ledger shared with other components.
    pub fn with_shared_ledger(config: Config, ledger: Arc<L>) -> Self {
        Self { config, ledger }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Stored-record verification link for one version.
    pub fn verification_link(&self, document_id: &DocumentId, version: u32) -> Option<String> {
        self.config.verification_link(document_id, version)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ingest Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a document that has never been ingested.
    ///
    /// Stores it as version 1, `Active`. Fails with `DocumentExists` if the
    /// identifier already has versions; use [`Verifier::update`] instead.
    pub async fn ingest(&self, record: Record) -> Result<IngestReceipt> {
        let document_id = record.document_id()?;

        if self.ledger.head_version(&document_id).await?.is_some() {
            return Err(KernelError::DocumentExists(document_id));
        }

        let entry = self.prepare(document_id.clone(), record)?;
        match self.ledger.commit(entry, None).await? {
            CommitResult::Committed { version, .. } => {
                tracing::info!(
                    document_id = %version.document_id,
                    version = version.version,
                    fingerprint = %short_hex(&version.fingerprint_hex),
                    "ingested record"
                );
                Ok(self.receipt(&version))
            }
            CommitResult::Conflict { current_head } => {
                tracing::debug!(%document_id, ?current_head, "lost first-ingest race");
                Err(KernelError::DocumentExists(document_id))
            }
        }
    }

    /// Register a document from loosely-typed extraction output.
    pub async fn ingest_value(&self, value: &Value) -> Result<IngestReceipt> {
        let record = Record::from_value(value)?;
        self.ingest(record).await
    }

    /// Supersede the current version of a document.
    ///
    /// Every active version is deactivated and the record is stored at
    /// `max(existing) + 1`, in one ledger commit. A commit that loses to a
    /// concurrent update is retried up to `max_commit_attempts` times.
    pub async fn update(&self, document_id: &DocumentId, record: Record) -> Result<IngestReceipt> {
        let found = record.document_id()?;
        if &found != document_id {
            return Err(KernelError::IdentifierMismatch {
                expected: document_id.to_string(),
                found: found.to_string(),
            });
        }

        // The version number is not part of the signed data, so one
        // signature serves every attempt.
        let signed = self.config.signer.sign_record(&record)?;
        let attempts = self.config.max_commit_attempts.max(1);

        for attempt in 1..=attempts {
            let Some(head) = self.ledger.head_version(document_id).await? else {
                return Err(KernelError::NotFound(document_id.clone()));
            };

            let entry = NewVersion::active(
                document_id.clone(),
                record.clone(),
                signed.clone(),
                self.config.signer.name(),
                now_millis(),
            );

            match self.ledger.commit(entry, Some(head)).await? {
                CommitResult::Committed {
                    version,
                    deactivated,
                } => {
                    if deactivated.len() > 1 {
                        tracing::warn!(
                            %document_id,
                            ?deactivated,
                            "multiple active versions found during update; all deactivated"
                        );
                    }
                    tracing::info!(
                        %document_id,
                        version = version.version,
                        fingerprint = %short_hex(&version.fingerprint_hex),
                        superseded = ?deactivated,
                        "updated record"
                    );
                    return Ok(self.receipt(&version));
                }
                CommitResult::Conflict { current_head } => {
                    tracing::debug!(
                        %document_id,
                        expected = head,
                        ?current_head,
                        attempt,
                        "update lost compare-and-set, retrying"
                    );
                    tokio::task::yield_now().await;
                }
            }
        }

        Err(KernelError::ConcurrentUpdate {
            document_id: document_id.clone(),
            attempts,
        })
    }

    fn prepare(&self, document_id: DocumentId, record: Record) -> Result<NewVersion> {
        let signed = self.config.signer.sign_record(&record)?;
        Ok(NewVersion::active(
            document_id,
            record,
            signed,
            self.config.signer.name(),
            now_millis(),
        ))
    }

    fn receipt(&self, version: &RecordVersion) -> IngestReceipt {
        IngestReceipt {
            document_id: version.document_id.clone(),
            version: version.version,
            fingerprint_hex: version.fingerprint_hex.clone(),
            verify_url: self.verification_link(&version.document_id, version.version),
            created_at: version.created_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify a presented record against every stored version of its
    /// identifier.
    ///
    /// Only structural problems with the record are errors; every
    /// verification result, including `Tampered`, is an `Ok` report.
    pub async fn verify_record(&self, record: &Record) -> Result<VerificationReport> {
        let document_id = record.document_id()?;
        let versions = self.ledger.list_versions(&document_id).await?;
        let verified_at = now_millis();

        if versions.is_empty() {
            return Ok(log_report(VerificationReport::not_found(
                document_id,
                None,
                verified_at,
            )));
        }

        let fp = fingerprint(record);
        let Some(stored) = select_by_fingerprint(versions, &fp) else {
            return Ok(log_report(VerificationReport::tampered(
                document_id,
                None,
                verified_at,
            )));
        };

        let signature_ok = signature_holds(&stored, &fp);
        Ok(log_report(VerificationReport::matched(
            stored,
            signature_ok,
            verified_at,
        )))
    }

    /// Verify one stored version by address (the QR-code path).
    ///
    /// The fingerprint is re-derived from the stored record and the whole
    /// chain re-run; stored fingerprint and signature are never trusted as-is.
    pub async fn verify_version(
        &self,
        document_id: &DocumentId,
        version: u32,
    ) -> Result<VerificationReport> {
        let found = self.ledger.get(document_id, version).await?;
        let verified_at = now_millis();

        let Some(stored) = found else {
            return Ok(log_report(VerificationReport::not_found(
                document_id.clone(),
                Some(version),
                verified_at,
            )));
        };

        let recomputed = fingerprint(&stored.record);
        if stored.stored_fingerprint() != Some(recomputed) {
            return Ok(log_report(VerificationReport::tampered(
                document_id.clone(),
                Some(version),
                verified_at,
            )));
        }

        let signature_ok = signature_holds(&stored, &recomputed);
        Ok(log_report(VerificationReport::matched(
            stored,
            signature_ok,
            verified_at,
        )))
    }

    /// Verify a loosely-typed record.
    pub async fn verify_value(&self, value: &Value) -> Result<VerificationReport> {
        let record = Record::from_value(value)?;
        self.verify_record(&record).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// All versions of a document, ascending. Empty if unknown.
    pub async fn history(&self, document_id: &DocumentId) -> Result<Vec<RecordVersion>> {
        Ok(self.ledger.list_versions(document_id).await?)
    }

    /// Every registered document identifier.
    pub async fn documents(&self) -> Result<Vec<DocumentId>> {
        Ok(self.ledger.list_documents().await?)
    }

    /// Every stored version of every document.
    pub async fn all_versions(&self) -> Result<Vec<RecordVersion>> {
        Ok(self.ledger.all_versions().await?)
    }
}

impl Verifier<SqliteLedger> {
    /// Open the SQLite ledger at the configured `db_path`.
    ///
    /// Fails with `InvalidConfig` if no path is configured.
    pub fn open(config: Config) -> Result<Self> {
        let Some(path) = config.db_path.clone() else {
            return Err(KernelError::InvalidConfig(
                "db_path is not configured".into(),
            ));
        };
        let ledger = SqliteLedger::open(&path)?;
        tracing::info!(path = %path.display(), "opened sqlite ledger");
        Ok(Self::new(config, ledger))
    }
}

/// Check the stored signature over `fp` with the stored public key.
fn signature_holds(stored: &RecordVersion, fp: &Fingerprint) -> bool {
    stored.algorithm == ALGORITHM && stored.public_key.verify(fp, &stored.signature)
}

fn log_report(report: VerificationReport) -> VerificationReport {
    tracing::info!(
        document_id = %report.document_id,
        version = ?report.version,
        outcome = ?report.outcome,
        "verified record"
    );
    report
}

fn short_hex(hex: &str) -> &str {
    hex.get(..16).unwrap_or(hex)
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
