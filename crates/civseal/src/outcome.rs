//! Verification outcomes.
//!
//! Every verification ends in exactly one [`Outcome`]. The report carries the
//! same field set for all five, with unevaluated checks marked explicitly.

use std::fmt;

use civseal_core::{DocumentId, Record, RecordVersion};
use serde::{Deserialize, Serialize};

/// Terminal state of the verification chain, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No version exists for the identifier (or the addressed version).
    NotFound,
    /// The record's fingerprint matches no stored version.
    Tampered,
    /// A fingerprint matched but its signature does not verify.
    SignatureInvalid,
    /// Fingerprint and signature are good, but the version was superseded.
    Inactive,
    /// Fingerprint matched, signature verified, version is active.
    Valid,
}

impl Outcome {
    /// Human-readable status label shown to citizens and clerks.
    pub const fn label(&self) -> &'static str {
        match self {
            Outcome::NotFound => "Data KK Tidak Ada Di Sistem",
            Outcome::Tampered => "Data Telah Dimodifikasi",
            Outcome::SignatureInvalid => "Signature Tidak Valid",
            Outcome::Inactive => "Dokumen Tidak Aktif",
            Outcome::Valid => "Aktif",
        }
    }

    pub const fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one check in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    Passed,
    Failed,
    NotEvaluated,
}

impl Check {
    /// Display form of the data-integrity check.
    pub const fn integrity_label(&self) -> &'static str {
        match self {
            Check::Passed => "TERJAGA",
            Check::Failed => "TIDAK TERJAGA",
            Check::NotEvaluated => "-",
        }
    }

    /// Display form of the signature check.
    pub const fn signature_label(&self) -> &'static str {
        match self {
            Check::Passed => "VALID",
            Check::Failed => "TIDAK VALID",
            Check::NotEvaluated => "-",
        }
    }
}

/// Uniform result of a verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub outcome: Outcome,
    pub valid: bool,
    pub status_label: String,
    pub integrity: Check,
    pub signature: Check,
    /// Signer of the matched version. `None` before a version is matched.
    pub signer_name: Option<String>,
    pub document_id: DocumentId,
    /// Matched or addressed version.
    pub version: Option<u32>,
    /// The stored record. Only present when the outcome is `Valid`.
    pub payload: Option<Record>,
    pub created_at: Option<i64>,
    pub deactivated_at: Option<i64>,
    /// When the verification ran (Unix ms).
    pub verified_at: i64,
}

impl VerificationReport {
    fn bare(
        outcome: Outcome,
        document_id: DocumentId,
        version: Option<u32>,
        verified_at: i64,
    ) -> Self {
        Self {
            outcome,
            valid: outcome.is_valid(),
            status_label: outcome.label().to_string(),
            integrity: Check::NotEvaluated,
            signature: Check::NotEvaluated,
            signer_name: None,
            document_id,
            version,
            payload: None,
            created_at: None,
            deactivated_at: None,
            verified_at,
        }
    }

    pub(crate) fn not_found(document_id: DocumentId, version: Option<u32>, verified_at: i64) -> Self {
        Self::bare(Outcome::NotFound, document_id, version, verified_at)
    }

    pub(crate) fn tampered(document_id: DocumentId, version: Option<u32>, verified_at: i64) -> Self {
        Self {
            integrity: Check::Failed,
            signature: Check::Failed,
            ..Self::bare(Outcome::Tampered, document_id, version, verified_at)
        }
    }

    /// Report for a version whose fingerprint matched.
    ///
    /// The outcome follows from the signature result and the status.
    pub(crate) fn matched(stored: RecordVersion, signature_ok: bool, verified_at: i64) -> Self {
        let outcome = if !signature_ok {
            Outcome::SignatureInvalid
        } else if !stored.is_active() {
            Outcome::Inactive
        } else {
            Outcome::Valid
        };

        let mut report = Self::bare(
            outcome,
            stored.document_id.clone(),
            Some(stored.version),
            verified_at,
        );
        report.integrity = Check::Passed;
        report.signature = if signature_ok {
            Check::Passed
        } else {
            Check::Failed
        };
        report.signer_name = Some(stored.signer_name);
        report.created_at = Some(stored.created_at);
        report.deactivated_at = stored.deactivated_at;
        if outcome.is_valid() {
            report.payload = Some(stored.record);
        }
        report
    }
}
