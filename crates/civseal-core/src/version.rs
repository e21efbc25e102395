//! Record versions: the unit of persistence.
//!
//! A [`RecordVersion`] is created once and never mutated except for the
//! `Active -> Inactive` transition. Version numbers start at 1 and grow by
//! one per document identifier.

use serde::{Deserialize, Serialize};

use crate::crypto::{Fingerprint, PublicKey, Signature, SignedFingerprint};
use crate::record::Record;
use crate::types::{DocumentId, VersionStatus};

/// Address of one version of one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRef {
    pub document_id: DocumentId,
    pub version: u32,
}

impl VersionRef {
    pub fn new(document_id: DocumentId, version: u32) -> Self {
        Self {
            document_id,
            version,
        }
    }
}

/// A signed record waiting for the ledger to assign its version number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVersion {
    pub document_id: DocumentId,
    pub record: Record,
    /// Lowercase hex of the record's fingerprint.
    pub fingerprint_hex: String,
    pub signature: Signature,
    pub public_key: PublicKey,
    pub algorithm: String,
    pub signer_name: String,
    pub status: VersionStatus,
    /// Creation time (Unix ms).
    pub created_at: i64,
}

impl NewVersion {
    /// Assemble a new `Active` version from a signed fingerprint.
    pub fn active(
        document_id: DocumentId,
        record: Record,
        signed: SignedFingerprint,
        signer_name: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            document_id,
            record,
            fingerprint_hex: signed.fingerprint.to_hex(),
            signature: signed.signature,
            public_key: signed.public_key,
            algorithm: signed.algorithm,
            signer_name: signer_name.into(),
            status: VersionStatus::Active,
            created_at,
        }
    }

    /// Attach the ledger-assigned version number.
    pub fn into_version(self, version: u32) -> RecordVersion {
        RecordVersion {
            document_id: self.document_id,
            version,
            record: self.record,
            fingerprint_hex: self.fingerprint_hex,
            signature: self.signature,
            public_key: self.public_key,
            algorithm: self.algorithm,
            signer_name: self.signer_name,
            status: self.status,
            created_at: self.created_at,
            deactivated_at: None,
        }
    }
}

/// One signed, timestamped snapshot of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordVersion {
    pub document_id: DocumentId,
    pub version: u32,
    pub record: Record,
    pub fingerprint_hex: String,
    pub signature: Signature,
    pub public_key: PublicKey,
    pub algorithm: String,
    pub signer_name: String,
    pub status: VersionStatus,
    /// Creation time (Unix ms).
    pub created_at: i64,
    /// Set when the version became inactive (Unix ms).
    pub deactivated_at: Option<i64>,
}

impl RecordVersion {
    pub fn version_ref(&self) -> VersionRef {
        VersionRef::new(self.document_id.clone(), self.version)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Parse the stored fingerprint. `None` if the stored text is not a
    /// 32-byte hex digest.
    pub fn stored_fingerprint(&self) -> Option<Fingerprint> {
        Fingerprint::from_hex(&self.fingerprint_hex).ok()
    }

    /// Apply the `Active -> Inactive` transition.
    ///
    /// Returns `false` (and changes nothing) if already inactive.
    pub fn deactivate(&mut self, at: i64) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = VersionStatus::Inactive;
        self.deactivated_at = Some(at);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::fingerprint;
    use crate::crypto::Keypair;

    fn make_version() -> RecordVersion {
        let keypair = Keypair::from_seed(&[1; 32]).unwrap();
        let record = Record {
            family_number: "3201".into(),
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
        .into_version(1)
    }

    #[test]
    fn test_new_version_carries_signature_bundle() {
        let v = make_version();
        assert_eq!(v.version, 1);
        assert!(v.is_active());
        assert_eq!(v.deactivated_at, None);
        assert_eq!(v.algorithm, "ML-DSA-65");
        let fp = v.stored_fingerprint().unwrap();
        assert!(v.public_key.verify(&fp, &v.signature));
    }

    #[test]
    fn test_deactivate_is_one_way() {
        let mut v = make_version();
        assert!(v.deactivate(10));
        assert_eq!(v.status, VersionStatus::Inactive);
        assert_eq!(v.deactivated_at, Some(10));

        assert!(!v.deactivate(20));
        assert_eq!(v.deactivated_at, Some(10));
    }

    #[test]
    fn test_stored_fingerprint_rejects_garbage() {
        let mut v = make_version();
        v.fingerprint_hex = "zz".into();
        assert!(v.stored_fingerprint().is_none());
    }
}
