//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use civseal_core::{
    fingerprint, CoreError, Keypair, Member, NewVersion, Record, SignedFingerprint,
};
use civseal_store::MemoryLedger;

/// Seed of the default fixture keypair.
pub const DEFAULT_SEED: [u8; 32] = [0x42; 32];

/// Fixed creation time used by fixture entries (2026-01-14T16:00:00Z).
pub const FIXED_TIME: i64 = 1_768_406_400_000;

/// Identifier of [`sample_record`].
pub const SAMPLE_DOCUMENT_ID: &str = "3201010101010001";

/// A test fixture with a keypair and memory ledger.
pub struct TestFixture {
    pub keypair: Keypair,
    pub ledger: MemoryLedger,
}

impl TestFixture {
    /// Create a fixture with the default deterministic keypair.
    pub fn new() -> Result<Self, CoreError> {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Result<Self, CoreError> {
        Ok(Self {
            keypair: Keypair::from_seed(&seed)?,
            ledger: MemoryLedger::new(),
        })
    }

    /// Sign a record with the fixture key.
    pub fn sign(&self, record: &Record) -> Result<SignedFingerprint, CoreError> {
        self.keypair.sign(&fingerprint(record))
    }

    /// An `Active` ledger entry for a record, signed by the fixture key.
    pub fn make_entry(&self, record: Record, created_at: i64) -> Result<NewVersion, CoreError> {
        let signed = self.sign(&record)?;
        Ok(NewVersion::active(
            record.document_id()?,
            record,
            signed,
            "Test Registrar",
            created_at,
        ))
    }

    /// An entry that carries the fixture's public key but a signature made
    /// by `forger`: the fingerprint is right, the signature is not.
    pub fn forged_entry(&self, record: Record, forger: &Keypair) -> Result<NewVersion, CoreError> {
        let mut entry = self.make_entry(record, FIXED_TIME)?;
        let forged = forger.sign(&fingerprint(&entry.record))?;
        entry.signature = forged.signature;
        Ok(entry)
    }
}

/// A realistic two-member household, as extraction would deliver it.
pub fn sample_record() -> Record {
    Record {
        family_number: SAMPLE_DOCUMENT_ID.into(),
        head_of_family: "BUDI SANTOSO".into(),
        address: "JL. MERDEKA NO. 1".into(),
        rt_rw: "001/002".into(),
        postal_code: "16110".into(),
        village: "SUKAMAJU".into(),
        district: "CIBINONG".into(),
        regency: "KABUPATEN BOGOR".into(),
        province: "JAWA BARAT".into(),
        issued_on: "14-01-2026".into(),
        members: vec![
            sample_member("BUDI SANTOSO", "3201010101800001", "KEPALA KELUARGA"),
            sample_member("SITI AMINAH", "3201014101850002", "ISTRI"),
        ],
    }
}

/// A member with the given name, NIK, and relationship; other fields filled.
pub fn sample_member(name: &str, nik: &str, relationship: &str) -> Member {
    Member {
        name: name.into(),
        nik: nik.into(),
        sex: "LAKI-LAKI".into(),
        birth_place: "BOGOR".into(),
        birth_date: "01-01-1980".into(),
        religion: "ISLAM".into(),
        education: "SLTA/SEDERAJAT".into(),
        occupation: "KARYAWAN SWASTA".into(),
        blood_type: "O".into(),
        marital_status: "KAWIN".into(),
        marriage_date: "12-06-2008".into(),
        relationship: relationship.into(),
        citizenship: "WNI".into(),
        father: "SANTOSO".into(),
        mother: "SRI".into(),
    }
}

/// A record for `document_id` that differs from others only in its address.
pub fn record_with_address(document_id: &str, address: &str) -> Record {
    Record {
        family_number: document_id.into(),
        address: address.into(),
        ..sample_record()
    }
}

/// The sample record with one member's name changed.
pub fn tampered_sample() -> Record {
    let mut record = sample_record();
    record.members[1].name = "SITI AMINA".into();
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use civseal_store::Ledger;

    #[test]
    fn test_fixture_keys_are_deterministic() {
        let a = TestFixture::new().unwrap();
        let b = TestFixture::new().unwrap();
        assert_eq!(a.keypair.public_key(), b.keypair.public_key());
    }

    #[test]
    fn test_tampered_sample_changes_fingerprint() {
        assert_ne!(fingerprint(&sample_record()), fingerprint(&tampered_sample()));
    }

    #[test]
    fn test_forged_entry_fails_verification() {
        let fixture = TestFixture::new().unwrap();
        let forger = Keypair::from_seed(&[0x13; 32]).unwrap();
        let entry = fixture.forged_entry(sample_record(), &forger).unwrap();

        let fp = fingerprint(&entry.record);
        assert_eq!(entry.fingerprint_hex, fp.to_hex());
        assert_eq!(&entry.public_key, fixture.keypair.public_key());
        assert!(!entry.public_key.verify(&fp, &entry.signature));
    }

    #[tokio::test]
    async fn test_make_entry_stores() {
        let fixture = TestFixture::new().unwrap();
        let entry = fixture.make_entry(sample_record(), FIXED_TIME).unwrap();
        let stored = fixture.ledger.put(entry).await.unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.document_id.as_str(), SAMPLE_DOCUMENT_ID);
    }
}
