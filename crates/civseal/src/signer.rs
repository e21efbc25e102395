//! The process signing identity.

use std::fmt;

use civseal_core::{fingerprint, Keypair, PublicKey, Record, SignedFingerprint};

use crate::error::Result;

/// Process-wide signing key plus the identity recorded next to each
/// signature. Never mutated after startup.
pub struct Signer {
    keypair: Keypair,
    name: String,
}

impl Signer {
    pub fn new(keypair: Keypair, name: impl Into<String>) -> Self {
        Self {
            keypair,
            name: name.into(),
        }
    }

    /// Same key, different recorded identity.
    pub fn renamed(self, name: impl Into<String>) -> Self {
        Self {
            keypair: self.keypair,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_key(&self) -> &PublicKey {
        self.keypair.public_key()
    }

    /// Canonicalize, digest, and sign a record.
    pub fn sign_record(&self, record: &Record) -> Result<SignedFingerprint> {
        let fp = fingerprint(record);
        Ok(self.keypair.sign(&fp)?)
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("name", &self.name)
            .field("keypair", &self.keypair)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_record_verifies() {
        let signer = Signer::new(Keypair::from_seed(&[4; 32]).unwrap(), "Registrar");
        let record = Record {
            family_number: "3201".into(),
            ..Default::default()
        };

        let signed = signer.sign_record(&record).unwrap();
        assert_eq!(signed.fingerprint, fingerprint(&record));
        assert_eq!(&signed.public_key, signer.public_key());
        assert!(signed.verify());
    }

    #[test]
    fn test_renamed_keeps_key() {
        let signer = Signer::new(Keypair::from_seed(&[4; 32]).unwrap(), "a");
        let before = signer.public_key().clone();
        let signer = signer.renamed("b");
        assert_eq!(signer.name(), "b");
        assert_eq!(signer.public_key(), &before);
    }
}
