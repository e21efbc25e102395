//! Cryptographic primitives for civseal.
//!
//! Wraps BLAKE3 hashing and ML-DSA-65 (FIPS 204) signing with strong types.
//!
//! # Security Notes
//!
//! - Secret key bytes are zeroized on drop and never printed by `Debug`.
//! - [`PublicKey::verify`] never returns an error: malformed keys, malformed
//!   signatures, and failed verification are all `false`.
//! - Signatures use the empty context string.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use fips204::ml_dsa_65;
use fips204::traits::{SerDes, Signer, Verifier};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CoreError;

/// Algorithm identifier recorded next to every signature.
pub const ALGORITHM: &str = "ML-DSA-65";

/// ML-DSA-65 public key size in bytes.
pub const PUBLIC_KEY_SIZE: usize = 1952;

/// ML-DSA-65 secret key size in bytes.
pub const SECRET_KEY_SIZE: usize = 4032;

/// ML-DSA-65 signature size in bytes.
pub const SIGNATURE_SIZE: usize = 3309;

/// A 32-byte BLAKE3 digest of a record's canonical bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Compute the BLAKE3 hash of the given data.
    pub fn digest(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blake3({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Fingerprint {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// An ML-DSA-65 public key as stored alongside a signature.
///
/// The bytes are not validated on construction: keys read back from a
/// ledger may be corrupt, and that must surface as a failed verification.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Encode as standard base64.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }

    /// Decode from standard base64.
    pub fn from_base64(s: &str) -> Result<Self, CoreError> {
        BASE64
            .decode(s.trim())
            .map(Self)
            .map_err(|e| CoreError::DecodingError(format!("public key: {}", e)))
    }

    /// Verify `signature` over `fingerprint`.
    ///
    /// Returns `true` only if the signature was produced by the holder of
    /// the matching secret key over exactly these fingerprint bytes.
    pub fn verify(&self, fingerprint: &Fingerprint, signature: &Signature) -> bool {
        let Ok(pk_array) = <[u8; PUBLIC_KEY_SIZE]>::try_from(self.0.as_slice()) else {
            return false;
        };
        let Ok(sig_array) = <[u8; SIGNATURE_SIZE]>::try_from(signature.0.as_slice()) else {
            return false;
        };
        let Ok(public_key) = ml_dsa_65::PublicKey::try_from_bytes(pk_array) else {
            return false;
        };

        public_key.verify(fingerprint.as_bytes(), &sig_array, &[])
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = hex::encode(&self.0).chars().take(16).collect();
        write!(f, "MlDsaPub({}, {} bytes)", prefix, self.0.len())
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// An opaque ML-DSA-65 signature.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Wrap raw signature bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Encode as standard base64.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }

    /// Decode from standard base64.
    pub fn from_base64(s: &str) -> Result<Self, CoreError> {
        BASE64
            .decode(s.trim())
            .map(Self)
            .map_err(|e| CoreError::DecodingError(format!("signature: {}", e)))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = hex::encode(&self.0).chars().take(16).collect();
        write!(f, "MlDsaSig({}...)", prefix)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A signature bundled with everything needed to check it later.
///
/// None of the parts may be swapped independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedFingerprint {
    pub fingerprint: Fingerprint,
    pub signature: Signature,
    pub public_key: PublicKey,
    pub algorithm: String,
}

impl SignedFingerprint {
    /// Re-check the bundle.
    pub fn verify(&self) -> bool {
        self.algorithm == ALGORITHM && self.public_key.verify(&self.fingerprint, &self.signature)
    }
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct SecretKeyBytes(Vec<u8>);

/// An ML-DSA-65 keypair.
///
/// Secret key material is zeroized when the keypair is dropped.
pub struct Keypair {
    secret: SecretKeyBytes,
    public: PublicKey,
}

impl Keypair {
    /// Generate a new random keypair from the OS CSPRNG.
    pub fn generate() -> Result<Self, CoreError> {
        let (pk, sk) =
            ml_dsa_65::try_keygen().map_err(|e| CoreError::KeyGeneration(e.to_string()))?;
        Ok(Self::from_parts(pk, sk))
    }

    /// Derive a keypair deterministically from a 32-byte seed.
    ///
    /// Intended for tests and fixtures.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, CoreError> {
        let mut rng = StdRng::from_seed(*seed);
        let (pk, sk) = ml_dsa_65::try_keygen_with_rng(&mut rng)
            .map_err(|e| CoreError::KeyGeneration(e.to_string()))?;
        Ok(Self::from_parts(pk, sk))
    }

    /// Load a keypair from raw bytes.
    ///
    /// Fails unless both parts have the right size, the secret key parses,
    /// and the public key is the one the secret key derives.
    pub fn from_bytes(secret: Vec<u8>, public: Vec<u8>) -> Result<Self, CoreError> {
        let secret = SecretKeyBytes(secret);
        let derived = derive_public_key(&secret.0)?;

        if public.len() != PUBLIC_KEY_SIZE {
            return Err(CoreError::InvalidKey(format!(
                "public key must be {} bytes, got {}",
                PUBLIC_KEY_SIZE,
                public.len()
            )));
        }
        if derived != public {
            return Err(CoreError::InvalidKey(
                "public key does not match secret key".into(),
            ));
        }

        Ok(Self {
            secret,
            public: PublicKey(public),
        })
    }

    /// Load a keypair from standard base64 text.
    pub fn from_base64(secret_b64: &str, public_b64: &str) -> Result<Self, CoreError> {
        let secret = BASE64
            .decode(secret_b64.trim())
            .map_err(|e| CoreError::InvalidKey(format!("secret key: {}", e)))?;
        let public = BASE64
            .decode(public_b64.trim())
            .map_err(|e| CoreError::InvalidKey(format!("public key: {}", e)))?;
        Self::from_bytes(secret, public)
    }

    fn from_parts(pk: ml_dsa_65::PublicKey, sk: ml_dsa_65::PrivateKey) -> Self {
        Self {
            secret: SecretKeyBytes(sk.into_bytes().to_vec()),
            public: PublicKey(pk.into_bytes().to_vec()),
        }
    }

    /// Get the public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Sign a fingerprint.
    pub fn sign(&self, fingerprint: &Fingerprint) -> Result<SignedFingerprint, CoreError> {
        let sk_array = <[u8; SECRET_KEY_SIZE]>::try_from(self.secret.0.as_slice())
            .map_err(|_| CoreError::InvalidKey("secret key has wrong size".into()))?;
        let secret_key = ml_dsa_65::PrivateKey::try_from_bytes(sk_array)
            .map_err(|e| CoreError::InvalidKey(e.to_string()))?;

        let signature = secret_key
            .try_sign(fingerprint.as_bytes(), &[])
            .map_err(|e| CoreError::SigningFailed(e.to_string()))?;

        Ok(SignedFingerprint {
            fingerprint: *fingerprint,
            signature: Signature(signature.to_vec()),
            public_key: self.public.clone(),
            algorithm: ALGORITHM.to_string(),
        })
    }

    /// Export the secret key as base64, for provisioning tools.
    ///
    /// The caller owns the returned secret and is responsible for it.
    pub fn secret_key_base64(&self) -> String {
        BASE64.encode(&self.secret.0)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public", &self.public)
            .field("secret", &format!("<redacted:{}>", self.secret.0.len()))
            .finish()
    }
}

fn derive_public_key(sk: &[u8]) -> Result<Vec<u8>, CoreError> {
    let sk_array = <[u8; SECRET_KEY_SIZE]>::try_from(sk).map_err(|_| {
        CoreError::InvalidKey(format!(
            "secret key must be {} bytes, got {}",
            SECRET_KEY_SIZE,
            sk.len()
        ))
    })?;
    let secret_key = ml_dsa_65::PrivateKey::try_from_bytes(sk_array)
        .map_err(|e| CoreError::InvalidKey(e.to_string()))?;
    Ok(secret_key.get_public_key().into_bytes().to_vec())
}
