//! Process configuration.
//!
//! Built once at startup and passed by reference. Key material is loaded
//! eagerly so that a missing or mismatched key fails the process before it
//! serves any request.

use std::path::PathBuf;

use civseal_core::{DocumentId, Keypair};
use url::Url;

use crate::error::{KernelError, Result};
use crate::signer::Signer;

/// Environment variable holding the base64 ML-DSA-65 secret key.
pub const ENV_PRIVATE_KEY: &str = "ML_DSA_PRIVATE_KEY_BASE64";
/// Environment variable holding the base64 ML-DSA-65 public key.
pub const ENV_PUBLIC_KEY: &str = "ML_DSA_PUBLIC_KEY_BASE64";
pub const ENV_SIGNER_NAME: &str = "CIVSEAL_SIGNER_NAME";
pub const ENV_VERIFY_BASE_URL: &str = "CIVSEAL_VERIFY_BASE_URL";
pub const ENV_DB_PATH: &str = "CIVSEAL_DB_PATH";
pub const ENV_MAX_COMMIT_ATTEMPTS: &str = "CIVSEAL_MAX_COMMIT_ATTEMPTS";

/// Signer identity recorded when none is configured.
pub const DEFAULT_SIGNER_NAME: &str = "Dinas Kependudukan dan Pencatatan Sipil";
pub const DEFAULT_MAX_COMMIT_ATTEMPTS: u32 = 8;

/// Verifier configuration.
///
/// `Debug` never prints the secret key.
#[derive(Debug)]
pub struct Config {
    /// The process-wide signing key and the identity stored on every version.
    pub signer: Signer,
    /// Base of the verification links handed out on ingest.
    pub verify_base_url: Option<Url>,
    /// SQLite ledger location, if the deployment uses one.
    pub db_path: Option<PathBuf>,
    /// Compare-and-set attempts per update before giving up.
    pub max_commit_attempts: u32,
}

impl Config {
    /// Configuration with defaults around an already-loaded keypair.
    pub fn new(keypair: Keypair) -> Self {
        Self {
            signer: Signer::new(keypair, DEFAULT_SIGNER_NAME),
            verify_base_url: None,
            db_path: None,
            max_commit_attempts: DEFAULT_MAX_COMMIT_ATTEMPTS,
        }
    }

    pub fn with_signer_name(mut self, name: impl Into<String>) -> Self {
        self.signer = self.signer.renamed(name);
        self
    }

    pub fn with_verify_base_url(mut self, base: &str) -> Result<Self> {
        self.verify_base_url = Some(parse_base_url(base)?);
        Ok(self)
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    pub fn with_max_commit_attempts(mut self, attempts: u32) -> Result<Self> {
        if attempts == 0 {
            return Err(KernelError::InvalidConfig(
                "max_commit_attempts must be at least 1".into(),
            ));
        }
        self.max_commit_attempts = attempts;
        Ok(self)
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ML_DSA_PRIVATE_KEY_BASE64` (required)
    /// - `ML_DSA_PUBLIC_KEY_BASE64` (required, must match the private key)
    /// - `CIVSEAL_SIGNER_NAME` (default: `Dinas Kependudukan dan Pencatatan Sipil`)
    /// - `CIVSEAL_VERIFY_BASE_URL` (optional)
    /// - `CIVSEAL_DB_PATH` (optional)
    /// - `CIVSEAL_MAX_COMMIT_ATTEMPTS` (default: 8)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let secret = present(ENV_PRIVATE_KEY)
            .ok_or_else(|| KernelError::KeyNotConfigured(format!("{} is not set", ENV_PRIVATE_KEY)))?;
        let public = present(ENV_PUBLIC_KEY)
            .ok_or_else(|| KernelError::KeyNotConfigured(format!("{} is not set", ENV_PUBLIC_KEY)))?;
        let keypair = Keypair::from_base64(&secret, &public)
            .map_err(|e| KernelError::KeyNotConfigured(e.to_string()))?;

        let mut config = Self::new(keypair);

        if let Some(name) = present(ENV_SIGNER_NAME) {
            config = config.with_signer_name(name.trim());
        }
        if let Some(base) = present(ENV_VERIFY_BASE_URL) {
            config = config.with_verify_base_url(base.trim())?;
        }
        if let Some(path) = present(ENV_DB_PATH) {
            config = config.with_db_path(path.trim());
        }
        if let Some(raw) = present(ENV_MAX_COMMIT_ATTEMPTS) {
            let attempts: u32 = raw.trim().parse().map_err(|_| {
                KernelError::InvalidConfig(format!(
                    "{} must be a positive integer, got {:?}",
                    ENV_MAX_COMMIT_ATTEMPTS, raw
                ))
            })?;
            config = config.with_max_commit_attempts(attempts)?;
        }

        Ok(config)
    }

    /// Link that opens the stored-record verification of one version.
    ///
    /// `None` when no base URL is configured.
    pub fn verification_link(&self, document_id: &DocumentId, version: u32) -> Option<String> {
        let mut url = self.verify_base_url.clone()?;
        url.query_pairs_mut()
            .clear()
            .append_pair("doc_id", document_id.as_str())
            .append_pair("v", &version.to_string());
        Some(url.into())
    }
}

/// Parse a base URL, forcing a trailing slash so links land on `/?doc_id=`.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| KernelError::InvalidConfig(format!("verify base URL {:?}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(KernelError::InvalidConfig(format!(
            "verify base URL {:?} cannot be a base",
            raw
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
