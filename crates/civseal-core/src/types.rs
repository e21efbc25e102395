//! Strong type definitions for civseal.
//!
//! Identifiers are newtypes to prevent mixing them up with arbitrary strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// The identifier of a registration document (the family card number).
///
/// Surrounding whitespace is stripped on construction. An empty identifier
/// is never valid.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Create a document identifier.
    pub fn new(id: impl AsRef<str>) -> Result<Self, CoreError> {
        let trimmed = id.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CoreError::MissingIdentifier);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DocumentId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

impl FromStr for DocumentId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Lifecycle status of a stored record version.
///
/// The only permitted transition is `Active -> Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Active,
    Inactive,
}

impl VersionStatus {
    /// Stable text form used by storage backends.
    pub const fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Active => "active",
            VersionStatus::Inactive => "inactive",
        }
    }

    pub const fn is_active(&self) -> bool {
        matches!(self, VersionStatus::Active)
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(VersionStatus::Active),
            "inactive" => Ok(VersionStatus::Inactive),
            other => Err(CoreError::DecodingError(format!(
                "unknown version status: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_trims() {
        let id = DocumentId::new("  3201010101010001 ").unwrap();
        assert_eq!(id.as_str(), "3201010101010001");
        assert_eq!(format!("{}", id), "3201010101010001");
    }

    #[test]
    fn test_document_id_rejects_blank() {
        assert!(matches!(
            DocumentId::new("   "),
            Err(CoreError::MissingIdentifier)
        ));
        assert!(serde_json::from_str::<DocumentId>("\"\"").is_err());
    }

    #[test]
    fn test_version_status_text_roundtrip() {
        for status in [VersionStatus::Active, VersionStatus::Inactive] {
            let parsed: VersionStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("Aktif".parse::<VersionStatus>().is_err());
    }
}
