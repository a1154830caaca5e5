use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Maximum length of a verifier display name, in bytes.
pub const DISPLAY_NAME_LEN: usize = 32;

/// An opaque, externally-authenticated actor identity.
///
/// Principals name administrators, verifiers, subjects, ledgers and token
/// contracts alike. Signing keys are principals too (`ed25519:<hex>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Create a principal from any identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Principal {
    type Err = CoreError;

    /// Parse untrusted input: rejects empty identifiers and whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CoreError::InvalidPrincipal("principal must not be empty".into()));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidPrincipal(format!(
                "principal must not contain whitespace: {:?}",
                s
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed-length verifier display name: at most 32 bytes of UTF-8, zero padded.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName([u8; DISPLAY_NAME_LEN]);

impl DisplayName {
    /// Create a display name, failing if it exceeds 32 bytes or contains NUL.
    pub fn new(name: &str) -> Result<Self, CoreError> {
        let bytes = name.as_bytes();
        if bytes.len() > DISPLAY_NAME_LEN {
            return Err(CoreError::InvalidDisplayName(format!(
                "name is {} bytes, maximum is {}",
                bytes.len(),
                DISPLAY_NAME_LEN
            )));
        }
        if bytes.contains(&0) {
            return Err(CoreError::InvalidDisplayName(
                "name must not contain NUL bytes".into(),
            ));
        }
        let mut buf = [0u8; DISPLAY_NAME_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// The raw zero-padded bytes.
    pub fn as_bytes(&self) -> &[u8; DISPLAY_NAME_LEN] {
        &self.0
    }

    /// The name without its zero padding.
    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(DISPLAY_NAME_LEN);
        // Only ever constructed from a &str, so the prefix is valid UTF-8.
        std::str::from_utf8(&self.0[..end]).unwrap_or_default()
    }
}

impl TryFrom<String> for DisplayName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Debug for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayName({:?})", self.as_str())
    }
}

/// Identifier for a credential schema. Treated as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(String);

impl SchemaId {
    /// Create a new schema identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the schema ID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ledger-assigned verification identifier. Dense, starts at 1, never reused.
pub type VerificationId = u64;

/// A trusted verifier as registered in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierInfo {
    /// Human-readable name (fixed 32 bytes).
    pub name: DisplayName,
    /// Decentralized identifier of the verifier.
    pub did: String,
    /// Informational URL.
    pub url: String,
    /// Key principal used to recover signatures. May differ from the
    /// verifier's own principal.
    pub signer: Principal,
}

/// The structured claim a verifier signs off-system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Credential schema the subject was checked against.
    pub schema: SchemaId,
    /// Principal being attested about.
    pub subject: Principal,
    /// Instant after which the claim no longer counts.
    pub expires_at: DateTime<Utc>,
}

/// A verification record stored in a credential ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub uuid: VerificationId,
    pub schema: SchemaId,
    pub subject: Principal,
    /// Principal of the verifier whose signing key produced the signature.
    pub verifier: Principal,
    pub expires_at: DateTime<Utc>,
}

impl Verification {
    /// Whether this record is still in force at `now`. Expiry is exclusive.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
