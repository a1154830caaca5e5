use ed25519_dalek::Signer;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::hashing::Hash;
use crate::keys::{KeyPair, PublicKey};

/// Length of an encoded [`RecoverableSignature`]: public key ‖ signature.
pub const RECOVERABLE_SIGNATURE_LEN: usize = 32 + 64;

/// Ed25519 signature (64 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    inner: ed25519_dalek::Signature,
}

impl Signature {
    /// Get the raw bytes (64 bytes).
    pub fn to_bytes(&self) -> [u8; 64] {
        self.inner.to_bytes()
    }

    /// Create from raw bytes (64 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes_arr: [u8; 64] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidInput(format!("signature must be 64 bytes, got {}", bytes.len()))
        })?;
        Ok(Self {
            inner: ed25519_dalek::Signature::from_bytes(&bytes_arr),
        })
    }
}

/// A signature from which the signer can be recovered.
///
/// Ed25519 has no key recovery, so the signer's public key travels with the
/// signature. Recovery succeeds only if the signature verifies under that key
/// for the exact digest, which yields the signer unambiguously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecoverableSignature {
    signer: PublicKey,
    signature: Signature,
}

impl RecoverableSignature {
    /// Assemble from a claimed signer and a raw signature.
    pub fn new(signer: PublicKey, signature: Signature) -> Self {
        Self { signer, signature }
    }

    /// The key the signature claims to come from. Not authenticated until
    /// [`recover`] succeeds.
    pub fn claimed_signer(&self) -> &PublicKey {
        &self.signer
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Encode as 96 bytes: public key ‖ signature.
    pub fn to_bytes(&self) -> [u8; RECOVERABLE_SIGNATURE_LEN] {
        let mut out = [0u8; RECOVERABLE_SIGNATURE_LEN];
        out[..32].copy_from_slice(self.signer.as_bytes());
        out[32..].copy_from_slice(&self.signature.to_bytes());
        out
    }

    /// Decode from 96 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != RECOVERABLE_SIGNATURE_LEN {
            return Err(CryptoError::InvalidInput(format!(
                "recoverable signature must be {} bytes, got {}",
                RECOVERABLE_SIGNATURE_LEN,
                bytes.len()
            )));
        }
        Ok(Self {
            signer: PublicKey::from_bytes(&bytes[..32])?,
            signature: Signature::from_bytes(&bytes[32..])?,
        })
    }

    /// Encode as hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Decode from a hex string, with or without a `0x` prefix.
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let trimmed = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(trimmed)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }
}

impl TryFrom<String> for RecoverableSignature {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<RecoverableSignature> for String {
    fn from(value: RecoverableSignature) -> Self {
        value.to_hex()
    }
}

/// Sign a 32-byte digest.
pub fn sign_digest(digest: &Hash, keypair: &KeyPair) -> RecoverableSignature {
    let inner = keypair.signing_key().sign(digest);
    RecoverableSignature {
        signer: keypair.public_key(),
        signature: Signature { inner },
    }
}

/// Recover the signer of `digest`.
///
/// Uses strict verification, which rejects small-order keys and
/// non-canonical signature encodings.
pub fn recover(digest: &Hash, signature: &RecoverableSignature) -> Result<PublicKey, CryptoError> {
    signature
        .signer
        .verifying_key()
        .verify_strict(digest, &signature.signature.inner)
        .map_err(|_| CryptoError::SignatureVerificationFailed)?;
    Ok(signature.signer.clone())
}
