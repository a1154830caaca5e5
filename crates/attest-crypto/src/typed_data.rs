//! Domain-bound structured digests for verification results.
//!
//! The digest of a [`VerificationResult`] is
//! `BLAKE3(0x19 0x01 ‖ domain_separator ‖ struct_hash)`. Strings and
//! principals are hashed before being absorbed, integers are fixed-width
//! big-endian, so every field boundary is unambiguous.

use attest_core::{DomainConfig, Principal, VerificationResult};
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::hashing::{hash, Hash};
use crate::keys::{KeyPair, PublicKey};
use crate::signing::{recover, sign_digest, RecoverableSignature};

const DOMAIN_TYPE: &str =
    "AttestDomain(string name,string version,uint64 networkId,principal verifyingRegistry)";

const VERIFICATION_RESULT_TYPE: &str =
    "VerificationResult(string schema,principal subject,int64 expiresAt,uint32 expiresAtNanos)";

const DIGEST_PREFIX: [u8; 2] = [0x19, 0x01];

/// The signing context a signature is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDataDomain {
    pub name: String,
    pub version: String,
    pub network_id: u64,
    /// Identity of the ledger that accepts these signatures.
    pub verifying_registry: Principal,
}

impl TypedDataDomain {
    /// Bind a domain configuration to a specific ledger.
    pub fn new(config: &DomainConfig, verifying_registry: Principal) -> Self {
        Self {
            name: config.name.clone(),
            version: config.version.clone(),
            network_id: config.network_id,
            verifying_registry,
        }
    }

    /// Hash committing to every field of the domain.
    pub fn separator(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&hash(DOMAIN_TYPE.as_bytes()));
        hasher.update(&hash(self.name.as_bytes()));
        hasher.update(&hash(self.version.as_bytes()));
        hasher.update(&self.network_id.to_be_bytes());
        hasher.update(&hash(self.verifying_registry.as_str().as_bytes()));
        *hasher.finalize().as_bytes()
    }
}

/// Hash of the claim fields alone, independent of any domain.
pub fn verification_struct_hash(result: &VerificationResult) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&hash(VERIFICATION_RESULT_TYPE.as_bytes()));
    hasher.update(&hash(result.schema.as_str().as_bytes()));
    hasher.update(&hash(result.subject.as_str().as_bytes()));
    hasher.update(&result.expires_at.timestamp().to_be_bytes());
    hasher.update(&result.expires_at.timestamp_subsec_nanos().to_be_bytes());
    *hasher.finalize().as_bytes()
}

/// The digest a verifier signs for `result` under `domain`.
pub fn typed_data_digest(domain: &TypedDataDomain, result: &VerificationResult) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&DIGEST_PREFIX);
    hasher.update(&domain.separator());
    hasher.update(&verification_struct_hash(result));
    *hasher.finalize().as_bytes()
}

/// Sign a verification result for a given ledger domain.
pub fn sign_verification_result(
    domain: &TypedDataDomain,
    result: &VerificationResult,
    keypair: &KeyPair,
) -> RecoverableSignature {
    sign_digest(&typed_data_digest(domain, result), keypair)
}

/// Recover the key that signed `result` under `domain`.
pub fn recover_verification_signer(
    domain: &TypedDataDomain,
    result: &VerificationResult,
    signature: &RecoverableSignature,
) -> Result<PublicKey, CryptoError> {
    let digest = typed_data_digest(domain, result);
    let signer = recover(&digest, signature)?;
    tracing::debug!(
        signer = %signer.to_principal(),
        registry = %domain.verifying_registry,
        "recovered verification signer"
    );
    Ok(signer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_core::SchemaId;
    use chrono::{Duration, TimeZone, Utc};

    fn domain(registry: &str) -> TypedDataDomain {
        TypedDataDomain::new(&DomainConfig::default(), Principal::new(registry))
    }

    fn result() -> VerificationResult {
        VerificationResult {
            schema: SchemaId::new("centre.io/credentials/kyc"),
            subject: Principal::new("subject-1"),
            expires_at: Utc.timestamp_opt(9_999_999_999, 0).unwrap(),
        }
    }

    #[test]
    fn test_sign_and_recover() {
        let kp = KeyPair::generate();
        let d = domain("ledger-a");
        let sig = sign_verification_result(&d, &result(), &kp);
        let signer = recover_verification_signer(&d, &result(), &sig).unwrap();
        assert_eq!(signer.to_principal(), kp.principal());
    }

    #[test]
    fn test_mutating_any_field_breaks_signature() {
        let kp = KeyPair::generate();
        let d = domain("ledger-a");
        let sig = sign_verification_result(&d, &result(), &kp);

        let mut schema = result();
        schema.schema = SchemaId::new("centre.io/credentials/aml");
        assert!(recover_verification_signer(&d, &schema, &sig).is_err());

        let mut subject = result();
        subject.subject = Principal::new("subject-2");
        assert!(recover_verification_signer(&d, &subject, &sig).is_err());

        let mut expiry = result();
        expiry.expires_at += Duration::seconds(1);
        assert!(recover_verification_signer(&d, &expiry, &sig).is_err());

        let mut nanos = result();
        nanos.expires_at += Duration::nanoseconds(1);
        assert!(recover_verification_signer(&d, &nanos, &sig).is_err());
    }

    #[test]
    fn test_domain_binding_prevents_replay() {
        let kp = KeyPair::generate();
        let sig = sign_verification_result(&domain("ledger-a"), &result(), &kp);
        assert!(recover_verification_signer(&domain("ledger-b"), &result(), &sig).is_err());

        let other_network = TypedDataDomain {
            network_id: 1,
            ..domain("ledger-a")
        };
        assert!(recover_verification_signer(&other_network, &result(), &sig).is_err());

        let other_version = TypedDataDomain {
            version: "2.0".into(),
            ..domain("ledger-a")
        };
        assert!(recover_verification_signer(&other_version, &result(), &sig).is_err());
    }

    #[test]
    fn test_separator_changes_with_each_field() {
        let base = domain("ledger-a");
        let renamed = TypedDataDomain {
            name: "Other".into(),
            ..base.clone()
        };
        assert_ne!(base.separator(), renamed.separator());
        assert_ne!(base.separator(), domain("ledger-b").separator());
    }

    #[test]
    fn test_digest_deterministic() {
        let d = domain("ledger-a");
        assert_eq!(typed_data_digest(&d, &result()), typed_data_digest(&d, &result()));
        assert_eq!(
            verification_struct_hash(&result()),
            verification_struct_hash(&result())
        );
    }
}
