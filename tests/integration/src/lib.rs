//! Shared fixtures for cross-crate scenario tests.

use attest_core::{
    DisplayName, DomainConfig, ManualClock, Principal, SchemaId, VerificationResult, VerifierInfo,
};
use attest_crypto::{sign_verification_result, KeyPair, RecoverableSignature};
use attest_registry::{Administrator, CredentialLedger, VerifierDirectory};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

pub const KYC_SCHEMA: &str = "centre.io/credentials/kyc";

/// One administrator, one trusted clock and one verifier directory that
/// any number of ledgers can share.
pub struct Deployment {
    pub admin: Principal,
    pub clock: Arc<ManualClock>,
    pub start: DateTime<Utc>,
    pub domain: DomainConfig,
    pub directory: Arc<VerifierDirectory>,
}

impl Deployment {
    pub fn new() -> Self {
        let admin = Principal::new("owner");
        let start = Utc::now();
        Self {
            directory: Arc::new(VerifierDirectory::new(Administrator::new(admin.clone()))),
            clock: Arc::new(ManualClock::new(start)),
            domain: DomainConfig::default(),
            admin,
            start,
        }
    }

    /// Register `principal` as a verifier whose signing key is derived from `seed`.
    pub fn add_verifier(&self, principal: &str, seed: u8) -> KeyPair {
        let key = KeyPair::from_seed(&[seed; 32]);
        self.directory
            .add_verifier(
                &self.admin,
                Principal::new(principal),
                VerifierInfo {
                    name: DisplayName::new(principal).expect("short verifier name"),
                    did: format!("did:web:{}", principal),
                    url: format!("https://{}", principal),
                    signer: key.principal(),
                },
            )
            .expect("verifier registration");
        key
    }

    /// A ledger wired to this deployment's directory and clock.
    pub fn ledger(&self, id: &str) -> Arc<CredentialLedger> {
        let ledger = Arc::new(CredentialLedger::new(
            Principal::new(id),
            Administrator::new(self.admin.clone()),
            &self.domain,
            self.clock.clone(),
        ));
        ledger
            .set_verifier_registry(&self.admin, self.directory.clone())
            .expect("admin sets directory");
        ledger
    }

    /// A KYC claim about `subject` valid for `ttl` from the deployment start.
    pub fn claim(&self, subject: &str, ttl: Duration) -> VerificationResult {
        VerificationResult {
            schema: SchemaId::new(KYC_SCHEMA),
            subject: Principal::new(subject),
            expires_at: self.start + ttl,
        }
    }
}

impl Default for Deployment {
    fn default() -> Self {
        Self::new()
    }
}

/// Sign `result` for `ledger` with `key`.
pub fn sign_for(
    ledger: &CredentialLedger,
    result: &VerificationResult,
    key: &KeyPair,
) -> RecoverableSignature {
    sign_verification_result(ledger.domain(), result, key)
}
