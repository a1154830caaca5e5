use attest_core::{Principal, VerificationId};

use crate::source::SourceRef;

/// Registry errors. Every failed call leaves the component unchanged.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unauthorized caller: {0}")]
    Unauthorized(Principal),

    #[error("verifier already exists: {0}")]
    AlreadyExists(Principal),

    #[error("signing key {signer} already belongs to verifier {verifier}")]
    SigningKeyInUse { signer: Principal, verifier: Principal },

    #[error("verifier not found: {0}")]
    VerifierNotFound(Principal),

    #[error("verification not found: {0}")]
    VerificationNotFound(VerificationId),

    #[error("source {source_ref} not registered for requirement {requirement}")]
    SourceNotFound {
        requirement: String,
        source_ref: SourceRef,
    },

    #[error("signature does not match any registered verifier")]
    InvalidSignature,

    #[error("no verifier registry configured")]
    DirectoryNotConfigured,

    #[error("core error: {0}")]
    Core(#[from] attest_core::CoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] attest_crypto::CryptoError),
}

impl RegistryError {
    /// Whether this is one of the lookup-miss variants.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::VerifierNotFound(_) | Self::VerificationNotFound(_) | Self::SourceNotFound { .. }
        )
    }
}
