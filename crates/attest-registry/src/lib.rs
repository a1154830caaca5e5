//! Attest Registry: Verifier directory, credential ledger, and requirement
//! aggregator.

pub mod admin;
pub mod aggregator;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod source;

pub use admin::Administrator;
pub use aggregator::RequirementAggregator;
pub use directory::{VerifierDirectory, VerifierLookup};
pub use error::RegistryError;
pub use ledger::CredentialLedger;
pub use source::{
    CredentialSource, InMemoryTokenBalances, SourceRef, TokenBalanceOracle, TokenBalanceSource,
    TokenTypeId,
};
