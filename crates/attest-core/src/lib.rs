//! Attest Core: Fundamental types, errors, and configuration shared by the
//! verifier directory, the credential ledger and the requirement aggregator.

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::DomainConfig;
pub use error::CoreError;
pub use types::{
    DisplayName, Principal, SchemaId, Verification, VerificationId, VerificationResult,
    VerifierInfo,
};
