//! Registries shared across HTTP handlers.

use attest_core::{Clock, Principal};
use attest_registry::{Administrator, CredentialLedger, RequirementAggregator, VerifierDirectory};
use std::sync::Arc;
use std::time::Instant;

use crate::config::AttestConfig;

/// The composed registries of a running node.
pub struct AppState {
    pub directory: Arc<VerifierDirectory>,
    pub ledger: Arc<CredentialLedger>,
    pub aggregator: RequirementAggregator,
    /// When the node started.
    pub start_time: Instant,
}

impl AppState {
    /// Build the directory, ledger and aggregator described by `config`,
    /// acting as the configured administrator for the seeding calls.
    pub fn from_config(config: &AttestConfig, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        config.validate()?;
        let admin: &Principal = &config.registry.admin;

        let directory = Arc::new(VerifierDirectory::new(Administrator::new(admin.clone())));
        for entry in &config.verifiers {
            directory.add_verifier(admin, entry.principal.clone(), entry.info()?)?;
        }

        let ledger = Arc::new(CredentialLedger::new(
            config.registry.ledger_id.clone(),
            Administrator::new(admin.clone()),
            &config.domain,
            clock,
        ));
        ledger.set_verifier_registry(admin, directory.clone())?;

        let aggregator = RequirementAggregator::new(Administrator::new(admin.clone()));
        for requirement in &config.requirements {
            if requirement.ledger {
                aggregator.add_registry(admin, &requirement.id, ledger.clone())?;
            } else {
                tracing::warn!(requirement = %requirement.id, "requirement has no sources");
            }
        }

        tracing::info!(
            ledger = %ledger.id(),
            verifiers = directory.verifier_count(),
            requirements = aggregator.requirements().len(),
            "registries initialized"
        );

        Ok(Self {
            directory,
            ledger,
            aggregator,
            start_time: Instant::now(),
        })
    }
}
