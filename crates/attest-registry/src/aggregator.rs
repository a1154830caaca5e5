use attest_core::Principal;
use dashmap::DashMap;
use std::sync::Arc;

use crate::admin::Administrator;
use crate::error::RegistryError;
use crate::ledger::CredentialLedger;
use crate::source::{CredentialSource, SourceRef, TokenBalanceOracle, TokenBalanceSource, TokenTypeId};

/// Maps requirement names to the credential sources that can satisfy them.
///
/// A subject meets a requirement if any of its sources says so. Sources are
/// kept in insertion order and deduplicated by [`SourceRef`].
pub struct RequirementAggregator {
    admin: Administrator,
    requirements: DashMap<String, Vec<Arc<dyn CredentialSource>>>,
}

impl RequirementAggregator {
    pub fn new(admin: Administrator) -> Self {
        Self {
            admin,
            requirements: DashMap::new(),
        }
    }

    pub fn admin(&self) -> &Administrator {
        &self.admin
    }

    /// Add any credential source. Returns `false` if it was already present.
    pub fn add_source(
        &self,
        caller: &Principal,
        requirement: &str,
        source: Arc<dyn CredentialSource>,
    ) -> Result<bool, RegistryError> {
        self.admin.authorize(caller)?;
        let source_ref = source.source_ref();
        let mut sources = self.requirements.entry(requirement.to_string()).or_default();
        if sources.iter().any(|s| s.source_ref() == source_ref) {
            tracing::debug!(requirement, source = %source_ref, "source already registered");
            return Ok(false);
        }
        sources.push(source);
        tracing::info!(requirement, source = %source_ref, "requirement source added");
        Ok(true)
    }

    /// Let `ledger` satisfy `requirement`.
    pub fn add_registry(
        &self,
        caller: &Principal,
        requirement: &str,
        ledger: Arc<CredentialLedger>,
    ) -> Result<bool, RegistryError> {
        self.add_source(caller, requirement, ledger)
    }

    /// Let a positive balance of `token_type` on `oracle` satisfy
    /// `requirement`.
    pub fn add_nft_registry(
        &self,
        caller: &Principal,
        requirement: &str,
        oracle: Arc<dyn TokenBalanceOracle>,
        token_type: TokenTypeId,
    ) -> Result<bool, RegistryError> {
        let source = TokenBalanceSource::new(oracle, token_type);
        self.add_source(caller, requirement, Arc::new(source))
    }

    /// Unlink a source from a requirement.
    pub fn remove_registry(
        &self,
        caller: &Principal,
        requirement: &str,
        source_ref: &SourceRef,
    ) -> Result<(), RegistryError> {
        self.admin.authorize(caller)?;
        let not_found = || RegistryError::SourceNotFound {
            requirement: requirement.to_string(),
            source_ref: source_ref.clone(),
        };

        let mut sources = self.requirements.get_mut(requirement).ok_or_else(not_found)?;
        let position = sources
            .iter()
            .position(|s| &s.source_ref() == source_ref)
            .ok_or_else(not_found)?;
        sources.remove(position);
        let now_empty = sources.is_empty();
        drop(sources);

        if now_empty {
            self.requirements
                .remove_if(requirement, |_, sources| sources.is_empty());
        }
        tracing::info!(requirement, source = %source_ref, "requirement source removed");
        Ok(())
    }

    pub fn has_registry(&self, requirement: &str, source_ref: &SourceRef) -> bool {
        self.requirements
            .get(requirement)
            .is_some_and(|sources| sources.iter().any(|s| &s.source_ref() == source_ref))
    }

    pub fn registry_count(&self, requirement: &str) -> usize {
        self.requirements
            .get(requirement)
            .map(|sources| sources.len())
            .unwrap_or(0)
    }

    /// Sources linked to `requirement`, in insertion order.
    pub fn sources(&self, requirement: &str) -> Vec<SourceRef> {
        self.requirements
            .get(requirement)
            .map(|sources| sources.iter().map(|s| s.source_ref()).collect())
            .unwrap_or_default()
    }

    /// Requirement names with at least one source, sorted.
    pub fn requirements(&self) -> Vec<String> {
        let mut names: Vec<String> = self.requirements.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Whether any source registered for `requirement` verifies `subject`.
    pub fn is_verified(&self, requirement: &str, subject: &Principal) -> bool {
        // Snapshot the sources so no map shard is held while sources run.
        let sources: Vec<Arc<dyn CredentialSource>> = match self.requirements.get(requirement) {
            Some(entry) => entry.value().clone(),
            None => return false,
        };
        let verified = sources.iter().any(|s| s.is_verified(subject));
        tracing::debug!(requirement, subject = %subject, verified, "requirement evaluated");
        verified
    }
}
