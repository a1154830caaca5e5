use attest_core::{Principal, VerifierInfo};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::admin::Administrator;
use crate::error::RegistryError;

/// Resolves a recovered signing key to the verifier it belongs to.
pub trait VerifierLookup: Send + Sync {
    /// Principal of the registered verifier whose signing key is `signer`.
    fn verifier_for_signer(&self, signer: &Principal) -> Option<Principal>;
}

#[derive(Default)]
struct DirectoryState {
    /// Verifier principal → record.
    verifiers: HashMap<Principal, VerifierInfo>,
    /// Signing key → verifier principal. Kept in lockstep with `verifiers`.
    signers: HashMap<Principal, Principal>,
}

impl DirectoryState {
    /// Fail if `signer` already belongs to a verifier other than `owner`.
    fn check_signer_free(&self, signer: &Principal, owner: &Principal) -> Result<(), RegistryError> {
        match self.signers.get(signer) {
            Some(existing) if existing != owner => Err(RegistryError::SigningKeyInUse {
                signer: signer.clone(),
                verifier: existing.clone(),
            }),
            _ => Ok(()),
        }
    }
}

/// Directory of trusted verifiers keyed by principal.
pub struct VerifierDirectory {
    admin: Administrator,
    state: RwLock<DirectoryState>,
}

impl VerifierDirectory {
    /// Create an empty directory administered by `admin`.
    pub fn new(admin: Administrator) -> Self {
        Self {
            admin,
            state: RwLock::new(DirectoryState::default()),
        }
    }

    pub fn admin(&self) -> &Administrator {
        &self.admin
    }

    fn read(&self) -> RwLockReadGuard<'_, DirectoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DirectoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new verifier.
    pub fn add_verifier(
        &self,
        caller: &Principal,
        principal: Principal,
        info: VerifierInfo,
    ) -> Result<(), RegistryError> {
        self.admin.authorize(caller)?;
        let mut state = self.write();
        if state.verifiers.contains_key(&principal) {
            return Err(RegistryError::AlreadyExists(principal));
        }
        state.check_signer_free(&info.signer, &principal)?;

        tracing::info!(
            verifier = %principal,
            signer = %info.signer,
            name = %info.name,
            "verifier added"
        );
        state.signers.insert(info.signer.clone(), principal.clone());
        state.verifiers.insert(principal, info);
        Ok(())
    }

    /// Replace an existing verifier's record, including its signing key.
    pub fn update_verifier(
        &self,
        caller: &Principal,
        principal: &Principal,
        info: VerifierInfo,
    ) -> Result<(), RegistryError> {
        self.admin.authorize(caller)?;
        let mut state = self.write();
        let old_signer = match state.verifiers.get(principal) {
            Some(existing) => existing.signer.clone(),
            None => return Err(RegistryError::VerifierNotFound(principal.clone())),
        };
        state.check_signer_free(&info.signer, principal)?;

        if old_signer != info.signer {
            state.signers.remove(&old_signer);
            state.signers.insert(info.signer.clone(), principal.clone());
            tracing::info!(verifier = %principal, signer = %info.signer, "verifier signing key rotated");
        }
        tracing::info!(verifier = %principal, "verifier updated");
        state.verifiers.insert(principal.clone(), info);
        Ok(())
    }

    /// Remove a verifier. Verifications it already signed stay on record.
    pub fn remove_verifier(
        &self,
        caller: &Principal,
        principal: &Principal,
    ) -> Result<VerifierInfo, RegistryError> {
        self.admin.authorize(caller)?;
        let mut state = self.write();
        let removed = state
            .verifiers
            .remove(principal)
            .ok_or_else(|| RegistryError::VerifierNotFound(principal.clone()))?;
        state.signers.remove(&removed.signer);
        tracing::info!(verifier = %principal, "verifier removed");
        Ok(removed)
    }

    /// Check if a principal is a registered verifier.
    pub fn is_verifier(&self, principal: &Principal) -> bool {
        self.read().verifiers.contains_key(principal)
    }

    /// Get a verifier's record.
    pub fn get_verifier(&self, principal: &Principal) -> Result<VerifierInfo, RegistryError> {
        self.read()
            .verifiers
            .get(principal)
            .cloned()
            .ok_or_else(|| RegistryError::VerifierNotFound(principal.clone()))
    }

    /// Number of registered verifiers.
    pub fn verifier_count(&self) -> usize {
        self.read().verifiers.len()
    }

    /// All verifiers, sorted by principal.
    pub fn verifiers(&self) -> Vec<(Principal, VerifierInfo)> {
        let mut all: Vec<_> = self
            .read()
            .verifiers
            .iter()
            .map(|(p, info)| (p.clone(), info.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}

impl VerifierLookup for VerifierDirectory {
    fn verifier_for_signer(&self, signer: &Principal) -> Option<Principal> {
        self.read().signers.get(signer).cloned()
    }
}
