use attest_core::{
    Clock, DomainConfig, Principal, Verification, VerificationId, VerificationResult,
};
use attest_crypto::{recover_verification_signer, RecoverableSignature, TypedDataDomain};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::admin::Administrator;
use crate::directory::VerifierLookup;
use crate::error::RegistryError;
use crate::source::{CredentialSource, SourceRef};

/// One arena slot per assigned uuid. Removal tombstones, never frees.
#[derive(Debug, Clone)]
enum Slot {
    Active(Verification),
    Removed,
}

#[derive(Default)]
struct LedgerState {
    /// Slot for uuid `n` lives at index `n - 1`.
    slots: Vec<Slot>,
    by_subject: HashMap<Principal, Vec<VerificationId>>,
    by_verifier: HashMap<Principal, Vec<VerificationId>>,
    active: usize,
}

impl LedgerState {
    fn active(&self, uuid: VerificationId) -> Option<&Verification> {
        let index = usize::try_from(uuid).ok()?.checked_sub(1)?;
        match self.slots.get(index)? {
            Slot::Active(v) => Some(v),
            Slot::Removed => None,
        }
    }

    fn records(&self, ids: Option<&Vec<VerificationId>>) -> Vec<Verification> {
        ids.map(|ids| {
            ids.iter()
                .filter_map(|id| self.active(*id).cloned())
                .collect()
        })
        .unwrap_or_default()
    }
}

/// Ledger of signed verification records.
pub struct CredentialLedger {
    id: Principal,
    admin: Administrator,
    domain: TypedDataDomain,
    clock: Arc<dyn Clock>,
    directory: RwLock<Option<Arc<dyn VerifierLookup>>>,
    state: RwLock<LedgerState>,
}

impl CredentialLedger {
    /// Create an empty ledger identified by `id`. Signatures must be bound to
    /// a domain built from `domain` and this `id`.
    pub fn new(
        id: Principal,
        admin: Administrator,
        domain: &DomainConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let domain = TypedDataDomain::new(domain, id.clone());
        Self {
            id,
            admin,
            domain,
            clock,
            directory: RwLock::new(None),
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// This ledger's principal.
    pub fn id(&self) -> &Principal {
        &self.id
    }

    pub fn admin(&self) -> &Administrator {
        &self.admin
    }

    /// The typed-data domain verifiers sign under for this ledger.
    pub fn domain(&self) -> &TypedDataDomain {
        &self.domain
    }

    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Point this ledger at the verifier directory it trusts.
    pub fn set_verifier_registry(
        &self,
        caller: &Principal,
        directory: Arc<dyn VerifierLookup>,
    ) -> Result<(), RegistryError> {
        self.admin.authorize(caller)?;
        *self.directory.write().unwrap_or_else(PoisonError::into_inner) = Some(directory);
        tracing::info!(ledger = %self.id, "verifier registry set");
        Ok(())
    }

    pub fn has_verifier_registry(&self) -> bool {
        self.directory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Authenticate a signed verification result and record it.
    ///
    /// Open to any caller: trust comes from the signature, which must
    /// recover to the signing key of a verifier in the configured directory.
    pub fn register_verification(
        &self,
        result: &VerificationResult,
        signature: &RecoverableSignature,
    ) -> Result<Verification, RegistryError> {
        let directory = self
            .directory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(RegistryError::DirectoryNotConfigured)?;

        let signer = recover_verification_signer(&self.domain, result, signature)
            .map_err(|e| {
                tracing::warn!(
                    ledger = %self.id,
                    subject = %result.subject,
                    claimed_signer = %signature.claimed_signer().to_principal(),
                    error = %e,
                    "signature recovery failed"
                );
                RegistryError::InvalidSignature
            })?
            .to_principal();

        let verifier = directory.verifier_for_signer(&signer).ok_or_else(|| {
            tracing::warn!(ledger = %self.id, signer = %signer, "signer is not a registered verifier");
            RegistryError::InvalidSignature
        })?;

        let mut state = self.write();
        let uuid = state.slots.len() as VerificationId + 1;
        let record = Verification {
            uuid,
            schema: result.schema.clone(),
            subject: result.subject.clone(),
            verifier: verifier.clone(),
            expires_at: result.expires_at,
        };
        state.slots.push(Slot::Active(record.clone()));
        state
            .by_subject
            .entry(record.subject.clone())
            .or_default()
            .push(uuid);
        state.by_verifier.entry(verifier).or_default().push(uuid);
        state.active += 1;

        tracing::info!(
            ledger = %self.id,
            uuid,
            schema = %record.schema,
            subject = %record.subject,
            verifier = %record.verifier,
            expires = %record.expires_at,
            "verification registered"
        );
        Ok(record)
    }

    /// Whether `subject` has at least one unexpired, unremoved verification.
    pub fn is_verified(&self, subject: &Principal) -> bool {
        let now = self.clock.now();
        let state = self.read();
        state.by_subject.get(subject).is_some_and(|ids| {
            ids.iter()
                .filter_map(|id| state.active(*id))
                .any(|v| v.is_valid_at(now))
        })
    }

    /// Active verifications about `subject`, in insertion order.
    /// Expired records are included; only removal hides a record.
    pub fn verifications_for_subject(&self, subject: &Principal) -> Vec<Verification> {
        let state = self.read();
        state.records(state.by_subject.get(subject))
    }

    /// Active verifications signed by `verifier`, in insertion order.
    pub fn verifications_for_verifier(&self, verifier: &Principal) -> Vec<Verification> {
        let state = self.read();
        state.records(state.by_verifier.get(verifier))
    }

    pub fn get_verification(&self, uuid: VerificationId) -> Result<Verification, RegistryError> {
        self.read()
            .active(uuid)
            .cloned()
            .ok_or(RegistryError::VerificationNotFound(uuid))
    }

    /// Tombstone a verification. Allowed for the record's subject or the
    /// administrator.
    pub fn remove_verification(
        &self,
        caller: &Principal,
        uuid: VerificationId,
    ) -> Result<(), RegistryError> {
        let mut state = self.write();
        let subject = state
            .active(uuid)
            .map(|v| v.subject.clone())
            .ok_or(RegistryError::VerificationNotFound(uuid))?;
        if caller != &subject && !self.admin.is(caller) {
            tracing::warn!(ledger = %self.id, uuid, caller = %caller, "rejected verification removal");
            return Err(RegistryError::Unauthorized(caller.clone()));
        }

        // `active` returned Some, so the index is in range.
        let index = (uuid - 1) as usize;
        state.slots[index] = Slot::Removed;
        state.active -= 1;
        tracing::info!(ledger = %self.id, uuid, caller = %caller, "verification removed");
        Ok(())
    }

    /// Number of active (non-removed) verifications.
    pub fn verification_count(&self) -> usize {
        self.read().active
    }
}

impl CredentialSource for CredentialLedger {
    fn source_ref(&self) -> SourceRef {
        SourceRef::ledger(self.id.clone())
    }

    fn is_verified(&self, subject: &Principal) -> bool {
        CredentialLedger::is_verified(self, subject)
    }
}
