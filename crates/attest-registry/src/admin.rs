use attest_core::Principal;

use crate::error::RegistryError;

/// The administrator capability a component is constructed with.
///
/// Each component checks mutating admin calls against its own
/// `Administrator`; there is no process-wide owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Administrator {
    principal: Principal,
}

impl Administrator {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn is(&self, caller: &Principal) -> bool {
        &self.principal == caller
    }

    /// Fail with `Unauthorized` unless `caller` is the administrator.
    pub fn authorize(&self, caller: &Principal) -> Result<(), RegistryError> {
        if self.is(caller) {
            Ok(())
        } else {
            tracing::warn!(caller = %caller, "rejected non-administrator call");
            Err(RegistryError::Unauthorized(caller.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize() {
        let admin = Administrator::new(Principal::new("owner"));
        assert!(admin.authorize(&Principal::new("owner")).is_ok());
        let err = admin.authorize(&Principal::new("mallory")).unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized(p) if p.as_str() == "mallory"));
    }
}
