use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Typed-data signing domain shared by a ledger and the verifiers that sign
/// for it. The ledger's own principal completes the domain at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Domain name bound into every signature.
    #[serde(default = "default_domain_name")]
    pub name: String,
    /// Version tag bound into every signature.
    #[serde(default = "default_domain_version")]
    pub version: String,
    /// Identity of the execution network.
    #[serde(default = "default_network_id")]
    pub network_id: u64,
}

fn default_domain_name() -> String {
    "VerifiedCredentialRegistry".into()
}
fn default_domain_version() -> String {
    "1.0".into()
}
fn default_network_id() -> u64 {
    1337
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            name: default_domain_name(),
            version: default_domain_version(),
            network_id: default_network_id(),
        }
    }
}

impl DomainConfig {
    /// Reject domains that would make signatures ambiguous.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Config("domain name must not be empty".into()));
        }
        if self.version.trim().is_empty() {
            return Err(CoreError::Config("domain version must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_domain() {
        let config = DomainConfig::default();
        assert_eq!(config.name, "VerifiedCredentialRegistry");
        assert_eq!(config.version, "1.0");
        assert_eq!(config.network_id, 1337);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_domain_from_partial_toml() {
        let config: DomainConfig = toml::from_str("network_id = 10").unwrap();
        assert_eq!(config.network_id, 10);
        assert_eq!(config.version, "1.0");
    }

    #[test]
    fn test_domain_validate_empty_version() {
        let config = DomainConfig {
            version: " ".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }
}
