//! Node configuration loading and management.

use attest_core::{DisplayName, DomainConfig, Principal, VerifierInfo};
use attest_crypto::{CryptoError, PublicKey};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Full configuration for the Attest node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AttestConfig {
    /// API server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Typed-data signing domain.
    #[serde(default)]
    pub domain: DomainConfig,

    /// Registry identities.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Verifiers seeded into the directory at startup.
    #[serde(default)]
    pub verifiers: Vec<VerifierEntry>,

    /// Requirements wired to the ledger at startup.
    #[serde(default)]
    pub requirements: Vec<RequirementEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Administrator of the directory, ledger and aggregator.
    #[serde(default = "default_admin")]
    pub admin: Principal,
    /// Principal of the ledger; bound into every signature it accepts.
    #[serde(default = "default_ledger_id")]
    pub ledger_id: Principal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierEntry {
    pub principal: Principal,
    pub name: DisplayName,
    #[serde(default)]
    pub did: String,
    #[serde(default)]
    pub url: String,
    /// `ed25519:<hex>` principal of the verifier's signing key.
    pub signer: Principal,
}

impl VerifierEntry {
    /// The directory record for this entry. The signer is re-encoded in the
    /// canonical `ed25519:<lowercase hex>` form that signature recovery yields.
    pub fn info(&self) -> Result<VerifierInfo, CryptoError> {
        let signer = PublicKey::from_principal(&self.signer)?.to_principal();
        Ok(VerifierInfo {
            name: self.name,
            did: self.did.clone(),
            url: self.url.clone(),
            signer,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementEntry {
    pub id: String,
    /// Whether the node's ledger satisfies this requirement.
    #[serde(default = "default_true")]
    pub ledger: bool,
}

fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    9101
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_admin() -> Principal {
    Principal::new("admin")
}
fn default_ledger_id() -> Principal {
    Principal::new("ledger-1")
}
fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            admin: default_admin(),
            ledger_id: default_ledger_id(),
        }
    }
}

impl AttestConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: AttestConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Check values serde cannot: principal syntax, domain fields, log format.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.domain.validate()?;
        self.registry.admin.as_str().parse::<Principal>()?;
        self.registry.ledger_id.as_str().parse::<Principal>()?;
        for verifier in &self.verifiers {
            verifier.principal.as_str().parse::<Principal>()?;
            verifier.info()?;
        }
        match self.logging.format.as_str() {
            "text" | "json" => Ok(()),
            other => anyhow::bail!("unknown log format: {}", other),
        }
    }

    /// The socket address the API binds to.
    pub fn api_socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.api.listen_addr, self.api.port).parse()?)
    }
}
