//! Adapter configuration with validation.
//!
//! Loaded from TOML, then overridden from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `EDU_RPC_URL` | `rpc_url` |
//! | `EDU_CONTRACT_ADDRESS` | `contract_address` |
//! | `EDU_POLL_INTERVAL_MS` | `confirmation_poll_interval` |
//! | `EDU_CONFIRMATIONS` | `confirmations` |
//! | `EDU_CHAIN_ID` | `chain_id` |

use crate::domain::value_objects::{parse_address, Address};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Adapter configuration.
///
/// ```toml
/// rpc_url = "http://127.0.0.1:8545"
/// contract_address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
/// confirmation_poll_interval = "2s"
/// confirmations = 1
/// request_timeout = "30s"
/// chain_id = 31337
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// JSON-RPC endpoint of the wallet/provider.
    pub rpc_url: String,
    /// Deployed EduLoan contract.
    pub contract_address: Address,
    /// Delay between receipt polls while waiting for confirmation.
    #[serde(with = "humantime_serde")]
    pub confirmation_poll_interval: Duration,
    /// Blocks (including the inclusion block) before a receipt counts as confirmed.
    pub confirmations: u64,
    /// Per-request HTTP timeout. Confirmation waiting itself never times out.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Expected chain id; checked on every bind when set.
    pub chain_id: Option<u64>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            contract_address: Address::zero(),
            confirmation_poll_interval: Duration::from_secs(1),
            confirmations: 1,
            request_timeout: Duration::from_secs(30),
            chain_id: None,
        }
    }
}

impl AdapterConfig {
    /// Config for `contract_address` with defaults elsewhere.
    #[must_use]
    pub fn for_contract(contract_address: Address) -> Self {
        Self {
            contract_address,
            ..Self::default()
        }
    }

    /// Loads a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parses TOML.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies `EDU_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `EDU_*` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(url) = lookup("EDU_RPC_URL") {
            self.rpc_url = url;
        }
        if let Some(value) = lookup("EDU_CONTRACT_ADDRESS") {
            self.contract_address = parse_address(&value).map_err(|_| ConfigError::InvalidOverride {
                key: "EDU_CONTRACT_ADDRESS",
                value,
            })?;
        }
        if let Some(value) = lookup("EDU_POLL_INTERVAL_MS") {
            let ms: u64 = value.parse().map_err(|_| ConfigError::InvalidOverride {
                key: "EDU_POLL_INTERVAL_MS",
                value: value.clone(),
            })?;
            self.confirmation_poll_interval = Duration::from_millis(ms);
        }
        if let Some(value) = lookup("EDU_CONFIRMATIONS") {
            self.confirmations = value.parse().map_err(|_| ConfigError::InvalidOverride {
                key: "EDU_CONFIRMATIONS",
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup("EDU_CHAIN_ID") {
            let id: u64 = value.parse().map_err(|_| ConfigError::InvalidOverride {
                key: "EDU_CHAIN_ID",
                value: value.clone(),
            })?;
            self.chain_id = Some(id);
        }
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.contract_address.is_zero() {
            return Err(ConfigError::MissingContractAddress);
        }
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(ConfigError::InvalidRpcUrl(self.rpc_url.clone()));
        }
        if self.confirmation_poll_interval.is_zero() {
            return Err(ConfigError::InvalidConfirmation(
                "confirmation_poll_interval cannot be 0".into(),
            ));
        }
        if self.confirmations == 0 {
            return Err(ConfigError::InvalidConfirmation(
                "confirmations cannot be 0".into(),
            ));
        }
        Ok(())
    }
}
