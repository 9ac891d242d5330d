//! Client configuration.

use alloy_primitives::Address;
use collection_types::DEFAULT_MAX_PER_TX;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, warn};

/// Configuration for the collection client.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::rpc_url")]
    pub rpc_url: String,

    #[serde(default)]
    pub fallback_rpc_url: Option<String>,

    #[serde(default = "defaults::contract_address")]
    pub contract_address: Address,

    #[serde(default = "defaults::explorer_url")]
    pub explorer_url: String,

    #[serde(default = "defaults::max_per_tx")]
    pub max_per_tx: u32,

    #[serde(default = "defaults::gas_per_token")]
    pub gas_per_token: u64,

    #[serde(default = "defaults::receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,

    #[serde(default = "defaults::receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: defaults::rpc_url(),
            fallback_rpc_url: None,
            contract_address: defaults::contract_address(),
            explorer_url: defaults::explorer_url(),
            max_per_tx: defaults::max_per_tx(),
            gas_per_token: defaults::gas_per_token(),
            receipt_poll_interval_ms: defaults::receipt_poll_interval_ms(),
            receipt_timeout_secs: defaults::receipt_timeout_secs(),
        }
    }
}

impl Config {
    /// Optional `{file}.toml` layered with `{env_prefix}_*` environment variables.
    ///
    /// Falls back to defaults only when no config exists; values that fail
    /// to parse are an error.
    pub fn load(file: &str, env_prefix: &str) -> Result<Self, crate::Error> {
        let loaded = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(config::Environment::with_prefix(env_prefix))
            .build()
            .and_then(|c| c.try_deserialize());
        match loaded {
            Ok(config) => Ok(config),
            Err(e) => {
                let err_str = e.to_string();
                if err_str.contains("not found") || err_str.contains("missing field") {
                    warn!(error = %e, "No config found, using defaults");
                    Ok(Self::default())
                } else {
                    error!(error = %e, "Config error, fix {env_prefix}_* env vars or {file}.toml");
                    Err(crate::Error::Config(err_str))
                }
            }
        }
    }

    /// Validated subset handed to [`crate::CollectionClient`].
    pub fn client_config(&self) -> Result<ClientConfig, crate::Error> {
        if self.contract_address.is_zero() {
            return Err(crate::Error::Config(
                "contract_address is not set".to_string(),
            ));
        }
        if self.max_per_tx == 0 {
            return Err(crate::Error::Config("max_per_tx must be at least 1".to_string()));
        }
        Ok(ClientConfig {
            contract_address: self.contract_address,
            explorer_url: self.explorer_url.clone(),
            max_per_tx: self.max_per_tx,
            gas_per_token: self.gas_per_token,
        })
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }
}

/// Everything the workflow needs about the deployed collection.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub contract_address: Address,
    pub explorer_url: String,
    /// Per-transaction cap applied on top of remaining supply.
    pub max_per_tx: u32,
    /// Gas limit per minted token; total limit is this × quantity.
    pub gas_per_token: u64,
}

impl ClientConfig {
    pub fn new(contract_address: Address) -> Self {
        Self {
            contract_address,
            explorer_url: defaults::explorer_url(),
            max_per_tx: defaults::max_per_tx(),
            gas_per_token: defaults::gas_per_token(),
        }
    }
}

mod defaults {
    use super::*;

    pub fn rpc_url() -> String {
        std::env::var("ETH_RPC_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| "http://127.0.0.1:8545".into())
    }

    pub fn contract_address() -> Address {
        Address::ZERO
    }

    pub fn explorer_url() -> String {
        "https://etherscan.io".into()
    }

    pub fn max_per_tx() -> u32 {
        DEFAULT_MAX_PER_TX
    }

    pub fn gas_per_token() -> u64 {
        300_000
    }

    pub fn receipt_poll_interval_ms() -> u64 {
        1_000
    }

    pub fn receipt_timeout_secs() -> u64 {
        300
    }
}
