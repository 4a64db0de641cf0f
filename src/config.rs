use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::address;
use crate::catalog::{TokenCatalog, TokenDescriptor};

pub const RPC_URL_ENV: &str = "ETHEREUM_RPC_URL";

/// Settings for one balance aggregator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
    #[serde(default = "default_native_decimals")]
    pub native_decimals: u8,
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
    #[serde(default)]
    pub tokens: Vec<TokenInfo>,
}

/// Token entry as written in the config file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub address: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
}

fn default_native_symbol() -> String {
    "ETH".to_string()
}

fn default_native_decimals() -> u8 {
    18
}

fn default_call_timeout_ms() -> u64 {
    10_000
}

impl Config {
    /// Load configuration from embedded JSON
    pub fn load() -> Result<Self> {
        Self::from_json(include_str!("../config.json")).context("embedded config.json is invalid")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Take the RPC endpoint from the environment when it is set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(RPC_URL_ENV) {
            self.rpc_url = Some(url);
        }
        self
    }

    /// Configured endpoint, ignoring blank values.
    pub fn rpc_url(&self) -> Option<&str> {
        self.rpc_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Build the token catalog in declaration order.
    pub fn catalog(&self) -> Result<TokenCatalog> {
        let tokens = self
            .tokens
            .iter()
            .map(|info| -> Result<TokenDescriptor> {
                let contract_address = address::validate(&info.address)
                    .with_context(|| format!("token {} has a malformed contract address", info.symbol))?;
                Ok(TokenDescriptor {
                    symbol: info.symbol.clone(),
                    contract_address,
                    display_name: info.name.clone(),
                    decimals: info.decimals,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TokenCatalog::new(tokens)?)
    }
}
