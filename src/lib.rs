mod address;
mod aggregator;
mod catalog;
mod chain;
mod config;
mod error;
mod ethereum;
mod types;

pub use address::validate as validate_address;
pub use aggregator::BalanceAggregator;
pub use catalog::{CatalogError, TokenCatalog, TokenDescriptor};
pub use chain::{CallOutput, ChainClient, ChainError, ContractCall};
pub use config::{Config, TokenInfo, RPC_URL_ENV};
pub use error::{ErrorBody, ErrorKind, ReportError};
pub use ethereum::{connect_http, EthereumClient};
pub use types::{format_units, RawAmount, TokenBalance, WalletReport, DISPLAY_DECIMALS};

// Re-export alloy primitives used in the public API.
pub use alloy::primitives::{Address, U256};

use anyhow::Result;

/// Get the balance report for an address using the embedded configuration,
/// with the RPC endpoint taken from the environment when set.
pub async fn get_wallet_report(address: &str) -> Result<WalletReport> {
    let config = Config::load()?.with_env_overrides();
    let aggregator = BalanceAggregator::from_config(&config)?;
    Ok(aggregator.fetch_report(address).await?)
}
