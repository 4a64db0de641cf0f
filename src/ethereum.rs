use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::BlockNumberOrTag;
use alloy::sol;
use alloy::transports::http::reqwest::Url;
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;

use crate::chain::{CallOutput, ChainClient, ChainError, ContractCall};
use crate::types::RawAmount;

// ERC-20 read-only surface
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function name() external view returns (string);
    }
}

/// Ethereum chain client over a single JSON-RPC HTTP provider.
///
/// The provider is built once and shared by every read issued through this
/// client; the underlying HTTP client pools its connections.
pub struct EthereumClient<P> {
    provider: P,
}

impl<P> EthereumClient<P>
where
    P: Provider<Http<Client>>,
{
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

/// Build a client for the HTTP endpoint at `rpc_url`.
pub fn connect_http(
    rpc_url: &str,
) -> Result<EthereumClient<impl Provider<Http<Client>> + 'static>, ChainError> {
    let url: Url = rpc_url
        .parse()
        .map_err(|e| ChainError::Connection(format!("invalid rpc url '{}': {}", rpc_url, e)))?;

    Ok(EthereumClient::new(ProviderBuilder::new().on_http(url)))
}

fn call_error(contract: Address, method: &'static str, err: alloy::contract::Error) -> ChainError {
    match err {
        // A JSON-RPC error response (revert, missing method) is the contract's
        // fault; anything else on the transport is a connectivity problem.
        alloy::contract::Error::TransportError(e) if e.as_error_resp().is_none() => {
            ChainError::Connection(e.to_string())
        }
        other => ChainError::ContractCall {
            contract,
            method,
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl<P> ChainClient for EthereumClient<P>
where
    P: Provider<Http<Client>> + 'static,
{
    async fn native_balance(&self, address: Address) -> Result<RawAmount, ChainError> {
        self.provider
            .get_balance(address)
            .block_id(BlockNumberOrTag::Latest.into())
            .await
            .map_err(|e| ChainError::Connection(e.to_string()))
    }

    async fn call_read_only(
        &self,
        contract: Address,
        call: ContractCall,
    ) -> Result<CallOutput, ChainError> {
        let token = IERC20::new(contract, &self.provider);
        let method = call.method();

        let output = match call {
            ContractCall::BalanceOf { owner } => token
                .balanceOf(owner)
                .call()
                .await
                .map(|r| CallOutput::Amount(r._0)),
            ContractCall::Decimals => token
                .decimals()
                .call()
                .await
                .map(|r| CallOutput::Integer(r._0)),
            ContractCall::Symbol => token
                .symbol()
                .call()
                .await
                .map(|r| CallOutput::Text(r._0)),
            ContractCall::Name => token.name().call().await.map(|r| CallOutput::Text(r._0)),
        };

        output.map_err(|e| call_error(contract, method, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unparsable_endpoint() {
        match connect_http("not a url") {
            Err(ChainError::Connection(message)) => assert!(message.contains("not a url")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("endpoint should not parse"),
        }
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_mainnet_usdc_metadata() {
        let client = connect_http("https://ethereum-rpc.publicnode.com").unwrap();
        let usdc: Address = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".parse().unwrap();

        let decimals = client
            .call_read_only(usdc, ContractCall::Decimals)
            .await
            .unwrap();
        assert_eq!(decimals, CallOutput::Integer(6));

        let symbol = client.call_read_only(usdc, ContractCall::Symbol).await.unwrap();
        assert_eq!(symbol, CallOutput::Text("USDC".to_string()));
    }
}
