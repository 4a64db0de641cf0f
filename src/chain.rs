use std::time::Duration;

use alloy::primitives::Address;
use async_trait::async_trait;
use thiserror::Error;

use crate::types::RawAmount;

/// Read-only ERC-20 methods the balance report needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractCall {
    BalanceOf { owner: Address },
    Decimals,
    Symbol,
    Name,
}

impl ContractCall {
    pub fn method(&self) -> &'static str {
        match self {
            ContractCall::BalanceOf { .. } => "balanceOf",
            ContractCall::Decimals => "decimals",
            ContractCall::Symbol => "symbol",
            ContractCall::Name => "name",
        }
    }
}

/// Decoded return value of a [`ContractCall`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutput {
    Amount(RawAmount),
    Integer(u8),
    Text(String),
}

impl CallOutput {
    pub fn into_amount(self, call: ContractCall) -> Result<RawAmount, ChainError> {
        match self {
            CallOutput::Amount(amount) => Ok(amount),
            output => Err(ChainError::unexpected(call, output)),
        }
    }

    pub fn into_integer(self, call: ContractCall) -> Result<u8, ChainError> {
        match self {
            CallOutput::Integer(value) => Ok(value),
            output => Err(ChainError::unexpected(call, output)),
        }
    }

    pub fn into_text(self, call: ContractCall) -> Result<String, ChainError> {
        match self {
            CallOutput::Text(text) => Ok(text),
            output => Err(ChainError::unexpected(call, output)),
        }
    }
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("read timed out after {0:?}")]
    Timeout(Duration),
    #[error("{method} call on {contract} failed: {message}")]
    ContractCall {
        contract: Address,
        method: &'static str,
        message: String,
    },
    #[error("unexpected output from {method}: {output:?}")]
    UnexpectedOutput {
        method: &'static str,
        output: CallOutput,
    },
}

impl ChainError {
    fn unexpected(call: ContractCall, output: CallOutput) -> Self {
        ChainError::UnexpectedOutput {
            method: call.method(),
            output,
        }
    }
}

/// Remote read-only access to a chain node.
///
/// Implementations are shared across concurrent reads and requests without
/// external locking, so they must be `Send + Sync`. No retries happen here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native currency balance of `address` at the latest block.
    async fn native_balance(&self, address: Address) -> Result<RawAmount, ChainError>;

    /// Execute a view method on `contract`.
    async fn call_read_only(
        &self,
        contract: Address,
        call: ContractCall,
    ) -> Result<CallOutput, ChainError>;
}
