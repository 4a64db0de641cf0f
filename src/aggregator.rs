use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::Result;
use futures::future::join_all;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::address;
use crate::catalog::{TokenCatalog, TokenDescriptor};
use crate::chain::{ChainClient, ChainError, ContractCall};
use crate::config::Config;
use crate::error::ReportError;
use crate::ethereum;
use crate::types::{format_units, RawAmount, TokenBalance, WalletReport};

const DEFAULT_NATIVE_DECIMALS: u8 = 18;
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

enum Connection {
    Ready(Arc<dyn ChainClient>),
    Unavailable(String),
}

/// What happened to one catalog token during a request.
enum TokenOutcome {
    Held(TokenBalance),
    Empty,
    Failed,
}

/// Request-level cut-off shared by every read of one request.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    limit: Duration,
}

impl Deadline {
    fn after(start: Instant, limit: Duration) -> Self {
        Self {
            at: start + limit,
            limit,
        }
    }
}

async fn within<T>(
    deadline: Option<Deadline>,
    read: impl Future<Output = Result<T, ChainError>>,
) -> Result<T, ChainError> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline.at, read)
            .await
            .unwrap_or_else(|_| Err(ChainError::Timeout(deadline.limit))),
        None => read.await,
    }
}

/// Builds [`WalletReport`]s by fanning out one native read and one read per
/// catalog token against a shared [`ChainClient`].
pub struct BalanceAggregator {
    connection: Connection,
    catalog: Arc<TokenCatalog>,
    native_decimals: u8,
    call_timeout: Duration,
    request_timeout: Option<Duration>,
}

impl BalanceAggregator {
    pub fn new(client: Arc<dyn ChainClient>, catalog: Arc<TokenCatalog>) -> Self {
        Self::with_connection(Connection::Ready(client), catalog)
    }

    /// An aggregator whose every request fails with `ProviderUnavailable`.
    pub fn unavailable(reason: impl Into<String>, catalog: Arc<TokenCatalog>) -> Self {
        Self::with_connection(Connection::Unavailable(reason.into()), catalog)
    }

    fn with_connection(connection: Connection, catalog: Arc<TokenCatalog>) -> Self {
        Self {
            connection,
            catalog,
            native_decimals: DEFAULT_NATIVE_DECIMALS,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            request_timeout: None,
        }
    }

    /// Wire an aggregator from configuration. A missing or unusable endpoint
    /// is not an error here; it surfaces as `ProviderUnavailable` per request.
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = Arc::new(config.catalog()?);

        let aggregator = match config.rpc_url() {
            Some(url) => match ethereum::connect_http(url) {
                Ok(client) => Self::new(Arc::new(client), catalog),
                Err(e) => {
                    warn!(error = %e, "rpc endpoint rejected");
                    Self::unavailable(e.to_string(), catalog)
                }
            },
            None => Self::unavailable("no rpc url configured", catalog),
        };

        Ok(aggregator
            .with_native_decimals(config.native_decimals)
            .with_call_timeout(config.call_timeout())
            .with_request_timeout(config.request_timeout()))
    }

    pub fn with_native_decimals(mut self, decimals: u8) -> Self {
        self.native_decimals = decimals;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &TokenCatalog {
        &self.catalog
    }

    /// Same aggregator over a different catalog, sharing the connection.
    pub fn with_catalog(&self, catalog: Arc<TokenCatalog>) -> Self {
        let connection = match &self.connection {
            Connection::Ready(client) => Connection::Ready(client.clone()),
            Connection::Unavailable(reason) => Connection::Unavailable(reason.clone()),
        };

        Self {
            connection,
            catalog,
            native_decimals: self.native_decimals,
            call_timeout: self.call_timeout,
            request_timeout: self.request_timeout,
        }
    }

    fn client(&self) -> Result<&dyn ChainClient, ReportError> {
        match &self.connection {
            Connection::Ready(client) => Ok(client.as_ref()),
            Connection::Unavailable(reason) => Err(ReportError::ProviderUnavailable {
                reason: reason.clone(),
            }),
        }
    }

    /// Produce the balance report for `input`.
    ///
    /// The address is validated and the connection checked before any remote
    /// read. Token reads that fail or time out, including against the request
    /// timeout, only drop that token; a failed native read fails the request.
    #[instrument(skip(self))]
    pub async fn fetch_report(&self, input: &str) -> Result<WalletReport, ReportError> {
        let owner = address::validate(input)?;
        let client = self.client()?;

        let (native, outcomes) = self.read_all(client, owner).await?;

        let mut token_balances = Vec::new();
        let mut empty = 0usize;
        let mut failed = 0usize;
        for outcome in outcomes {
            match outcome {
                TokenOutcome::Held(balance) => token_balances.push(balance),
                TokenOutcome::Empty => empty += 1,
                TokenOutcome::Failed => failed += 1,
            }
        }

        info!(
            held = token_balances.len(),
            empty,
            failed,
            "wallet report assembled"
        );

        Ok(WalletReport {
            address: input.to_string(),
            eth_balance: format_units(native, self.native_decimals),
            token_balances,
        })
    }

    /// Resolve symbol, name and decimals of an arbitrary token contract.
    pub async fn describe_token(&self, contract: Address) -> Result<TokenDescriptor, ReportError> {
        let client = self.client()?;

        let (symbol, name, decimals) = tokio::try_join!(
            self.timed(async {
                client
                    .call_read_only(contract, ContractCall::Symbol)
                    .await?
                    .into_text(ContractCall::Symbol)
            }),
            self.timed(async {
                client
                    .call_read_only(contract, ContractCall::Name)
                    .await?
                    .into_text(ContractCall::Name)
            }),
            self.timed(async {
                client
                    .call_read_only(contract, ContractCall::Decimals)
                    .await?
                    .into_integer(ContractCall::Decimals)
            }),
        )?;

        Ok(TokenDescriptor::new(symbol, contract, name).with_decimals(decimals))
    }

    /// Native read and every token read, all in flight at once. Token outcomes
    /// come back in catalog order whatever order they finish in. The request
    /// deadline applies to each read on its own, so only the native read can
    /// fail the request, and it does so without waiting for the tokens.
    async fn read_all(
        &self,
        client: &dyn ChainClient,
        owner: Address,
    ) -> Result<(RawAmount, Vec<TokenOutcome>), ChainError> {
        let deadline = self
            .request_timeout
            .map(|limit| Deadline::after(Instant::now(), limit));

        let native = within(deadline, self.timed(client.native_balance(owner)));
        let tokens = join_all(
            self.catalog
                .all()
                .iter()
                .map(|token| self.read_token(client, owner, token, deadline)),
        );

        tokio::try_join!(native, async { Ok::<_, ChainError>(tokens.await) })
    }

    async fn read_token(
        &self,
        client: &dyn ChainClient,
        owner: Address,
        token: &TokenDescriptor,
        deadline: Option<Deadline>,
    ) -> TokenOutcome {
        match within(deadline, self.token_balance(client, owner, token)).await {
            Ok(Some(balance)) => TokenOutcome::Held(balance),
            Ok(None) => {
                debug!(symbol = %token.symbol, "zero balance, skipped");
                TokenOutcome::Empty
            }
            Err(e) => {
                warn!(
                    symbol = %token.symbol,
                    contract = %token.contract_address,
                    error = %e,
                    "token read failed, excluded from report"
                );
                TokenOutcome::Failed
            }
        }
    }

    async fn token_balance(
        &self,
        client: &dyn ChainClient,
        owner: Address,
        token: &TokenDescriptor,
    ) -> Result<Option<TokenBalance>, ChainError> {
        let contract = token.contract_address;

        let balance_call = ContractCall::BalanceOf { owner };
        let raw = self
            .timed(client.call_read_only(contract, balance_call))
            .await?
            .into_amount(balance_call)?;

        if raw.is_zero() {
            return Ok(None);
        }

        let decimals = match token.decimals {
            Some(decimals) => {
                debug!(symbol = %token.symbol, decimals, "using configured decimals");
                decimals
            }
            None => self
                .timed(client.call_read_only(contract, ContractCall::Decimals))
                .await?
                .into_integer(ContractCall::Decimals)?,
        };

        Ok(Some(TokenBalance {
            symbol: token.symbol.clone(),
            name: token.display_name.clone(),
            balance: format_units(raw, decimals),
            contract_address: contract.to_string(),
        }))
    }

    async fn timed<T>(&self, read: impl Future<Output = Result<T, ChainError>>) -> Result<T, ChainError> {
        tokio::time::timeout(self.call_timeout, read)
            .await
            .unwrap_or_else(|_| Err(ChainError::Timeout(self.call_timeout)))
    }
}
