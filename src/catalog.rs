use std::collections::HashSet;

use alloy::primitives::Address;
use thiserror::Error;

/// A fungible token the report looks up for every address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDescriptor {
    pub symbol: String,
    pub contract_address: Address,
    pub display_name: String,
    /// Known exponent; when set, the decimals read is skipped.
    pub decimals: Option<u8>,
}

impl TokenDescriptor {
    pub fn new(symbol: impl Into<String>, contract_address: Address, display_name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            contract_address,
            display_name: display_name.into(),
            decimals: None,
        }
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = Some(decimals);
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate token symbol '{0}' in catalog")]
    DuplicateSymbol(String),
    #[error("contract {contract} listed twice in catalog (second as '{symbol}')")]
    DuplicateContract { contract: Address, symbol: String },
}

/// Ordered, immutable list of tokens. Declaration order is report order.
#[derive(Debug, Clone, Default)]
pub struct TokenCatalog {
    tokens: Vec<TokenDescriptor>,
}

impl TokenCatalog {
    /// Build a catalog, rejecting repeated symbols or contracts.
    pub fn new(tokens: Vec<TokenDescriptor>) -> Result<Self, CatalogError> {
        let mut symbols = HashSet::new();
        let mut contracts = HashSet::new();

        for token in &tokens {
            if !symbols.insert(token.symbol.as_str()) {
                return Err(CatalogError::DuplicateSymbol(token.symbol.clone()));
            }
            if !contracts.insert(token.contract_address) {
                return Err(CatalogError::DuplicateContract {
                    contract: token.contract_address,
                    symbol: token.symbol.clone(),
                });
            }
        }

        Ok(Self { tokens })
    }

    pub fn all(&self) -> &[TokenDescriptor] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Copy of this catalog with `extra` appended after the configured tokens.
    pub fn extended(
        &self,
        extra: impl IntoIterator<Item = TokenDescriptor>,
    ) -> Result<Self, CatalogError> {
        let mut tokens = self.tokens.clone();
        tokens.extend(extra);
        Self::new(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn usdc() -> TokenDescriptor {
        TokenDescriptor::new(
            "USDC",
            address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
            "USD Coin",
        )
        .with_decimals(6)
    }

    fn dai() -> TokenDescriptor {
        TokenDescriptor::new(
            "DAI",
            address!("6B175474E89094C44Da98b954EedeAC495271d0F"),
            "Dai Stablecoin",
        )
    }

    #[test]
    fn test_preserves_declaration_order() {
        let catalog = TokenCatalog::new(vec![usdc(), dai()]).unwrap();
        let symbols: Vec<_> = catalog.all().iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, ["USDC", "DAI"]);
        assert_eq!(catalog.all()[0].decimals, Some(6));
        assert_eq!(catalog.all()[1].decimals, None);
    }

    #[test]
    fn test_rejects_duplicates() {
        assert_eq!(
            TokenCatalog::new(vec![usdc(), usdc()]).unwrap_err(),
            CatalogError::DuplicateSymbol("USDC".to_string())
        );

        let mut renamed = dai();
        renamed.symbol = "DAI2".to_string();
        assert_eq!(
            TokenCatalog::new(vec![dai(), renamed]).unwrap_err(),
            CatalogError::DuplicateContract {
                contract: address!("6B175474E89094C44Da98b954EedeAC495271d0F"),
                symbol: "DAI2".to_string(),
            }
        );
    }

    #[test]
    fn test_extended_appends_after_configured_tokens() {
        let catalog = TokenCatalog::new(vec![usdc()]).unwrap();
        let extended = catalog.extended([dai()]).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(extended.len(), 2);
        assert_eq!(extended.all()[1].symbol, "DAI");
        assert!(matches!(
            catalog.extended([usdc()]),
            Err(CatalogError::DuplicateSymbol(symbol)) if symbol == "USDC"
        ));
    }
}
