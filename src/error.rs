use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::ChainError;

/// Why a balance report could not be produced.
///
/// Per-token read failures never appear here; they only shorten the report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid address: {input:?}")]
    InvalidAddress { input: String },
    #[error("chain provider unavailable: {reason}")]
    ProviderUnavailable { reason: String },
    #[error("failed to read native balance: {source}")]
    ProviderReadFailed {
        #[source]
        source: ChainError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidAddress,
    ProviderUnavailable,
    ProviderReadFailed,
}

impl ErrorKind {
    /// Caller mistakes, as opposed to provider-side failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ErrorKind::InvalidAddress)
    }
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::InvalidAddress { .. } => ErrorKind::InvalidAddress,
            ReportError::ProviderUnavailable { .. } => ErrorKind::ProviderUnavailable,
            ReportError::ProviderReadFailed { .. } => ErrorKind::ProviderReadFailed,
        }
    }
}

impl From<ChainError> for ReportError {
    fn from(source: ChainError) -> Self {
        ReportError::ProviderReadFailed { source }
    }
}

/// Failure shape handed to a transport (HTTP body, CLI `--json` output).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ReportError> for ErrorBody {
    fn from(err: &ReportError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_body_carries_kind_and_cause() {
        let err = ReportError::from(ChainError::Timeout(Duration::from_secs(10)));
        let body = ErrorBody::from(&err);

        assert_eq!(body.kind, ErrorKind::ProviderReadFailed);
        assert!(body.message.contains("timed out"));
        assert!(!body.kind.is_client_error());

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["kind"], "ProviderReadFailed");
    }

    #[test]
    fn test_only_invalid_address_is_client_error() {
        let invalid = ReportError::InvalidAddress {
            input: "0x12".to_string(),
        };
        let unavailable = ReportError::ProviderUnavailable {
            reason: "no rpc url configured".to_string(),
        };

        assert!(invalid.kind().is_client_error());
        assert!(!unavailable.kind().is_client_error());
    }
}
