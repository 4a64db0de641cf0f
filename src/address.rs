use alloy::primitives::Address;

use crate::error::ReportError;

const ADDRESS_HEX_LEN: usize = 40;

/// Validate a `0x`-prefixed, 40 hex digit account address.
///
/// Mixed case is accepted without checking the EIP-55 checksum. Nothing else
/// is tolerated: no surrounding whitespace, no missing prefix.
pub fn validate(input: &str) -> Result<Address, ReportError> {
    let invalid = || ReportError::InvalidAddress {
        input: input.to_string(),
    };

    let hex = input.strip_prefix("0x").ok_or_else(invalid)?;
    if hex.len() != ADDRESS_HEX_LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    hex.parse::<Address>().map_err(|_| invalid())
}
