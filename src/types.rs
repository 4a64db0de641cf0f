use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Integer balance in an asset's smallest unit.
pub type RawAmount = U256;

/// Fractional digits every formatted balance is fixed to.
pub const DISPLAY_DECIMALS: u8 = 6;

/// A non-zero token holding, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub symbol: String,
    pub name: String,
    pub balance: String,
    pub contract_address: String,
}

/// Consolidated balances of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletReport {
    pub address: String,
    pub eth_balance: String,
    pub token_balances: Vec<TokenBalance>,
}

/// Format a raw amount with `decimals` exponent to exactly six fractional
/// digits, rounding half up. All arithmetic stays in `U256`.
pub fn format_units(amount: RawAmount, decimals: u8) -> String {
    let (whole, fractional) = split_display(amount, decimals);

    format!(
        "{}.{:0>width$}",
        whole,
        fractional.to_string(),
        width = DISPLAY_DECIMALS as usize
    )
}

/// Whole units and millionths of `amount`. Only the fraction is ever scaled
/// up, so the whole part is exact for any `U256`.
fn split_display(amount: RawAmount, decimals: u8) -> (U256, U256) {
    let display = DISPLAY_DECIMALS as u32;
    let decimals = decimals as u32;

    if decimals <= display {
        let unit = U256::from(10u64.pow(decimals));
        let pad = U256::from(10u64.pow(display - decimals));
        return (amount / unit, (amount % unit) * pad);
    }

    // 10^78 no longer fits; anything that large rounds to zero.
    let Some(divisor) = pow10(decimals - display) else {
        return (U256::ZERO, U256::ZERO);
    };

    let quotient = amount / divisor;
    let remainder = amount % divisor;
    let millionths = if remainder >= divisor - remainder {
        quotient + U256::from(1u8)
    } else {
        quotient
    };

    let micro = U256::from(10u64.pow(display));
    (millionths / micro, millionths % micro)
}

fn pow10(exp: u32) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(exp))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(s: &str) -> RawAmount {
        s.parse().unwrap()
    }

    #[test]
    fn test_large_amount_keeps_precision() {
        assert_eq!(
            format_units(raw("123456789012345678901234"), 18),
            "123456.789012"
        );
    }

    #[test]
    fn test_native_and_six_decimal_token() {
        assert_eq!(format_units(raw("2500000000000000000"), 18), "2.500000");
        assert_eq!(format_units(raw("5000000"), 6), "5.000000");
        assert_eq!(format_units(U256::ZERO, 18), "0.000000");
    }

    #[test]
    fn test_rounds_half_up_at_sixth_digit() {
        assert_eq!(format_units(raw("1234567500000"), 18), "0.000001");
        assert_eq!(format_units(raw("1000000499999999999"), 18), "1.000000");
        assert_eq!(format_units(raw("1000000500000000000"), 18), "1.000001");
        assert_eq!(format_units(raw("999999999999999999999"), 18), "1000.000000");
        // Dust stays visible as zero rather than disappearing.
        assert_eq!(format_units(raw("1"), 18), "0.000000");
    }

    #[test]
    fn test_small_exponents_are_padded() {
        assert_eq!(format_units(raw("12345"), 2), "123.450000");
        assert_eq!(format_units(raw("7"), 0), "7.000000");
        assert_eq!(format_units(raw("100000000"), 8), "1.000000");
    }

    #[test]
    fn test_huge_amounts_with_small_exponents_stay_exact() {
        assert_eq!(
            format_units(U256::MAX, 0),
            "115792089237316195423570985008687907853269984665640564039457584007913129639935.000000"
        );
        assert_eq!(
            format_units(U256::MAX, 2),
            "1157920892373161954235709850086879078532699846656405640394575840079131296399.350000"
        );
        assert_eq!(
            format_units(U256::MAX, 6),
            "115792089237316195423570985008687907853269984665640564039457584007913129.639935"
        );
    }

    #[test]
    fn test_oversized_exponent_formats_as_zero() {
        assert_eq!(format_units(U256::MAX, 255), "0.000000");
        assert_eq!(format_units(U256::MAX, 90), "0.000000");
    }

    #[test]
    fn test_report_serializes_in_wire_shape() {
        let report = WalletReport {
            address: "0x1111111111111111111111111111111111111111".to_string(),
            eth_balance: "2.500000".to_string(),
            token_balances: vec![TokenBalance {
                symbol: "USDC".to_string(),
                name: "USD Coin".to_string(),
                balance: "5.000000".to_string(),
                contract_address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
            }],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["eth_balance"], "2.500000");
        assert_eq!(json["token_balances"][0]["symbol"], "USDC");
        assert_eq!(json["token_balances"][0]["name"], "USD Coin");
        assert_eq!(json["token_balances"][0]["balance"], "5.000000");
        assert_eq!(
            json["token_balances"][0]["contract_address"],
            "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
        );
    }
}
