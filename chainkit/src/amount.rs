//! Decimal amount parsing, fixed-point formatting and integer scaling

use std::str::FromStr;

use ethers_core::types::U256;
use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Parse a non-negative decimal amount
pub fn parse_amount(amount: &str) -> Result<Decimal> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidAmount("amount is empty".to_string()));
    }

    let value = Decimal::from_str(trimmed)
        .map_err(|_| Error::InvalidAmount(format!("'{}' is not a number", trimmed)))?;
    if value < Decimal::ZERO {
        return Err(Error::InvalidAmount(format!("'{}' is negative", trimmed)));
    }

    Ok(value)
}

/// Format `amount` with exactly `places` fractional digits.
///
/// Amounts carrying more precision than `places` are rejected rather than rounded.
pub fn format_fixed(amount: &str, places: u32) -> Result<String> {
    let mut value = parse_amount(amount)?;
    value = value.normalize();
    if value.scale() > places {
        return Err(Error::InvalidAmount(format!(
            "'{}' has more than {} decimal places",
            amount.trim(),
            places
        )));
    }

    value.rescale(places);
    Ok(value.to_string())
}

/// `floor(amount * 10^decimals)` as an unsigned 256-bit integer
pub fn scale_amount(amount: &str, decimals: u32) -> Result<U256> {
    let value = parse_amount(amount)?;

    let mantissa = u128::try_from(value.mantissa())
        .map_err(|_| Error::InvalidAmount(format!("'{}' is negative", amount.trim())))?;
    let factor = pow10(decimals)
        .ok_or_else(|| Error::InvalidAmount(format!("{} decimals exceed 256 bits", decimals)))?;
    let numerator = U256::from(mantissa)
        .checked_mul(factor)
        .ok_or_else(|| Error::InvalidAmount(format!("'{}' overflows", amount.trim())))?;

    // scale is at most 28
    Ok(numerator / U256::exp10(value.scale() as usize))
}

fn pow10(exponent: u32) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(exponent))
}

/// Parse a non-negative integer (token ids, raw quantities)
pub fn parse_integer(value: &str) -> Result<U256> {
    let trimmed = value.trim();
    U256::from_dec_str(trimmed)
        .map_err(|_| Error::InvalidArgument(format!("'{}' is not an unsigned integer", trimmed)))
}

/// `0x` prefixed lowercase hex
pub fn to_hex(value: U256) -> String {
    format!("{:#x}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed("1.23456789", 8).unwrap(), "1.23456789");
        assert_eq!(format_fixed("1", 8).unwrap(), "1.00000000");
        assert_eq!(format_fixed("0.5000000000", 8).unwrap(), "0.50000000");
        assert!(matches!(format_fixed("1.234567891", 8), Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn test_rejects_bad_amounts() {
        assert!(matches!(parse_amount("-1"), Err(Error::InvalidAmount(_))));
        assert!(matches!(parse_amount("abc"), Err(Error::InvalidAmount(_))));
        assert!(matches!(parse_amount(""), Err(Error::InvalidAmount(_))));
        assert!(parse_amount("0").is_ok());
    }

    #[test]
    fn test_scale_amount_floors() {
        assert_eq!(scale_amount("1.5", 6).unwrap(), U256::from(1_500_000u64));
        assert_eq!(scale_amount("0.0000001", 6).unwrap(), U256::zero());
        assert_eq!(scale_amount("1.23456789", 2).unwrap(), U256::from(123u64));
        assert_eq!(
            scale_amount("2", 18).unwrap(),
            U256::from_dec_str("2000000000000000000").unwrap()
        );
    }

    #[test]
    fn test_scale_amount_rejects_oversized_decimals() {
        assert!(scale_amount("1", 77).is_ok());
        assert!(matches!(scale_amount("1", 78), Err(Error::InvalidAmount(_))));
        assert!(matches!(scale_amount("1", 255), Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(U256::from(255u64)), "0xff");
        assert_eq!(to_hex(U256::zero()), "0x0");
    }
}
