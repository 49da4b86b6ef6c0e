use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::BigDecimal;
use ethers::types::U256;
use serde::Serializer;

use crate::models::{EngineError, Result};

/// Fixed-point precision of STBL-family tokens.
pub const TOKEN_DECIMALS: i64 = 18;

/// Convert an on-chain integer amount into an exact decimal.
pub fn format_units(raw: U256, decimals: i64) -> BigDecimal {
    let mut bytes = [0u8; 32];
    raw.to_big_endian(&mut bytes);
    BigDecimal::new(BigInt::from_bytes_be(Sign::Plus, &bytes), decimals)
}

/// Parse an integer amount as reported by the subgraph (`"1500000000000000000"`).
pub fn parse_units(raw: &str, decimals: i64) -> Result<BigDecimal> {
    let value: BigInt = raw
        .trim()
        .parse()
        .map_err(|_| EngineError::InvalidAmount(raw.to_string()))?;

    if value.sign() == Sign::Minus {
        return Err(EngineError::InvalidAmount(raw.to_string()));
    }

    Ok(BigDecimal::new(value, decimals))
}

/// Render an amount in plain notation without trailing zeros: `"15"`,
/// `"0.000000000000000001"`. Never uses an exponent.
pub fn to_plain_string(value: &BigDecimal) -> String {
    let (int, scale) = value.normalized().as_bigint_and_exponent();
    let mut digits = int.magnitude().to_string();

    if scale <= 0 {
        if digits != "0" {
            digits.push_str(&"0".repeat(scale.unsigned_abs() as usize));
        }
    } else {
        let scale = scale as usize;
        if digits.len() <= scale {
            digits = format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits);
        }
        digits.insert(digits.len() - scale, '.');
    }

    match int.sign() {
        Sign::Minus => format!("-{}", digits),
        _ => digits,
    }
}

/// `serialize_with` helper for published amounts.
pub fn serialize_amount<S>(value: &BigDecimal, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_plain_string(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_units() {
        let raw = U256::from_dec_str("1500000000000000000").unwrap();
        assert_eq!(format_units(raw, 18), BigDecimal::from_str("1.5").unwrap());
        assert_eq!(format_units(U256::zero(), 18), BigDecimal::from(0));
    }

    #[test]
    fn test_format_units_keeps_full_precision() {
        let raw = U256::from_dec_str("123456789012345678901234567890123").unwrap();
        assert_eq!(
            format_units(raw, 18),
            BigDecimal::from_str("123456789012345.678901234567890123").unwrap()
        );
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(
            parse_units("10000000000000000000", 18).unwrap(),
            BigDecimal::from(10)
        );
        assert!(parse_units("-1", 18).is_err());
        assert!(parse_units("1.5", 18).is_err());
        assert!(parse_units("", 18).is_err());
    }

    #[test]
    fn test_plain_string_drops_scale_and_exponent() {
        let one_wei = parse_units("1", TOKEN_DECIMALS).unwrap();
        assert_eq!(to_plain_string(&one_wei), "0.000000000000000001");

        let fifteen = parse_units("10000000000000000000", TOKEN_DECIMALS).unwrap()
            + parse_units("5000000000000000000", TOKEN_DECIMALS).unwrap();
        assert_eq!(to_plain_string(&fifteen), "15");

        let small = parse_units("1200000000000", TOKEN_DECIMALS).unwrap();
        assert_eq!(to_plain_string(&small), "0.0000012");

        assert_eq!(to_plain_string(&format_units(wei_1000(), TOKEN_DECIMALS)), "1000");
        assert_eq!(to_plain_string(&BigDecimal::from(0)), "0");
        assert_eq!(to_plain_string(&BigDecimal::from_str("-2.50").unwrap()), "-2.5");
    }

    fn wei_1000() -> U256 {
        U256::from(1_000u64) * U256::exp10(18)
    }
}
