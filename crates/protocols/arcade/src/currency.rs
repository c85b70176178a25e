//! Fixed-point conversion between human amounts and protocol integers.
//!
//! Conversions work on decimal strings and `BigUint` directly, never through
//! binary floating point, so 18-decimal amounts convert exactly.

use alloy::primitives::Address;
use lender_core::OfferError;
use num_bigint::BigUint;
use rust_decimal::Decimal;

use crate::constants::{Currency, SUPPORTED_CURRENCIES};

/// Look up a supported currency by code (case-insensitive)
pub fn find_by_code(code: &str) -> Result<&'static Currency, OfferError> {
    SUPPORTED_CURRENCIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
        .ok_or_else(|| OfferError::UnknownCurrency {
            currency: code.to_string(),
        })
}

/// Look up a supported currency by on-chain address (case-insensitive)
pub fn find_by_address(address: &str) -> Result<&'static Currency, OfferError> {
    let parsed: Address = address
        .trim()
        .parse()
        .map_err(|_| OfferError::UnknownCurrency {
            currency: address.to_string(),
        })?;

    SUPPORTED_CURRENCIES
        .iter()
        .find(|c| c.address == parsed)
        .ok_or_else(|| OfferError::UnknownCurrency {
            currency: address.to_string(),
        })
}

/// Display code for a payable currency address, "N/A" if unsupported
pub fn code_for_address(address: &str) -> &'static str {
    find_by_address(address).map(|c| c.code).unwrap_or("N/A")
}

fn ensure_registered(currency: &Currency) -> Result<(), OfferError> {
    if SUPPORTED_CURRENCIES.contains(currency) {
        Ok(())
    } else {
        Err(OfferError::UnknownCurrency {
            currency: currency.code.to_string(),
        })
    }
}

/// Convert a human decimal amount (e.g. "10.5") to protocol integer units.
///
/// Rejects negative values, malformed input, and amounts with more fractional
/// digits than the currency carries.
pub fn to_protocol_amount(human: &str, currency: &Currency) -> Result<BigUint, OfferError> {
    ensure_registered(currency)?;

    let invalid = |message: String| OfferError::InvalidAmount {
        field: "amount",
        message,
    };

    let trimmed = human.trim();
    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid(format!("{:?} is not a number", human)));
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid(format!("{:?} is not a non-negative decimal", human)));
    }

    let decimals = currency.decimals as usize;
    if frac_part.len() > decimals {
        return Err(invalid(format!(
            "{} has more than {} fractional digits for {}",
            human, decimals, currency.code
        )));
    }

    let digits = format!("{}{}{}", int_part, frac_part, "0".repeat(decimals - frac_part.len()));
    let digits = if digits.is_empty() { "0" } else { digits.as_str() };

    BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| invalid(format!("{:?} is not a number", human)))
}

/// Convert a rounded `Decimal` to protocol integer units
pub fn decimal_to_protocol(amount: Decimal, currency: &Currency) -> Result<BigUint, OfferError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(OfferError::InvalidAmount {
            field: "amount",
            message: format!("{} is negative", amount),
        });
    }
    to_protocol_amount(&amount.normalize().to_string(), currency)
}

/// Convert a protocol integer string to its canonical human decimal form.
///
/// Trailing fractional zeros are dropped, so "1500000" USDC renders as "1.5"
/// and "1000000" as "1".
pub fn to_human_amount(raw: &str, currency: &Currency) -> Result<String, OfferError> {
    ensure_registered(currency)?;

    let value = BigUint::parse_bytes(raw.trim().as_bytes(), 10).ok_or_else(|| {
        OfferError::InvalidAmount {
            field: "amount",
            message: format!("{:?} is not a protocol integer", raw),
        }
    })?;

    Ok(format_units(&value, currency.decimals))
}

/// Render an integer amount with `decimals` implied fractional digits
pub fn format_units(value: &BigUint, decimals: u8) -> String {
    let decimals = decimals as usize;
    let digits = value.to_str_radix(10);
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdc() -> &'static Currency {
        find_by_code("usdc").unwrap()
    }

    fn eth() -> &'static Currency {
        find_by_code("ETH").unwrap()
    }

    #[test]
    fn test_lookup_by_code_and_address() {
        assert_eq!(usdc().decimals, 6);
        let by_addr = find_by_address("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48").unwrap();
        assert_eq!(by_addr.code, "USDC");
        assert_eq!(code_for_address("0x0000000000000000000000000000000000000001"), "N/A");
    }

    #[test]
    fn test_unknown_currency() {
        assert!(matches!(
            find_by_code("BTC"),
            Err(OfferError::UnknownCurrency { .. })
        ));

        let rogue = Currency {
            code: "FAKE",
            address: Address::ZERO,
            decimals: 6,
            rate_symbol: "usd",
        };
        assert!(matches!(
            to_protocol_amount("1", &rogue),
            Err(OfferError::UnknownCurrency { .. })
        ));
    }

    #[test]
    fn test_to_protocol_amount() {
        assert_eq!(to_protocol_amount("10", usdc()).unwrap(), BigUint::from(10_000_000u64));
        assert_eq!(to_protocol_amount("10.5", usdc()).unwrap(), BigUint::from(10_500_000u64));
        assert_eq!(to_protocol_amount(".25", usdc()).unwrap(), BigUint::from(250_000u64));
        assert_eq!(
            to_protocol_amount("1.000000000000000001", eth()).unwrap(),
            BigUint::parse_bytes(b"1000000000000000001", 10).unwrap()
        );
    }

    #[test]
    fn test_to_protocol_amount_beyond_u64() {
        let raw = to_protocol_amount("123456789.123456789123456789", eth()).unwrap();
        assert_eq!(raw.to_string(), "123456789123456789123456789");
    }

    #[test]
    fn test_to_protocol_amount_rejects_bad_input() {
        assert!(to_protocol_amount("-1", usdc()).is_err());
        assert!(to_protocol_amount("1.0000001", usdc()).is_err());
        assert!(to_protocol_amount("abc", usdc()).is_err());
        assert!(to_protocol_amount("", usdc()).is_err());
        assert!(to_protocol_amount("1e6", usdc()).is_err());
    }

    #[test]
    fn test_to_human_amount() {
        assert_eq!(to_human_amount("10500000", usdc()).unwrap(), "10.5");
        assert_eq!(to_human_amount("1000000", usdc()).unwrap(), "1");
        assert_eq!(to_human_amount("1", usdc()).unwrap(), "0.000001");
        assert_eq!(to_human_amount("0", eth()).unwrap(), "0");
        assert!(to_human_amount("1.5", usdc()).is_err());
    }

    #[test]
    fn test_round_trip_within_precision() {
        let cases = [
            ("0.000001", "USDC"),
            ("42", "USDC"),
            ("1234.56789", "USDC"),
            ("0.000000000000000001", "ETH"),
            ("3.14159265358979323", "ETH"),
            ("987654321.5", "DAI"),
        ];
        for (human, code) in cases {
            let currency = find_by_code(code).unwrap();
            let raw = to_protocol_amount(human, currency).unwrap();
            let back = to_human_amount(&raw.to_string(), currency).unwrap();
            assert_eq!(back, human, "{} {}", human, code);
        }
    }

    #[test]
    fn test_decimal_to_protocol() {
        let amount: Decimal = "2.50".parse().unwrap();
        assert_eq!(decimal_to_protocol(amount, usdc()).unwrap(), BigUint::from(2_500_000u64));
        assert!(decimal_to_protocol(Decimal::NEGATIVE_ONE, usdc()).is_err());
    }
}
