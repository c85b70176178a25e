//! Offer economics: principal, prorated interest rate, repayment and APR.
//!
//! Human-side arithmetic (LTV, APR, duration) runs on `Decimal` and is rounded
//! to the currency precision before conversion. Everything at protocol scale
//! runs on `BigUint` with truncating division, matching the contract.

use lender_core::constants::{DAYS_PER_YEAR, SECONDS_PER_DAY};
use lender_core::OfferError;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{Currency, INTEREST_RATE_SCALE_EXP};
use crate::currency::{decimal_to_protocol, to_protocol_amount};

fn pow10(exp: u32) -> BigUint {
    BigUint::from(10u32).pow(exp)
}

/// LTV must lie strictly between 0 and 100 percent
pub fn validate_ltv(ltv: Decimal) -> Result<(), OfferError> {
    if ltv > Decimal::ZERO && ltv < Decimal::ONE_HUNDRED {
        Ok(())
    } else {
        Err(OfferError::InvalidLtv {
            value: ltv.to_string(),
        })
    }
}

/// APR must lie strictly between 0 and 100 percent
pub fn validate_apr(apr: Decimal) -> Result<(), OfferError> {
    if apr > Decimal::ZERO && apr < Decimal::ONE_HUNDRED {
        Ok(())
    } else {
        Err(OfferError::InvalidApr {
            value: apr.to_string(),
        })
    }
}

/// Loan duration must be at least one day and fit `durationSecs`
pub fn validate_duration_days(days: i64) -> Result<(), OfferError> {
    if days > 0 {
        days_to_seconds(days).map(|_| ())
    } else {
        Err(OfferError::InvalidDuration { days })
    }
}

/// Whole days as seconds. A `u64` result always fits the uint96
/// `durationSecs` field.
pub fn days_to_seconds(days: i64) -> Result<u64, OfferError> {
    u64::try_from(days)
        .ok()
        .and_then(|d| d.checked_mul(SECONDS_PER_DAY))
        .ok_or(OfferError::InvalidDuration { days })
}

fn round_to_currency(amount: Decimal, currency: &Currency) -> Decimal {
    amount.round_dp_with_strategy(currency.decimals as u32, RoundingStrategy::MidpointAwayFromZero)
}

/// Offer amount as a fraction of the collateral value, rounded half away
/// from zero to the currency precision.
pub fn principal_from_ltv(
    value_in_quote: Decimal,
    ltv: Decimal,
    currency: &Currency,
) -> Result<Decimal, OfferError> {
    validate_ltv(ltv)?;
    let raw = value_in_quote
        .checked_mul(ltv)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| OfferError::InvalidAmount {
            field: "principal",
            message: format!("{} * {}% overflows", value_in_quote, ltv),
        })?;
    Ok(round_to_currency(raw, currency))
}

/// `principal * (1 + apr/100 * days/365)`, rounded to the currency precision
pub fn repayment_from_apr(
    principal: Decimal,
    apr: Decimal,
    duration_days: i64,
    currency: &Currency,
) -> Result<Decimal, OfferError> {
    validate_apr(apr)?;
    validate_duration_days(duration_days)?;

    let overflow = || OfferError::InvalidAmount {
        field: "repayment",
        message: format!("{} at {}% for {} days overflows", principal, apr, duration_days),
    };

    let prorated = apr
        .checked_mul(Decimal::from(duration_days))
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED * Decimal::from(DAYS_PER_YEAR)))
        .ok_or_else(overflow)?;
    let repayment = principal
        .checked_mul(Decimal::ONE + prorated)
        .ok_or_else(overflow)?;

    Ok(round_to_currency(repayment, currency))
}

/// Prorated interest rate: `(repayment - principal) * 10^22 / principal`,
/// truncated.
pub fn calculate_interest_rate(
    principal: &BigUint,
    repayment: &BigUint,
) -> Result<BigUint, OfferError> {
    if principal.is_zero() {
        return Err(OfferError::InvalidAmount {
            field: "principal",
            message: "principal must be positive".to_string(),
        });
    }
    if repayment <= principal {
        return Err(OfferError::RepaymentNotGreaterThanPrincipal {
            principal: principal.to_string(),
            repayment: repayment.to_string(),
        });
    }

    Ok((repayment - principal) * pow10(INTEREST_RATE_SCALE_EXP) / principal)
}

/// Repayment the contract derives from a principal and prorated rate
pub fn calculate_repayment_amount(principal: &BigUint, interest_rate: &BigUint) -> BigUint {
    principal + principal * interest_rate / pow10(INTEREST_RATE_SCALE_EXP)
}

/// Annualized rate estimate for display, in percent with two decimals.
///
/// Only ever shown to the operator; never part of a signed payload.
pub fn calculate_apr(
    principal: &BigUint,
    repayment: &BigUint,
    duration_secs: u64,
) -> Result<Decimal, OfferError> {
    let duration_days = duration_secs / SECONDS_PER_DAY;
    if duration_days == 0 {
        return Err(OfferError::InvalidDuration {
            days: duration_days as i64,
        });
    }
    if principal.is_zero() {
        return Err(OfferError::InvalidAmount {
            field: "principal",
            message: "principal must be positive".to_string(),
        });
    }
    if repayment < principal {
        return Err(OfferError::RepaymentNotGreaterThanPrincipal {
            principal: principal.to_string(),
            repayment: repayment.to_string(),
        });
    }

    let initial_ratio = (repayment - principal) * pow10(8) / principal;
    let daily_rate = initial_ratio / BigUint::from(duration_days);
    // hundredths of a percent
    let apr_bps = daily_rate * BigUint::from(DAYS_PER_YEAR * 100) / pow10(6);

    let apr_bps = apr_bps.to_i64().ok_or_else(|| OfferError::InvalidAmount {
        field: "apr",
        message: "estimated APR out of range".to_string(),
    })?;

    Ok(Decimal::new(apr_bps, 2))
}

/// Prorated interest rate rendered as a percentage (10^20 = 1%)
pub fn interest_rate_percent(interest_rate: &BigUint) -> Decimal {
    let hundredths = interest_rate / pow10(INTEREST_RATE_SCALE_EXP - 4);
    hundredths
        .to_i64()
        .map(|h| Decimal::new(h, 2))
        .unwrap_or(Decimal::MAX)
}

/// Fully derived economics of one offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferEconomics {
    pub principal: BigUint,
    pub repayment: BigUint,
    pub interest_rate: BigUint,
    pub duration_secs: u64,
    pub apr_estimate: Decimal,
}

impl OfferEconomics {
    /// Economics from operator-entered principal and repayment (human units)
    pub fn from_amounts(
        principal: &str,
        repayment: &str,
        duration_days: i64,
        currency: &Currency,
    ) -> Result<Self, OfferError> {
        validate_duration_days(duration_days)?;
        let principal = to_protocol_amount(principal, currency)?;
        let repayment = to_protocol_amount(repayment, currency)?;
        Self::from_protocol(principal, repayment, duration_days)
    }

    /// Economics for a collection offer: LTV of the collateral value at a
    /// fixed APR.
    pub fn from_ltv(
        value_in_quote: Decimal,
        ltv: Decimal,
        apr: Decimal,
        duration_days: i64,
        currency: &Currency,
    ) -> Result<Self, OfferError> {
        validate_duration_days(duration_days)?;
        let principal_human = principal_from_ltv(value_in_quote, ltv, currency)?;
        let repayment_human = repayment_from_apr(principal_human, apr, duration_days, currency)?;

        let principal = decimal_to_protocol(principal_human, currency)?;
        let repayment = decimal_to_protocol(repayment_human, currency)?;
        Self::from_protocol(principal, repayment, duration_days)
    }

    fn from_protocol(
        principal: BigUint,
        repayment: BigUint,
        duration_days: i64,
    ) -> Result<Self, OfferError> {
        let interest_rate = calculate_interest_rate(&principal, &repayment)?;
        let duration_secs = days_to_seconds(duration_days)?;
        let apr_estimate = calculate_apr(&principal, &repayment, duration_secs)?;

        Ok(Self {
            principal,
            repayment,
            interest_rate,
            duration_secs,
            apr_estimate,
        })
    }
}
