//! Loan scan state types

use arcade_client::ApiLoan;
use lender_core::constants::SECONDS_PER_DAY;
use lender_core::UnixSeconds;
use serde::{Deserialize, Serialize};

/// An active loan with derived maturity data and optional market prices
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedLoan {
    #[serde(flatten)]
    pub loan: ApiLoan,
    /// `startDate + durationSecs`
    pub due_date: UnixSeconds,
    pub duration_days: f64,
    pub is_vault: bool,
    /// Collection floor ask in ETH, `None` when unavailable
    pub floor_price: Option<f64>,
    /// Collection top bid in ETH, `None` when unavailable
    pub highest_bid: Option<f64>,
}

impl EnhancedLoan {
    /// Derive maturity data from an API loan.
    ///
    /// Returns `None` when the start date or duration is not an integer.
    pub fn from_loan(loan: ApiLoan) -> Option<Self> {
        let start_date: u64 = loan.start_date.trim().parse().ok()?;
        let duration_secs: u64 = loan.duration_secs.trim().parse().ok()?;
        let due_date = start_date.checked_add(duration_secs)?;
        let is_vault = loan.vault_address.is_some();

        Some(Self {
            loan,
            due_date,
            duration_days: duration_secs as f64 / SECONDS_PER_DAY as f64,
            is_vault,
            floor_price: None,
            highest_bid: None,
        })
    }

    pub fn loan_id(&self) -> &str {
        &self.loan.loan_id
    }

    /// Collection address used as the oracle key
    pub fn collection(&self) -> &str {
        &self.loan.collateral_address
    }

    /// Label shown in reports
    pub fn kind_label(&self) -> &'static str {
        if self.is_vault {
            "vault"
        } else {
            "asset"
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn api_loan(loan_id: &str, start_date: u64, duration_secs: u64, vault: bool) -> ApiLoan {
        ApiLoan {
            loan_id: loan_id.to_string(),
            state: "Active".to_string(),
            protocol_version: "3".to_string(),
            start_date: start_date.to_string(),
            duration_secs: duration_secs.to_string(),
            principal: "10000000".to_string(),
            interest_rate: "500000000000000000000".to_string(),
            payable_currency: "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".to_string(),
            collateral_address: "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d".to_string(),
            collateral_id: Some("7721".to_string()),
            collateral_kind: "ERC721".to_string(),
            vault_address: vault.then(|| "0x5a1b2c3d4e5f60718293a4b5c6d7e8f901234567".to_string()),
        }
    }
}
