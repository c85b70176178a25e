//! Core type definitions for Arcade Lender

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the loan signs the terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Borrower,
    Lender,
}

impl Side {
    /// Value of the `side` field in signed loan terms
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Borrower => 0,
            Self::Lender => 1,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::Borrower => Role::Borrower,
            Self::Lender => Role::Lender,
        }
    }
}

/// Role reported to the order book alongside a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Borrower,
    Lender,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Borrower => "borrower",
            Self::Lender => "lender",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Offer kind as understood by the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferKind {
    /// Extension offer on an existing loan
    Loan,
    /// Single listed asset
    Asset,
    /// Vault wrapping one or more assets
    Vault,
    /// Collection-wide offer
    Collection,
}

impl OfferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loan => "loan",
            Self::Asset => "asset",
            Self::Vault => "vault",
            Self::Collection => "collection",
        }
    }
}

impl fmt::Display for OfferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// UNIX timestamp in seconds
pub type UnixSeconds = u64;

/// Constants
pub mod constants {
    /// Seconds in one day
    pub const SECONDS_PER_DAY: u64 = 86_400;

    pub const SECONDS_PER_MINUTE: u64 = 60;

    /// Seconds in one hour
    pub const SECONDS_PER_HOUR: u64 = 3_600;

    /// Days used to annualize rates
    pub const DAYS_PER_YEAR: u64 = 365;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_encoding() {
        assert_eq!(Side::Borrower.as_u8(), 0);
        assert_eq!(Side::Lender.as_u8(), 1);
        assert_eq!(Side::Lender.role(), Role::Lender);
    }

    #[test]
    fn test_offer_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&OfferKind::Collection).unwrap(),
            "\"collection\""
        );
        assert_eq!(OfferKind::Vault.as_str(), "vault");
        assert_eq!(Role::Borrower.to_string(), "borrower");
    }
}
