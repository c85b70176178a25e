//! Arcade V3 mainnet contract addresses, signing domain and supported currencies.

use alloy::primitives::{address, Address};

/// Origination controller (typed-data verifying contract)
pub const ORIGINATION_CONTROLLER: Address = address!("b7bfcca7d7ff0f371867b770856fac184b185878");

/// Vault factory; signed as the collateral address of every vault offer
pub const VAULT_FACTORY: Address = address!("269363665dbb1582b143099a3cb467e98a476d55");

/// Verifier contract evaluating collection-offer predicates
pub const COLLECTION_OFFER_VERIFIER: Address =
    address!("1b6e58aae43bfd2a435aa348f3328f3137dda544");

/// Typed-data domain name
pub const DOMAIN_NAME: &str = "OriginationController";

/// Typed-data domain version (protocol V3)
pub const DOMAIN_VERSION: &str = "3";

/// Ethereum mainnet
pub const CHAIN_ID: u64 = 1;

/// Protocol version string reported by the loans endpoint
pub const PROTOCOL_VERSION: &str = "3";

/// Loan state of an outstanding loan
pub const ACTIVE_LOAN_STATE: &str = "Active";

/// Decimal exponent of the prorated interest rate (10^22 = 100%)
pub const INTEREST_RATE_SCALE_EXP: u32 = 22;

/// Wire value of `collateralId` for collection offers
pub const COLLECTION_OFFER_COLLATERAL_ID: &str = "-1";

/// Zero bytes32, used for both `affiliateCode` and `extraData`
pub const ZERO_BYTES32: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

/// Bid lifetime presets offered to the operator, in minutes
pub const BID_LIFETIME_PRESETS: &[u64] = &[15, 30, 60, 120, 360, 720, 1440];

/// Supported payable currency definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub address: Address,
    pub decimals: u8,
    /// Symbol used to quote ETH in this currency on the rate oracle
    pub rate_symbol: &'static str,
}

/// Curated list of supported payable currencies
pub const SUPPORTED_CURRENCIES: &[Currency] = &[
    Currency {
        code: "ETH",
        address: address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
        decimals: 18,
        rate_symbol: "eth",
    },
    Currency {
        code: "USDC",
        address: address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
        decimals: 6,
        rate_symbol: "usd",
    },
    Currency {
        code: "DAI",
        address: address!("6b175474e89094c44da98b954eedeac495271d0f"),
        decimals: 18,
        rate_symbol: "dai",
    },
];
