//! Configuration types for Arcade Lender

use serde::{Deserialize, Serialize};

use crate::Error;

/// Order-book API connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API base URL (e.g., "https://api.arcade.xyz")
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Value of the `x-api-key` header
    #[serde(default)]
    pub api_key: String,

    /// Account the offers are posted under
    #[serde(default)]
    pub account_id: String,
}

fn default_api_base_url() -> String {
    "https://api.arcade.xyz".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            api_key: String::new(),
            account_id: String::new(),
        }
    }
}

/// Price oracle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Collection price oracle base URL
    #[serde(default = "default_oracle_base_url")]
    pub base_url: String,

    /// Oracle API key (separate from the order-book key)
    #[serde(default)]
    pub api_key: String,

    /// ETH exchange rate API base URL
    #[serde(default = "default_rates_url")]
    pub rates_url: String,
}

fn default_oracle_base_url() -> String {
    "https://api.reservoir.tools".to_string()
}

fn default_rates_url() -> String {
    "https://api.coingecko.com".to_string()
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_oracle_base_url(),
            api_key: String::new(),
            rates_url: default_rates_url(),
        }
    }
}

/// Loan scan and listing filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Horizon for due-soon loans, in hours
    #[serde(default = "default_due_soon_hours")]
    pub due_soon_hours: u64,

    /// Listings below this id are ignored
    #[serde(default)]
    pub min_listing_id: u64,

    /// Fixed pause between enriched loans, in milliseconds
    #[serde(default = "default_enrich_delay_ms")]
    pub enrich_delay_ms: u64,
}

fn default_due_soon_hours() -> u64 {
    48
}

fn default_enrich_delay_ms() -> u64 {
    500
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            due_soon_hours: default_due_soon_hours(),
            min_listing_id: 0,
            enrich_delay_ms: default_enrich_delay_ms(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Order-book API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Price oracle settings
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Scan settings
    #[serde(default)]
    pub scan: ScanConfig,
}

impl AppConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from a variable lookup, falling back to defaults
    /// for anything unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();

        if let Some(url) = lookup("ARCADE_API_BASE_URL") {
            config.api.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(key) = lookup("ARCADE_API_KEY") {
            config.api.api_key = key;
        }
        if let Some(account) = lookup("ACCOUNT_ID") {
            config.api.account_id = account;
        }
        if let Some(key) = lookup("RESERVOIR_API") {
            config.oracle.api_key = key;
        }
        if let Some(hours) = lookup("DUE_SOON") {
            config.scan.due_soon_hours = parse_var("DUE_SOON", &hours)?;
        }
        if let Some(min_id) = lookup("MIN_LISTING_ID") {
            config.scan.min_listing_id = parse_var("MIN_LISTING_ID", &min_id)?;
        }

        Ok(config)
    }
}

fn parse_var(name: &str, value: &str) -> Result<u64, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} is not a valid number: {:?}", name, value)))
}
