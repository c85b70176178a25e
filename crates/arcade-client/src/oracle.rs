//! Collection price oracle and ETH exchange rate client
//!
//! Collection prices are quoted in ETH. A missing or non-numeric `price`
//! field is not an error: it comes back as `None` so callers can degrade.

use lender_core::{ApiError, OracleConfig};

use crate::{build_http_client, read_json, timed_request, Result, API_KEY_HEADER};

const FLOOR_ASK_PATH: &str = "/oracle/collections/floor-ask/v6";
const TOP_BID_PATH: &str = "/oracle/collections/top-bid/v3";
const SIMPLE_PRICE_PATH: &str = "/api/v3/simple/price";

/// Price oracle client
#[derive(Clone)]
pub struct OracleClient {
    http: reqwest::Client,
    config: OracleConfig,
}

impl OracleClient {
    pub fn new(config: OracleConfig) -> Result<Self> {
        let http = build_http_client(&config.base_url)?;
        Ok(Self { http, config })
    }

    /// Current floor ask for a collection, in ETH
    pub async fn floor_price(&self, collection: &str) -> Result<Option<f64>> {
        self.collection_price(FLOOR_ASK_PATH, collection).await
    }

    /// Current top bid for a collection, in ETH
    pub async fn top_bid(&self, collection: &str) -> Result<Option<f64>> {
        self.collection_price(TOP_BID_PATH, collection).await
    }

    /// Price of one ETH in the currency identified by `vs_symbol`
    /// (`eth`, `usd`, `dai`).
    pub async fn eth_rate(&self, vs_symbol: &str) -> Result<f64> {
        let url = format!("{}{}", self.config.rates_url, SIMPLE_PRICE_PATH);

        let response = timed_request(
            &url,
            self.http
                .get(&url)
                .query(&[("ids", "ethereum"), ("vs_currencies", vs_symbol)])
                .send(),
        )
        .await?;

        let json: serde_json::Value = read_json(&url, response).await?;
        parse_eth_rate(&json, vs_symbol).ok_or_else(|| ApiError::ParseError {
            url,
            reason: format!("no ethereum/{} rate in response", vs_symbol),
        })
    }

    async fn collection_price(&self, path: &str, collection: &str) -> Result<Option<f64>> {
        let url = format!("{}{}", self.config.base_url, path);

        let response = timed_request(
            &url,
            self.http
                .get(&url)
                .header("accept", "*/*")
                .header(API_KEY_HEADER, &self.config.api_key)
                .query(&[("collection", collection)])
                .send(),
        )
        .await?;

        let json: serde_json::Value = read_json(&url, response).await?;
        let price = parse_price(&json);
        if price.is_none() {
            tracing::debug!(collection = %collection, path = %path, "Oracle returned no price");
        }
        Ok(price)
    }
}

/// Extract a usable `price` number from an oracle response
pub fn parse_price(json: &serde_json::Value) -> Option<f64> {
    json.get("price")
        .and_then(|p| p.as_f64())
        .filter(|p| p.is_finite())
}

fn parse_eth_rate(json: &serde_json::Value, vs_symbol: &str) -> Option<f64> {
    json.get("ethereum")
        .and_then(|e| e.get(vs_symbol))
        .and_then(|r| r.as_f64())
        .filter(|r| r.is_finite() && *r > 0.0)
}
