//! arcade-client: HTTP clients for the Arcade order book and price oracles
//!
//! Every request goes through [`timed_request`] so a stalled upstream surfaces
//! as [`ApiError::Unreachable`] instead of hanging a scan or an offer round.

pub mod oracle;
pub mod types;

use lender_core::{ApiConfig, ApiError};
use serde::de::DeserializeOwned;

/// Default timeout for upstream API calls (30 seconds).
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Header carrying API keys for both the order book and the oracle
pub(crate) const API_KEY_HEADER: &str = "x-api-key";

pub use oracle::OracleClient;
pub use types::{
    ApiCollection, ApiListing, ApiLoan, LoanTermsSubmission, WireLoanTerms, WirePredicate,
};

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Order-book API client
#[derive(Clone)]
pub struct ArcadeClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ArcadeClient {
    /// Create a new client for the given API configuration
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = build_http_client(&config.base_url)?;
        Ok(Self { http, config })
    }

    /// Get the current API configuration
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetch all loans (single call, no pagination)
    pub async fn get_loans(&self) -> Result<Vec<ApiLoan>> {
        self.get_records("loans").await
    }

    /// Fetch all open lend listings
    pub async fn get_listings(&self) -> Result<Vec<ApiListing>> {
        self.get_records("lend").await
    }

    /// Fetch all collections known to the order book
    pub async fn get_collections(&self) -> Result<Vec<ApiCollection>> {
        self.get_records("collections").await
    }

    /// Post signed loan terms to the order book.
    ///
    /// Any non-2xx response becomes [`ApiError::SubmissionRejected`] with the
    /// response body kept verbatim. No retry is attempted.
    pub async fn submit_loan_terms(
        &self,
        submission: &LoanTermsSubmission,
    ) -> Result<serde_json::Value> {
        let url = format!(
            "{}/api/v2/accounts/{}/loanterms/",
            self.config.base_url, self.config.account_id
        );

        tracing::debug!(
            url = %url,
            kind = %submission.kind,
            nonce = %submission.nonce,
            "Posting loan terms"
        );

        let response = timed_request(
            &url,
            self.http
                .post(&url)
                .header(API_KEY_HEADER, &self.config.api_key)
                .json(submission)
                .send(),
        )
        .await?;

        let status = response.status();
        let body = timed_request(&url, response.text()).await?;

        if !status.is_success() {
            return Err(ApiError::SubmissionRejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(status = status.as_u16(), "Loan terms accepted");

        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body)))
    }

    /// Fetch a JSON array, keeping every entry that decodes as `T`
    async fn get_records<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>> {
        let records: Vec<serde_json::Value> = self.get_json(endpoint).await?;
        Ok(types::decode_records(endpoint, records))
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}/api/v2/{}", self.config.base_url, endpoint);
        tracing::debug!(url = %url, "Making API request");

        let response = timed_request(
            &url,
            self.http
                .get(&url)
                .header(API_KEY_HEADER, &self.config.api_key)
                .send(),
        )
        .await?;

        tracing::debug!(status = response.status().as_u16(), "Received API response");
        read_json(&url, response).await
    }
}

/// Build the shared reqwest client
pub(crate) fn build_http_client(url: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("arcade-lender")
        .build()
        .map_err(|e| ApiError::Unreachable {
            url: url.to_string(),
            reason: format!("failed to build HTTP client: {}", e),
        })
}

/// Check status and decode a JSON body
pub(crate) async fn read_json<T: DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    let body = timed_request(url, response.text()).await?;

    if !status.is_success() {
        return Err(ApiError::UnexpectedStatus {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| ApiError::ParseError {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Wrap an upstream call with a timeout.
///
/// Both elapsed timeouts and transport errors map to `Unreachable`.
pub(crate) async fn timed_request<T>(
    url: &str,
    fut: impl std::future::Future<Output = std::result::Result<T, reqwest::Error>>,
) -> Result<T> {
    tokio::time::timeout(REQUEST_TIMEOUT, fut)
        .await
        .map_err(|_| ApiError::Unreachable {
            url: url.to_string(),
            reason: format!("request timed out after {}s", REQUEST_TIMEOUT.as_secs()),
        })?
        .map_err(|e| ApiError::Unreachable {
            url: url.to_string(),
            reason: e.to_string(),
        })
}
