//! Wire types for the order-book API
//!
//! The API is loose about number encoding: ids and amounts arrive either as
//! JSON strings or JSON numbers depending on the endpoint. Everything that
//! can be large is normalised to a `String` here and parsed by the caller.

use lender_core::{OfferKind, Role};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Loan record from `GET /api/v2/loans`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLoan {
    #[serde(deserialize_with = "string_or_number")]
    pub loan_id: String,
    pub state: String,
    #[serde(deserialize_with = "string_or_number")]
    pub protocol_version: String,
    #[serde(deserialize_with = "string_or_number")]
    pub start_date: String,
    #[serde(deserialize_with = "string_or_number")]
    pub duration_secs: String,
    #[serde(deserialize_with = "string_or_number")]
    pub principal: String,
    #[serde(deserialize_with = "string_or_number")]
    pub interest_rate: String,
    pub payable_currency: String,
    #[serde(default)]
    pub collateral_address: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub collateral_id: Option<String>,
    #[serde(default)]
    pub collateral_kind: String,
    #[serde(default)]
    pub vault_address: Option<String>,
}

/// Listing record from `GET /api/v2/lend`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiListing {
    pub listing_id: u64,
    pub collateral_address: String,
    #[serde(deserialize_with = "string_or_number")]
    pub collateral_id: String,
    #[serde(default)]
    pub vault: Option<String>,
}

/// Collection record from `GET /api/v2/collections`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCollection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_verified: bool,
}

/// Body of `POST /api/v2/accounts/{accountId}/loanterms/`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTermsSubmission {
    pub loan_terms: WireLoanTerms,
    pub collection_id: String,
    pub signature: String,
    pub extra_data: String,
    pub nonce: String,
    pub kind: OfferKind,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_predicates: Option<Vec<WirePredicate>>,
}

/// Loan terms as posted to the order book
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLoanTerms {
    pub duration_secs: u64,
    pub principal: String,
    pub prorated_interest_rate: String,
    pub collateral_address: String,
    pub collateral_id: String,
    pub payable_currency: String,
    pub deadline: String,
    pub affiliate_code: String,
}

/// Collateral predicate as posted to the order book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePredicate {
    pub data: String,
    pub verifier: String,
}

/// Decode a record list one entry at a time, dropping malformed entries.
///
/// A single legacy or half-populated record must not fail the whole list.
pub fn decode_records<T: DeserializeOwned>(url: &str, records: Vec<serde_json::Value>) -> Vec<T> {
    let total = records.len();
    let decoded: Vec<T> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(url = %url, index = index, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect();

    if decoded.len() < total {
        tracing::debug!(url = %url, total = total, kept = decoded.len(), "Dropped records");
    }
    decoded
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string, number or null, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_accepts_mixed_number_encoding() {
        let json = r#"{
            "loanId": 4812,
            "state": "Active",
            "protocolVersion": "3",
            "startDate": 1718000000,
            "durationSecs": "2592000",
            "principal": "1500000000000000000",
            "interestRate": "82191780821917808219",
            "payableCurrency": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
            "collateralAddress": "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d",
            "collateralId": 7721,
            "collateralKind": "ERC721",
            "vaultAddress": null
        }"#;

        let loan: ApiLoan = serde_json::from_str(json).unwrap();
        assert_eq!(loan.loan_id, "4812");
        assert_eq!(loan.start_date, "1718000000");
        assert_eq!(loan.collateral_id.as_deref(), Some("7721"));
        assert!(loan.vault_address.is_none());
    }

    #[test]
    fn test_decode_records_skips_null_fields() {
        let json = r#"[
            {"loanId": "1", "state": "Active", "protocolVersion": "3",
             "startDate": 1718000000, "durationSecs": 2592000,
             "principal": "1000", "interestRate": "10",
             "payableCurrency": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"},
            {"loanId": "2", "state": "Repaid", "protocolVersion": "2",
             "startDate": null, "durationSecs": null, "principal": null,
             "interestRate": null, "payableCurrency": null},
            "not a loan"
        ]"#;
        let records: Vec<serde_json::Value> = serde_json::from_str(json).unwrap();

        let loans: Vec<ApiLoan> = decode_records("loans", records);
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].loan_id, "1");
        assert_eq!(loans[0].duration_secs, "2592000");
    }

    #[test]
    fn test_submission_omits_absent_predicates() {
        let submission = LoanTermsSubmission {
            loan_terms: WireLoanTerms {
                duration_secs: 86_400,
                principal: "1".into(),
                prorated_interest_rate: "2".into(),
                collateral_address: "0x01".into(),
                collateral_id: "3".into(),
                payable_currency: "0x02".into(),
                deadline: "4".into(),
                affiliate_code: "0x00".into(),
            },
            collection_id: "0x01".into(),
            signature: "0xsig".into(),
            extra_data: "0x00".into(),
            nonce: "5".into(),
            kind: OfferKind::Asset,
            role: Role::Lender,
            item_predicates: None,
        };

        let value = serde_json::to_value(&submission).unwrap();
        assert!(value.get("itemPredicates").is_none());
        assert_eq!(value["loanTerms"]["durationSecs"], 86_400);
        assert_eq!(value["kind"], "asset");
        assert_eq!(value["role"], "lender");
    }
}
