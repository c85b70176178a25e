//! Due-soon loan scan: fetch, filter, sort, enrich.
//!
//! Enrichment is serialized across loans with a fixed pause after each
//! enriched loan; the two oracle calls for one loan run concurrently. Oracle
//! failures leave the price empty and never abort the scan. Vault loans are
//! keyed by vault rather than collection, so they are never enriched.

use std::future::Future;
use std::time::Duration;

use arcade_client::{ApiLoan, ArcadeClient, OracleClient};
use lender_core::constants::SECONDS_PER_HOUR;
use lender_core::{ApiError, UnixSeconds};

use crate::constants::{ACTIVE_LOAN_STATE, PROTOCOL_VERSION};
use crate::state::EnhancedLoan;

/// Source of the full loan list
pub trait LoanSource {
    fn fetch_loans(&self) -> impl Future<Output = Result<Vec<ApiLoan>, ApiError>> + Send;
}

/// Collection price oracle
pub trait PriceSource {
    fn floor_price(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Option<f64>, ApiError>> + Send;

    fn top_bid(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Option<f64>, ApiError>> + Send;
}

/// ETH quote for the offer currency
pub trait RateSource {
    fn eth_rate(&self, vs_symbol: &str) -> impl Future<Output = Result<f64, ApiError>> + Send;
}

/// Inter-request delay
pub trait Pacer {
    fn pause(&self, delay: Duration) -> impl Future<Output = ()> + Send;
}

impl LoanSource for ArcadeClient {
    fn fetch_loans(&self) -> impl Future<Output = Result<Vec<ApiLoan>, ApiError>> + Send {
        self.get_loans()
    }
}

impl PriceSource for OracleClient {
    fn floor_price(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Option<f64>, ApiError>> + Send {
        OracleClient::floor_price(self, collection)
    }

    fn top_bid(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Option<f64>, ApiError>> + Send {
        OracleClient::top_bid(self, collection)
    }
}

impl RateSource for OracleClient {
    fn eth_rate(&self, vs_symbol: &str) -> impl Future<Output = Result<f64, ApiError>> + Send {
        OracleClient::eth_rate(self, vs_symbol)
    }
}

/// Pacer backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

impl Pacer for TokioPacer {
    fn pause(&self, delay: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(delay)
    }
}

/// Keep active V3 loans due within `[now, now + horizon_hours]`, ascending by
/// due date. Ties keep API order.
pub fn filter_due_soon(
    loans: Vec<ApiLoan>,
    now: UnixSeconds,
    horizon_hours: u64,
) -> Vec<EnhancedLoan> {
    let horizon_end = now.saturating_add(horizon_hours.saturating_mul(SECONDS_PER_HOUR));

    let mut due: Vec<EnhancedLoan> = loans
        .into_iter()
        .filter(|l| l.state == ACTIVE_LOAN_STATE && l.protocol_version == PROTOCOL_VERSION)
        .filter_map(|l| {
            let loan_id = l.loan_id.clone();
            let enhanced = EnhancedLoan::from_loan(l);
            if enhanced.is_none() {
                tracing::warn!(loan_id = %loan_id, "Skipping loan with unparsable dates");
            }
            enhanced
        })
        .filter(|l| l.due_date >= now && l.due_date <= horizon_end)
        .collect();

    // stable
    due.sort_by_key(|l| l.due_date);
    due
}

/// Attach floor price and top bid to every non-vault loan
pub async fn enrich<P, C>(loans: &mut [EnhancedLoan], prices: &P, pacer: &C, delay: Duration)
where
    P: PriceSource,
    C: Pacer,
{
    for loan in loans.iter_mut().filter(|l| !l.is_vault) {
        let collection = loan.collection().to_string();
        let (floor, bid) = tokio::join!(
            prices.floor_price(&collection),
            prices.top_bid(&collection)
        );

        loan.floor_price = degrade(floor, loan.loan_id(), &collection, "floor price");
        loan.highest_bid = degrade(bid, loan.loan_id(), &collection, "top bid");

        tracing::debug!(
            loan_id = %loan.loan_id(),
            floor_price = ?loan.floor_price,
            highest_bid = ?loan.highest_bid,
            "Enriched loan"
        );

        pacer.pause(delay).await;
    }
}

fn degrade(
    result: Result<Option<f64>, ApiError>,
    loan_id: &str,
    collection: &str,
    what: &str,
) -> Option<f64> {
    match result {
        Ok(price) => price,
        Err(e) => {
            tracing::warn!(
                loan_id = %loan_id,
                collection = %collection,
                error = %e,
                "Failed to fetch {}", what
            );
            None
        }
    }
}

/// Full scan: fetch, filter, sort and enrich
pub async fn scan_due_soon<S, P, C>(
    source: &S,
    prices: &P,
    pacer: &C,
    now: UnixSeconds,
    horizon_hours: u64,
    delay: Duration,
) -> Result<Vec<EnhancedLoan>, ApiError>
where
    S: LoanSource,
    P: PriceSource,
    C: Pacer,
{
    let loans = source.fetch_loans().await?;
    let total = loans.len();

    let mut due = filter_due_soon(loans, now, horizon_hours);
    tracing::info!(
        total = total,
        due_soon = due.len(),
        horizon_hours = horizon_hours,
        "Filtered due-soon loans"
    );

    enrich(&mut due, prices, pacer, delay).await;
    Ok(due)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures::api_loan;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const NOW: UnixSeconds = 1_750_000_000;
    const HOUR: u64 = 3_600;

    struct FakeLoans(Vec<ApiLoan>);

    impl LoanSource for FakeLoans {
        async fn fetch_loans(&self) -> Result<Vec<ApiLoan>, ApiError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct FakePrices {
        calls: Mutex<Vec<String>>,
        fail_bids: bool,
    }

    impl PriceSource for FakePrices {
        async fn floor_price(&self, collection: &str) -> Result<Option<f64>, ApiError> {
            self.calls.lock().unwrap().push(format!("floor:{}", collection));
            Ok(Some(12.5))
        }

        async fn top_bid(&self, collection: &str) -> Result<Option<f64>, ApiError> {
            self.calls.lock().unwrap().push(format!("bid:{}", collection));
            if self.fail_bids {
                Err(ApiError::Unreachable {
                    url: "oracle".into(),
                    reason: "down".into(),
                })
            } else {
                Ok(None)
            }
        }
    }

    #[derive(Default)]
    struct CountingPacer {
        pauses: AtomicUsize,
    }

    impl Pacer for CountingPacer {
        async fn pause(&self, delay: Duration) {
            assert_eq!(delay, Duration::from_millis(500));
            self.pauses.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn due_at(id: &str, due: u64, vault: bool) -> ApiLoan {
        api_loan(id, due - 86_400, 86_400, vault)
    }

    #[test]
    fn test_filter_keeps_only_loans_inside_horizon() {
        let loans = vec![
            due_at("past", NOW - HOUR, false),
            due_at("soon", NOW + HOUR, false),
            due_at("later", NOW + 49 * HOUR, false),
        ];
        let due = filter_due_soon(loans, NOW, 48);
        let ids: Vec<_> = due.iter().map(|l| l.loan_id()).collect();
        assert_eq!(ids, vec!["soon"]);
    }

    #[test]
    fn test_filter_bounds_are_inclusive() {
        let loans = vec![
            due_at("edge-end", NOW + 48 * HOUR, false),
            due_at("edge-start", NOW, false),
        ];
        let due = filter_due_soon(loans, NOW, 48);
        let ids: Vec<_> = due.iter().map(|l| l.loan_id()).collect();
        assert_eq!(ids, vec!["edge-start", "edge-end"]);
    }

    #[test]
    fn test_filter_state_and_version() {
        let mut repaid = due_at("repaid", NOW + HOUR, false);
        repaid.state = "Repaid".into();
        let mut v2 = due_at("v2", NOW + HOUR, false);
        v2.protocol_version = "2".into();
        let due = filter_due_soon(vec![repaid, v2, due_at("ok", NOW + HOUR, false)], NOW, 48);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].loan_id(), "ok");
    }

    #[test]
    fn test_sort_is_stable_by_due_date() {
        let loans = vec![
            due_at("b", NOW + 2 * HOUR, false),
            due_at("a1", NOW + HOUR, false),
            due_at("c", NOW + 3 * HOUR, false),
            due_at("a2", NOW + HOUR, false),
        ];
        let due = filter_due_soon(loans, NOW, 48);
        let ids: Vec<_> = due.iter().map(|l| l.loan_id()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b", "c"]);
    }

    #[tokio::test]
    async fn test_enrich_pauses_once_per_non_vault_loan() {
        let source = FakeLoans(vec![
            due_at("1", NOW + HOUR, false),
            due_at("2", NOW + 2 * HOUR, true),
            due_at("3", NOW + 3 * HOUR, false),
            due_at("4", NOW + 4 * HOUR, false),
        ]);
        let prices = FakePrices::default();
        let pacer = CountingPacer::default();

        let due = scan_due_soon(&source, &prices, &pacer, NOW, 48, Duration::from_millis(500))
            .await
            .unwrap();

        assert_eq!(due.len(), 4);
        assert_eq!(pacer.pauses.load(Ordering::SeqCst), 3);
        assert_eq!(prices.calls.lock().unwrap().len(), 6);

        let vault = due.iter().find(|l| l.loan_id() == "2").unwrap();
        assert!(vault.is_vault);
        assert!(vault.floor_price.is_none());
        assert!(vault.highest_bid.is_none());

        let asset = due.iter().find(|l| l.loan_id() == "1").unwrap();
        assert_eq!(asset.floor_price, Some(12.5));
        assert!(asset.highest_bid.is_none());
    }

    #[tokio::test]
    async fn test_oracle_failure_degrades_to_none() {
        let source = FakeLoans(vec![due_at("1", NOW + HOUR, false)]);
        let prices = FakePrices {
            fail_bids: true,
            ..Default::default()
        };
        let pacer = CountingPacer::default();

        let due = scan_due_soon(&source, &prices, &pacer, NOW, 48, Duration::from_millis(500))
            .await
            .unwrap();

        assert_eq!(due[0].floor_price, Some(12.5));
        assert!(due[0].highest_bid.is_none());
        assert_eq!(pacer.pauses.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_vault_only_scan_never_pauses() {
        let source = FakeLoans(vec![due_at("v", NOW + HOUR, true)]);
        let prices = FakePrices::default();
        let pacer = CountingPacer::default();

        scan_due_soon(&source, &prices, &pacer, NOW, 48, Duration::from_millis(500))
            .await
            .unwrap();

        assert_eq!(pacer.pauses.load(Ordering::SeqCst), 0);
        assert!(prices.calls.lock().unwrap().is_empty());
    }
}
