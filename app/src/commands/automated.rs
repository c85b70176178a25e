//! Automated collection offers
//!
//! Each round quotes ETH in the offer currency once, then offers LTV% of every
//! collection's floor at a fixed APR. A collection without a usable floor is
//! skipped; failures are per collection and never end the loop. Rounds run
//! back to back with the bid lifetime in between, never overlapping.

use std::time::Duration;

use alloy::primitives::Address;
use arcade::catalog::collection_name;
use arcade::currency::format_units;
use arcade::offer::parse_address;
use arcade::{
    build_offer, deadline_from_lifetime, next_nonce, place_offer, unix_now, CollectionEntry,
    Currency, LocalSigner, OfferEconomics, OfferRequest, OfferSigner, OfferTarget, OrderBook,
    Pacer, PriceSource, RateSource, TokioPacer,
};
use lender_core::constants::SECONDS_PER_MINUTE;
use lender_core::{OfferError, Side, UnixSeconds};
use rust_decimal::Decimal;
use tokio::io::AsyncBufRead;

use super::{ask_bid_lifetime, ask_currency, collections, lifetime_label, parse_duration_days};
use crate::prompt::{Prompt, Step};
use crate::AppContext;

/// Operator settings, fixed for the whole run
#[derive(Debug, Clone)]
pub struct OfferSettings {
    pub collections: Vec<Address>,
    pub ltv: Decimal,
    pub currency: &'static Currency,
    pub duration_days: i64,
    pub apr: Decimal,
    pub bid_lifetime_minutes: u64,
}

/// Round outcome counts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub placed: usize,
    pub skipped: usize,
    pub failed: usize,
}

fn parse_collections(answer: &str) -> Result<Vec<Address>, String> {
    let addresses = answer
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(|a| parse_address("collection", a).map_err(|e| e.to_string()))
        .collect::<Result<Vec<_>, _>>()?;

    if addresses.is_empty() {
        return Err("Enter at least one collection address".to_string());
    }
    Ok(addresses)
}

fn parse_percent(answer: &str) -> Result<Decimal, String> {
    match answer.parse::<Decimal>() {
        Ok(value) if value > Decimal::ZERO && value < Decimal::ONE_HUNDRED => Ok(value),
        _ => Err("Enter a percentage between 0 and 100 (exclusive)".to_string()),
    }
}

async fn collect_settings<R>(prompt: &mut Prompt<R>) -> anyhow::Result<Step<OfferSettings>>
where
    R: AsyncBufRead + Unpin,
{
    let collections = match prompt
        .parsed("Collection addresses (comma-separated):", parse_collections)
        .await?
    {
        Step::Continue(c) => c,
        Step::Cancelled => return Ok(Step::Cancelled),
    };
    let Step::Continue(ltv) = prompt.parsed("LTV % (e.g. 50):", parse_percent).await? else {
        return Ok(Step::Cancelled);
    };
    let Step::Continue(currency) = ask_currency(prompt).await? else {
        return Ok(Step::Cancelled);
    };
    let Step::Continue(duration_days) = prompt
        .parsed("Loan duration in days:", parse_duration_days)
        .await?
    else {
        return Ok(Step::Cancelled);
    };
    let Step::Continue(apr) = prompt.parsed("APR %:", parse_percent).await? else {
        return Ok(Step::Cancelled);
    };
    let Step::Continue(bid_lifetime_minutes) = ask_bid_lifetime(prompt).await? else {
        return Ok(Step::Cancelled);
    };

    Ok(Step::Continue(OfferSettings {
        collections,
        ltv,
        currency,
        duration_days,
        apr,
        bid_lifetime_minutes,
    }))
}

/// Offer request for one collection given its floor (ETH) and the ETH rate
pub fn collection_offer_request(
    settings: &OfferSettings,
    collection: Address,
    floor_eth: f64,
    eth_rate: f64,
    now: UnixSeconds,
    nonce: u64,
) -> Result<OfferRequest, OfferError> {
    let value_in_quote = Decimal::try_from(floor_eth * eth_rate).map_err(|_| {
        OfferError::PriceUnavailable {
            collection: collection.to_string(),
        }
    })?;

    let economics = OfferEconomics::from_ltv(
        value_in_quote,
        settings.ltv,
        settings.apr,
        settings.duration_days,
        settings.currency,
    )?;

    Ok(OfferRequest {
        target: OfferTarget::Collection(collection),
        currency: settings.currency,
        economics,
        deadline: deadline_from_lifetime(now, settings.bid_lifetime_minutes),
        nonce,
        side: Side::Lender,
    })
}

async fn run_round<P, B>(
    oracle: &P,
    book: &B,
    signer: &dyn OfferSigner,
    settings: &OfferSettings,
    names: &[CollectionEntry],
) -> RoundSummary
where
    P: PriceSource + RateSource,
    B: OrderBook,
{
    let mut summary = RoundSummary::default();

    let eth_rate = match oracle.eth_rate(settings.currency.rate_symbol).await {
        Ok(rate) => rate,
        Err(e) => {
            tracing::error!(
                currency = settings.currency.code,
                error = %e,
                "ETH rate unavailable, skipping round"
            );
            summary.skipped = settings.collections.len();
            return summary;
        }
    };

    for collection in &settings.collections {
        let address = collection.to_string();
        let name = collection_name(names, &address).unwrap_or("Unknown collection");

        let floor = match oracle.floor_price(&address).await {
            Ok(Some(floor)) => floor,
            Ok(None) => {
                tracing::warn!(collection = %address, name = name, "No floor price, skipping");
                summary.skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(
                    collection = %address,
                    name = name,
                    error = %e,
                    "Floor price lookup failed, skipping"
                );
                summary.skipped += 1;
                continue;
            }
        };

        let now = unix_now();
        let placed = async {
            let request = collection_offer_request(
                settings,
                *collection,
                floor,
                eth_rate,
                now,
                next_nonce(),
            )?;
            let offer = build_offer(&request, now)?;
            place_offer(book, signer, &offer).await?;
            Ok::<_, lender_core::Error>(request)
        }
        .await;

        match placed {
            Ok(request) => {
                summary.placed += 1;
                println!(
                    "Offer placed for {} ({}): floor {:.4} ETH, principal {} {code}, \
                     repayment {} {code}",
                    name,
                    address,
                    floor,
                    format_units(&request.economics.principal, settings.currency.decimals),
                    format_units(&request.economics.repayment, settings.currency.decimals),
                    code = settings.currency.code,
                );
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!(
                    collection = %address,
                    name = name,
                    error = %e,
                    code = e.error_code(),
                    "Failed to place collection offer"
                );
                println!("Error placing offer for {} ({}): {}", name, address, e);
            }
        }
    }

    summary
}

/// Run rounds back to back with the bid lifetime between them, up to
/// `max_rounds` when given. Returns the number of rounds run.
async fn run_rounds<P, B, C>(
    oracle: &P,
    book: &B,
    pacer: &C,
    signer: &dyn OfferSigner,
    settings: &OfferSettings,
    names: &[CollectionEntry],
    max_rounds: Option<u64>,
) -> u64
where
    P: PriceSource + RateSource,
    B: OrderBook,
    C: Pacer,
{
    let pause = Duration::from_secs(settings.bid_lifetime_minutes * SECONDS_PER_MINUTE);

    let mut round = 0u64;
    while max_rounds.map_or(true, |max| round < max) {
        round += 1;
        let summary = run_round(oracle, book, signer, settings, names).await;
        tracing::info!(
            round = round,
            placed = summary.placed,
            skipped = summary.skipped,
            failed = summary.failed,
            "Round finished"
        );
        println!(
            "Waiting {} before the next round...",
            lifetime_label(settings.bid_lifetime_minutes)
        );
        pacer.pause(pause).await;
    }
    round
}

pub async fn run<R>(ctx: &AppContext, prompt: &mut Prompt<R>) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let settings = match collect_settings(prompt).await? {
        Step::Continue(s) => s,
        Step::Cancelled => return Ok(()),
    };

    println!(
        "\n{} collection(s), LTV {}%, APR {}%, {} days in {}, bids live {}\n",
        settings.collections.len(),
        settings.ltv,
        settings.apr,
        settings.duration_days,
        settings.currency.code,
        lifetime_label(settings.bid_lifetime_minutes),
    );
    if prompt.confirm("Start automated offers?").await? != Step::Continue(true) {
        println!("Automated offers cancelled.");
        return Ok(());
    }

    let signer = LocalSigner::from_env()?;
    let names = collections::load_latest(&ctx.report_dir);

    run_rounds(&ctx.oracle, &ctx.arcade, &TokioPacer, &signer, &settings, &names, None).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::scripted;
    use arcade::find_by_code;
    use arcade::OfferTerms;
    use arcade_client::LoanTermsSubmission;
    use lender_core::ApiError;
    use std::sync::Mutex;

    const BAYC: &str = "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d";
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn bayc() -> Address {
        BAYC.parse().unwrap()
    }

    fn settings() -> OfferSettings {
        OfferSettings {
            collections: vec![bayc()],
            ltv: Decimal::from(40),
            currency: find_by_code("USDC").unwrap(),
            duration_days: 10,
            apr: "36.5".parse().unwrap(),
            bid_lifetime_minutes: 30,
        }
    }

    #[test]
    fn test_parse_collections() {
        let parsed = parse_collections(&format!("{}, {} ,", BAYC, BAYC)).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parse_collections(" , ").is_err());
        assert!(parse_collections("0x1234").is_err());
    }

    #[test]
    fn test_parse_percent_bounds() {
        assert!(parse_percent("50").is_ok());
        assert!(parse_percent("0").is_err());
        assert!(parse_percent("100").is_err());
        assert!(parse_percent("fifty").is_err());
    }

    #[test]
    fn test_collection_offer_request() {
        // floor 2 ETH at 2500 USDC/ETH -> 5000 USDC value, 40% -> 2000 USDC
        let request = collection_offer_request(&settings(), bayc(), 2.0, 2500.0, 1_000, 7).unwrap();
        assert_eq!(request.economics.principal.to_string(), "2000000000");
        assert_eq!(request.economics.repayment.to_string(), "2020000000");
        assert_eq!(request.deadline, 1_000 + 30 * 60);

        let offer = build_offer(&request, 1_000).unwrap();
        let OfferTerms::Collection(terms) = offer.terms else {
            panic!("expected collection terms");
        };
        assert_eq!(terms.items.len(), 1);
    }

    #[test]
    fn test_non_finite_floor_is_price_unavailable() {
        let err =
            collection_offer_request(&settings(), bayc(), f64::NAN, 2500.0, 0, 1).unwrap_err();
        assert_eq!(err.error_code(), "price_unavailable");
    }

    /// Oracle, order book and pacer in one, logging every call in order
    #[derive(Default)]
    struct FakeMarket {
        log: Mutex<Vec<String>>,
        no_floor: Option<Address>,
        rejects: Option<Address>,
        rate_down: bool,
    }

    impl FakeMarket {
        fn record(&self, entry: String) {
            self.log.lock().unwrap().push(entry);
        }

        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    impl PriceSource for FakeMarket {
        async fn floor_price(&self, collection: &str) -> Result<Option<f64>, ApiError> {
            self.record(format!("floor:{}", collection));
            let missing = self.no_floor.is_some_and(|a| a.to_string() == collection);
            Ok((!missing).then_some(2.0))
        }

        async fn top_bid(&self, _collection: &str) -> Result<Option<f64>, ApiError> {
            Ok(None)
        }
    }

    impl RateSource for FakeMarket {
        async fn eth_rate(&self, _vs_symbol: &str) -> Result<f64, ApiError> {
            self.record("rate".to_string());
            if self.rate_down {
                Err(ApiError::Unreachable {
                    url: "rates".into(),
                    reason: "down".into(),
                })
            } else {
                Ok(2500.0)
            }
        }
    }

    impl OrderBook for FakeMarket {
        async fn submit_loan_terms(
            &self,
            submission: &LoanTermsSubmission,
        ) -> Result<serde_json::Value, ApiError> {
            self.record(format!("submit:{}", submission.collection_id));
            if self.rejects.is_some_and(|a| a.to_string() == submission.collection_id) {
                Err(ApiError::SubmissionRejected {
                    status: 400,
                    body: "{\"error\":\"bad terms\"}".into(),
                })
            } else {
                Ok(serde_json::json!({"ok": true}))
            }
        }
    }

    impl Pacer for FakeMarket {
        async fn pause(&self, delay: Duration) {
            assert_eq!(delay, Duration::from_secs(30 * 60));
            self.record("pause".to_string());
        }
    }

    fn signer() -> LocalSigner {
        LocalSigner::from_hex(DEV_KEY).unwrap()
    }

    #[tokio::test]
    async fn test_round_continues_past_failing_collections() {
        let (first, second, third) =
            (Address::repeat_byte(1), Address::repeat_byte(2), Address::repeat_byte(3));
        let market = FakeMarket {
            no_floor: Some(first),
            rejects: Some(second),
            ..Default::default()
        };
        let settings = OfferSettings {
            collections: vec![first, second, third],
            ..settings()
        };

        let summary = run_round(&market, &market, &signer(), &settings, &[]).await;

        assert_eq!(
            summary,
            RoundSummary {
                placed: 1,
                skipped: 1,
                failed: 1
            }
        );
        assert_eq!(
            market.log(),
            vec![
                "rate".to_string(),
                format!("floor:{}", first),
                format!("floor:{}", second),
                format!("submit:{}", second),
                format!("floor:{}", third),
                format!("submit:{}", third),
            ]
        );
    }

    #[tokio::test]
    async fn test_round_skipped_without_eth_rate() {
        let market = FakeMarket {
            rate_down: true,
            ..Default::default()
        };
        let settings = OfferSettings {
            collections: vec![bayc(), Address::repeat_byte(9)],
            ..settings()
        };

        let summary = run_round(&market, &market, &signer(), &settings, &[]).await;

        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.placed + summary.failed, 0);
        assert_eq!(market.log(), vec!["rate".to_string()]);
    }

    #[tokio::test]
    async fn test_rounds_run_one_after_another() {
        let market = FakeMarket::default();

        let signer = signer();
        let rounds =
            run_rounds(&market, &market, &market, &signer, &settings(), &[], Some(2)).await;

        assert_eq!(rounds, 2);
        let one_round = vec![
            "rate".to_string(),
            format!("floor:{}", bayc()),
            format!("submit:{}", bayc()),
            "pause".to_string(),
        ];
        assert_eq!(market.log(), [one_round.clone(), one_round].concat());
    }

    #[tokio::test]
    async fn test_collect_settings() {
        let mut prompt = scripted(format!("{}\n150\n40\n2\n10\n36.5\n2\n", BAYC));
        let Step::Continue(settings) = collect_settings(&mut prompt).await.unwrap() else {
            panic!("expected settings");
        };
        assert_eq!(settings.ltv, Decimal::from(40));
        assert_eq!(settings.currency.code, "USDC");
        assert_eq!(settings.bid_lifetime_minutes, 30);
    }
}
