//! Plaintext run reports

use std::path::{Path, PathBuf};

use arcade_client::ApiListing;
use chrono::{DateTime, TimeZone, Utc};
use num_bigint::BigUint;

use crate::calculator::calculate_repayment_amount;
use crate::currency::{find_by_address, format_units};
use crate::state::EnhancedLoan;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `<prefix>_<YYYYmmdd_HHMMSS>.<ext>`
pub fn report_file_name(prefix: &str, ext: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}.{}", prefix, at.format("%Y%m%d_%H%M%S"), ext)
}

/// Write a report into `dir`, creating it if needed
pub fn write_report(dir: &Path, file_name: &str, contents: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "Wrote report");
    Ok(path)
}

fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| Utc.timestamp_opt(s, 0).single())
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn format_price(price: Option<f64>) -> String {
    price
        .map(|p| format!("{} ETH", p))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Principal and repayment in human units with the currency code
fn loan_amounts(loan: &EnhancedLoan) -> (String, String) {
    let principal = BigUint::parse_bytes(loan.loan.principal.trim().as_bytes(), 10);
    let rate = BigUint::parse_bytes(loan.loan.interest_rate.trim().as_bytes(), 10);
    let repayment = match (&principal, &rate) {
        (Some(p), Some(r)) => Some(calculate_repayment_amount(p, r)),
        _ => None,
    };

    let currency = find_by_address(&loan.loan.payable_currency).ok();
    let render = |amount: Option<BigUint>| match (amount, currency) {
        (Some(a), Some(c)) => format!("{} {}", format_units(&a, c.decimals), c.code),
        (Some(a), None) => format!("{} N/A", a),
        (None, _) => "N/A".to_string(),
    };

    (render(principal), render(repayment))
}

/// One line per loan, in the given (due-date) order
pub fn render_due_soon_report(
    loans: &[EnhancedLoan],
    horizon_hours: u64,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = format!(
        "Loans due within {}h (generated {} UTC): {}\n",
        horizon_hours,
        generated_at.format(DATE_FORMAT),
        loans.len()
    );

    for loan in loans {
        let (principal, repayment) = loan_amounts(loan);
        out.push_str(&format!(
            "Loan {} | due {} UTC | {:.2} days | principal {} | repayment {} | {} | \
             floor {} | top bid {}\n",
            loan.loan_id(),
            format_timestamp(loan.due_date),
            loan.duration_days,
            principal,
            repayment,
            loan.kind_label(),
            format_price(loan.floor_price),
            format_price(loan.highest_bid),
        ));
    }

    out
}

pub fn render_listings_report(
    listings: &[ApiListing],
    min_listing_id: u64,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = format!(
        "Listings with id >= {} (generated {} UTC): {}\n",
        min_listing_id,
        generated_at.format(DATE_FORMAT),
        listings.len()
    );

    for listing in listings {
        out.push_str(&format!(
            "Listing {} | collateral {} #{} | vault {}\n",
            listing.listing_id,
            listing.collateral_address,
            listing.collateral_id,
            listing.vault.as_deref().unwrap_or("-"),
        ));
    }

    out
}
