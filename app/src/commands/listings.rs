//! Open lend listings report

use arcade::{filter_listings, render_listings_report, report_file_name, write_report};

use crate::AppContext;

pub async fn run(ctx: &AppContext) -> anyhow::Result<()> {
    let min_listing_id = ctx.config.scan.min_listing_id;
    let listings = ctx.arcade.get_listings().await?;
    let total = listings.len();
    let listings = filter_listings(listings, min_listing_id);

    let now = chrono::Utc::now();
    let report = render_listings_report(&listings, min_listing_id, now);
    print!("{}", report);

    let path = write_report(&ctx.report_dir, &report_file_name("listings", "log", now), &report)?;
    tracing::info!(
        total = total,
        kept = listings.len(),
        min_listing_id = min_listing_id,
        "Listings report done"
    );
    println!("Report saved to {}", path.display());
    Ok(())
}
