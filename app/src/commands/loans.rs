//! Due-soon loan scan

use std::time::Duration;

use arcade::{
    render_due_soon_report, report_file_name, scan_due_soon, unix_now, write_report, TokioPacer,
};

use crate::AppContext;

pub async fn run(ctx: &AppContext) -> anyhow::Result<()> {
    let scan = &ctx.config.scan;
    println!("Scanning loans due within {} hours...", scan.due_soon_hours);

    let loans = scan_due_soon(
        &ctx.arcade,
        &ctx.oracle,
        &TokioPacer,
        unix_now(),
        scan.due_soon_hours,
        Duration::from_millis(scan.enrich_delay_ms),
    )
    .await?;

    let now = chrono::Utc::now();
    let report = render_due_soon_report(&loans, scan.due_soon_hours, now);
    print!("{}", report);

    let file_name = report_file_name("due_soon_loans", "log", now);
    let path = write_report(&ctx.report_dir, &file_name, &report)?;
    println!("Report saved to {}", path.display());
    Ok(())
}
