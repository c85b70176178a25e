//! Arcade Lender command-line application library

pub mod commands;
pub mod prompt;

use std::path::PathBuf;

use arcade_client::{ArcadeClient, OracleClient};
use lender_core::AppConfig;

use prompt::{Prompt, Step};

/// Directory receiving reports and collection snapshots
const REPORT_DIR: &str = "logs";

/// Shared, immutable state for one process
pub struct AppContext {
    pub config: AppConfig,
    pub arcade: ArcadeClient,
    pub oracle: OracleClient,
    pub report_dir: PathBuf,
}

impl AppContext {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let arcade = ArcadeClient::new(config.api.clone())?;
        let oracle = OracleClient::new(config.oracle.clone())?;
        Ok(Self {
            config,
            arcade,
            oracle,
            report_dir: PathBuf::from(REPORT_DIR),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    SingleOffer,
    AutomatedOffers,
    DueSoonLoans,
    Listings,
    Collections,
    Exit,
}

const MENU: &[(MenuItem, &str)] = &[
    (MenuItem::SingleOffer, "Place single offer"),
    (MenuItem::AutomatedOffers, "Automated collection offers"),
    (MenuItem::DueSoonLoans, "Get due-soon loans"),
    (MenuItem::Listings, "Get listings"),
    (MenuItem::Collections, "Refresh verified collections"),
    (MenuItem::Exit, "Exit"),
];

/// Run the interactive application
pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("arcade_lender_lib=debug".parse()?)
                .add_directive("arcade=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    tracing::info!("Starting Arcade Lender");

    let config = AppConfig::from_env()?;
    let ctx = AppContext::new(config)?;
    let mut prompt = Prompt::stdin();

    loop {
        let labels: Vec<&str> = MENU.iter().map(|(_, label)| *label).collect();
        let item = match prompt.select("\nWhat would you like to do?", labels.as_slice()).await? {
            Step::Continue(index) => MENU[index].0,
            Step::Cancelled => MenuItem::Exit,
        };

        let result = match item {
            MenuItem::SingleOffer => commands::single_offer::run(&ctx, &mut prompt).await,
            MenuItem::AutomatedOffers => commands::automated::run(&ctx, &mut prompt).await,
            MenuItem::DueSoonLoans => commands::loans::run(&ctx).await,
            MenuItem::Listings => commands::listings::run(&ctx).await,
            MenuItem::Collections => commands::collections::run(&ctx).await,
            MenuItem::Exit => {
                println!("Goodbye!");
                return Ok(());
            }
        };

        if let Err(e) = result {
            tracing::error!(error = %e, "Command failed");
            println!("Error: {:#}", e);
        }
    }
}
