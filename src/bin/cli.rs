//! modscraper CLI
//!
//! Local execution entry point for the timetable data pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use modscraper::{
    config::load_config,
    error::Result,
    pipeline,
    utils::{http, log::StdLogger},
};

/// modscraper - University Module Timetable Scraper
#[derive(Parser, Debug)]
#[command(
    name = "modscraper",
    version,
    about = "Scrapes university module and exam timetables into consolidated JSON"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and parse exam timetables for every (year, semester) job
    Scrape {
        /// Ignore the cache and refetch everything
        #[arg(long)]
        refresh: bool,
    },

    /// Reconcile scraped records into one document per module
    Consolidate,

    /// Run full pipeline: Scrape → Consolidate
    Pipeline {
        /// Ignore the cache and refetch everything
        #[arg(long)]
        refresh: bool,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("modscraper starting...");

    let config = Arc::new(load_config(&cli.config)?);

    log::info!(
        "parsing AY {}-{}, semesters {:?}",
        config.years.from,
        config.years.to,
        config.semesters
    );

    let logger = StdLogger;

    match cli.command {
        Command::Scrape { refresh } => {
            let client = http::create_async_client(&config.scraper)?;
            let outcome = pipeline::run_scraper(Arc::clone(&config), &client, refresh, &logger).await?;

            if outcome.job_failures > 0 {
                log::warn!(
                    "{} of {} jobs failed; rerun with --refresh to retry",
                    outcome.job_failures,
                    outcome.job_total
                );
            }
        }

        Command::Consolidate => {
            pipeline::run_consolidate(Arc::clone(&config), &logger).await?;
        }

        Command::Pipeline { refresh } => {
            let client = http::create_async_client(&config.scraper)?;

            log::info!("Step 1/2: Scraping exam timetables...");
            pipeline::run_scraper(Arc::clone(&config), &client, refresh, &logger).await?;

            log::info!("Step 2/2: Consolidating module records...");
            pipeline::run_consolidate(Arc::clone(&config), &logger).await?;

            log::info!("Pipeline complete!");
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            config.validate()?;
            log::info!("All validations passed!");
        }
    }

    log::info!("Done!");

    Ok(())
}
