// src/pipeline/scrape.rs

//! Scrape pipeline entry point.

use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::services::{ExamScraper, ScrapeOutcome};
use crate::storage::CacheAge;
use crate::utils::log::Logger;

/// Run the exam scrape across the whole job matrix.
///
/// `refresh` forces every cached payload to be treated as stale, matching
/// the upstream task's refresh flag.
pub async fn run_scraper(
    config: Arc<Config>,
    client: &reqwest::Client,
    refresh: bool,
    logger: &dyn Logger,
) -> Result<ScrapeOutcome> {
    let age = if refresh {
        CacheAge::AlwaysStale
    } else {
        CacheAge::from_config(config.scraper.max_cache_age)
    };

    let scraper = ExamScraper::new(Arc::clone(&config), client.clone());
    let outcome = scraper.scrape_all(age, logger).await?;

    log::info!(
        "scrape finished: {} jobs, {} failures, {} records",
        outcome.job_total,
        outcome.job_failures,
        outcome.record_total
    );
    Ok(outcome)
}
