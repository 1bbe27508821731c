//! Pipeline entry points for scraper operations.
//!
//! - `run_scraper`: expand the job matrix and fetch/parse every semester
//! - `run_consolidate`: reconcile scraped records into per-module documents

pub mod consolidate;
pub mod matrix;
pub mod merge;
pub mod scrape;

pub use consolidate::run_consolidate;
pub use matrix::expand_jobs;
pub use merge::merge_module_fields;
pub use scrape::run_scraper;
