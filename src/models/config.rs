//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP, caching and concurrency settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Academic year range to scrape, `[from, to)`
    #[serde(default)]
    pub years: YearRange,

    /// Semesters to scrape within each year (1-2 regular, 3-4 special term)
    #[serde(default = "defaults::semesters")]
    pub semesters: Vec<u32>,

    /// Exam timetable scrape task settings
    #[serde(default)]
    pub exams: ExamTaskConfig,

    /// Consolidation task settings
    #[serde(default)]
    pub consolidate: ConsolidateConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.max_concurrent == 0 {
            return Err(AppError::validation("scraper.max_concurrent must be > 0"));
        }
        if self.scraper.max_cache_age < -1 {
            return Err(AppError::validation("scraper.max_cache_age must be >= -1"));
        }
        if self.years.from >= self.years.to {
            return Err(AppError::validation("years.from must be before years.to"));
        }
        if let Err(e) = url::Url::parse(&self.exams.url_base) {
            return Err(AppError::validation(format!(
                "exams.url_base is not a valid URL: {e}"
            )));
        }
        if self.semesters.is_empty() {
            return Err(AppError::validation("No semesters defined"));
        }
        if self.consolidate.sources.is_empty() {
            return Err(AppError::validation("No consolidation sources defined"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            years: YearRange::default(),
            semesters: defaults::semesters(),
            exams: ExamTaskConfig::default(),
            consolidate: ConsolidateConfig::default(),
        }
    }
}

/// HTTP client, cache and concurrency settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent upstream requests
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Root directory for the URL-keyed file cache
    #[serde(default = "defaults::cache_path")]
    pub cache_path: String,

    /// Cache freshness window in seconds.
    /// `-1` caches forever, `0` treats every cached file as stale.
    #[serde(default = "defaults::max_cache_age")]
    pub max_cache_age: i64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            cache_path: defaults::cache_path(),
            max_cache_age: defaults::max_cache_age(),
        }
    }
}

/// Academic year range, `[from, to)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct YearRange {
    #[serde(default = "defaults::year_from")]
    pub from: i32,
    #[serde(default = "defaults::year_to")]
    pub to: i32,
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            from: defaults::year_from(),
            to: defaults::year_to(),
        }
    }
}

/// Exam timetable scrape task settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamTaskConfig {
    /// Root URL of the exam timetable host
    #[serde(default = "defaults::exam_url_base")]
    pub url_base: String,

    /// Output root for per-semester scrape results
    #[serde(default = "defaults::dest_folder")]
    pub dest_folder: String,

    /// File name for the raw exam timetable within each semester directory
    #[serde(default = "defaults::exam_file_name")]
    pub dest_file_name: String,
}

impl Default for ExamTaskConfig {
    fn default() -> Self {
        Self {
            url_base: defaults::exam_url_base(),
            dest_folder: defaults::dest_folder(),
            dest_file_name: defaults::exam_file_name(),
        }
    }
}

/// Consolidation task settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidateConfig {
    /// Root holding the per-semester source documents
    #[serde(default = "defaults::dest_folder")]
    pub src_folder: String,

    /// Output root for reconciled module records
    #[serde(default = "defaults::dest_folder")]
    pub dest_folder: String,

    /// File name for each reconciled module record
    #[serde(default = "defaults::module_file_name")]
    pub dest_file_name: String,

    /// Source document file names, folded through the merge engine in
    /// listed order (later sources win unresolved conflicts)
    #[serde(default = "defaults::sources")]
    pub sources: Vec<String>,
}

impl Default for ConsolidateConfig {
    fn default() -> Self {
        Self {
            src_folder: defaults::dest_folder(),
            dest_folder: defaults::dest_folder(),
            dest_file_name: defaults::module_file_name(),
            sources: defaults::sources(),
        }
    }
}

mod defaults {
    // Scraper defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; modscraper/1.0)".into()
    }
    pub fn timeout() -> u64 {
        60
    }
    pub fn max_concurrent() -> usize {
        5
    }
    pub fn cache_path() -> String {
        "cache".into()
    }
    pub fn max_cache_age() -> i64 {
        86_400
    }

    // Year/semester defaults
    pub fn year_from() -> i32 {
        2016
    }
    pub fn year_to() -> i32 {
        2017
    }
    pub fn semesters() -> Vec<u32> {
        vec![1, 2, 3, 4]
    }

    // Task defaults
    pub fn exam_url_base() -> String {
        "https://webrb.nus.edu.sg/examtt".into()
    }
    pub fn dest_folder() -> String {
        "data".into()
    }
    pub fn exam_file_name() -> String {
        "examTimetableRaw.json".into()
    }
    pub fn module_file_name() -> String {
        "module.json".into()
    }
    pub fn sources() -> Vec<String> {
        vec![exam_file_name()]
    }
}
