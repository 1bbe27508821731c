// src/pipeline/matrix.rs

//! Scrape job matrix generation.

use std::sync::Arc;

use crate::models::{Config, ScrapeJob};

/// Expand the configured year range and semester list into the full set of
/// per-scrape-job configurations.
///
/// The matrix is the Cartesian product of `[from, to)` and the semester
/// list, row-major over years then semesters so the order is stable. Every
/// job shares the same base configuration.
pub fn expand_jobs(config: &Arc<Config>) -> Vec<ScrapeJob> {
    let mut jobs = Vec::new();
    for year in config.years.from..config.years.to {
        for &semester in &config.semesters {
            jobs.push(ScrapeJob {
                year,
                semester,
                config: Arc::clone(config),
            });
        }
    }
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearRange;

    fn config(from: i32, to: i32, semesters: Vec<u32>) -> Arc<Config> {
        let mut config = Config::default();
        config.years = YearRange { from, to };
        config.semesters = semesters;
        Arc::new(config)
    }

    #[test]
    fn expands_full_cartesian_product() {
        let config = config(2016, 2018, vec![1, 2]);
        let jobs = expand_jobs(&config);

        assert_eq!(jobs.len(), 4);
        let pairs: Vec<(i32, u32)> = jobs.iter().map(|j| (j.year, j.semester)).collect();
        assert_eq!(pairs, vec![(2016, 1), (2016, 2), (2017, 1), (2017, 2)]);
    }

    #[test]
    fn jobs_share_the_base_configuration() {
        let config = config(2016, 2018, vec![1, 2]);
        let jobs = expand_jobs(&config);

        for job in &jobs {
            assert!(Arc::ptr_eq(&job.config, &config));
            assert_eq!(job.config.scraper.max_concurrent, config.scraper.max_concurrent);
        }
    }

    #[test]
    fn empty_range_yields_no_jobs() {
        let config = config(2018, 2018, vec![1, 2]);
        assert!(expand_jobs(&config).is_empty());
    }
}
