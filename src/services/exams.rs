// src/services/exams.rs

//! Exam timetable scraper service.
//!
//! Drives one fetch-and-parse pass per (year, semester) job, bounded by the
//! configured concurrency so the upstream rate limit is respected. A failed
//! job is reported and counted; sibling jobs continue.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Config, ScrapeJob};
use crate::parsers::parse_exam_document;
use crate::pipeline::expand_jobs;
use crate::services::CachedFetcher;
use crate::storage::{CacheAge, CacheStore};
use crate::utils::log::Logger;

/// Summary of a scrape run.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    pub job_total: usize,
    pub job_failures: usize,
    pub record_total: usize,
}

/// Service for scraping exam timetables across the job matrix.
pub struct ExamScraper {
    config: Arc<Config>,
    fetcher: CachedFetcher,
}

impl ExamScraper {
    /// Create a new scraper with the given configuration and HTTP client.
    pub fn new(config: Arc<Config>, client: reqwest::Client) -> Self {
        let cache = CacheStore::new(&config.scraper.cache_path);
        Self {
            config,
            fetcher: CachedFetcher::new(client, cache),
        }
    }

    /// Upstream URL for one job. Semesters 1 and 2 are regular semesters;
    /// 3 and 4 are special term parts 1 and 2.
    pub fn exam_url(&self, job: &ScrapeJob) -> String {
        let base = &self.config.exams.url_base;
        if job.semester < 3 {
            format!(
                "{base}/Exam{}/Semester {sem}/Semester_{sem}_By_Date.pdf",
                job.year,
                sem = job.semester,
            )
        } else {
            format!(
                "{base}/Exam{}/Special Term Part {part}/Special_Term_Part{part}_By_Date.pdf",
                job.year,
                part = job.semester - 2,
            )
        }
    }

    /// Output directory for one job.
    fn job_dest(&self, job: &ScrapeJob) -> PathBuf {
        Path::new(&self.config.exams.dest_folder)
            .join(job.academic_year())
            .join(job.semester.to_string())
    }

    /// Run every job in the matrix, at most `max_concurrent` in flight.
    pub async fn scrape_all(&self, age: CacheAge, logger: &dyn Logger) -> Result<ScrapeOutcome> {
        let jobs = expand_jobs(&self.config);
        let concurrency = self.config.scraper.max_concurrent.max(1);

        let mut outcome = ScrapeOutcome {
            job_total: jobs.len(),
            ..ScrapeOutcome::default()
        };

        let mut job_stream = stream::iter(jobs)
            .map(|job| async move {
                let result = self.scrape_job(&job, age, logger).await;
                (job, result)
            })
            .buffer_unordered(concurrency);

        while let Some((job, result)) = job_stream.next().await {
            match result {
                Ok(count) => outcome.record_total += count,
                Err(error) => {
                    outcome.job_failures += 1;
                    logger.warn(&format!(
                        "exam scrape {}/{} failed: {}",
                        job.year, job.semester, error
                    ));
                }
            }
        }
        Ok(outcome)
    }

    /// Fetch, parse and persist one semester's exam timetable.
    ///
    /// Returns the number of records written.
    pub async fn scrape_job(
        &self,
        job: &ScrapeJob,
        age: CacheAge,
        logger: &dyn Logger,
    ) -> Result<usize> {
        let url = self.exam_url(job);
        let bytes = self.fetcher.fetch(&url, age, logger).await?;
        let records = parse_exam_document(&bytes, logger)?;

        logger.info(&format!(
            "parsed {} exam records for {}/{}",
            records.len(),
            job.year,
            job.semester
        ));

        let dest = self.job_dest(job);
        tokio::fs::create_dir_all(&dest).await?;
        let payload = serde_json::to_vec_pretty(&records)?;
        tokio::fs::write(dest.join(&self.config.exams.dest_file_name), payload).await?;
        Ok(records.len())
    }
}
