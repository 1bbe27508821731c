//! Per-scrape-job configuration.

use std::sync::Arc;

use crate::models::Config;

/// One element of the year × semester scrape matrix.
///
/// Jobs are immutable once generated; the shared base configuration is
/// carried by reference so every job sees the same settings.
#[derive(Debug, Clone)]
pub struct ScrapeJob {
    pub year: i32,
    pub semester: u32,
    pub config: Arc<Config>,
}

impl ScrapeJob {
    /// Academic year label used in output paths, e.g. `2016-2017`.
    pub fn academic_year(&self) -> String {
        format!("{}-{}", self.year, self.year + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn academic_year_spans_two_years() {
        let job = ScrapeJob {
            year: 2016,
            semester: 1,
            config: Arc::new(Config::default()),
        };
        assert_eq!(job.academic_year(), "2016-2017");
    }
}
