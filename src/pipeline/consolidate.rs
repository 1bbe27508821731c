// src/pipeline/consolidate.rs

//! Consolidation of scraped records into per-module documents.
//!
//! Each (year, semester) directory may hold several source documents
//! describing overlapping sets of modules. Records sharing a module code
//! are folded through the merge engine in configured source order, so a
//! later source is authoritative on unresolved conflicts, and the result
//! is materialized as one JSON document per module.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Config, ModuleFields, identity_of};
use crate::pipeline::merge_module_fields;
use crate::storage::write_record;
use crate::utils::log::Logger;

/// Consolidate one semester's scraped sources.
///
/// Missing source files are reported and skipped; a malformed source file
/// is an error for the semester. Returns the number of modules written.
pub async fn consolidate_semester(
    config: &Config,
    year: i32,
    semester: u32,
    logger: &dyn Logger,
) -> Result<usize> {
    let semester_dir = format!("{}-{}/{}", year, year + 1, semester);
    let src = Path::new(&config.consolidate.src_folder).join(&semester_dir);

    // Bucket records by module code, preserving source order within a code.
    let mut buckets: BTreeMap<String, Vec<ModuleFields>> = BTreeMap::new();
    let mut missing: Vec<&str> = Vec::new();
    for source in &config.consolidate.sources {
        let bytes = match tokio::fs::read(src.join(source)).await {
            Ok(bytes) => bytes,
            Err(_) => {
                missing.push(source.as_str());
                continue;
            }
        };
        let records: Vec<ModuleFields> = serde_json::from_slice(&bytes)?;
        for record in records {
            match identity_of(&record).map(str::to_string) {
                Some(code) => buckets.entry(code).or_default().push(record),
                None => {
                    logger.warn(&format!(
                        "{source} in {semester_dir} has a record without a module code, skipping it"
                    ));
                }
            }
        }
    }
    if !missing.is_empty() {
        logger.info(&format!(
            "{} not found, continuing with consolidating",
            missing.join(", ")
        ));
    }

    let dest = Path::new(&config.consolidate.dest_folder).join(&semester_dir);
    let mut written = 0;
    for (code, records) in buckets {
        let mut records = records.into_iter();
        let Some(mut merged) = records.next() else {
            continue;
        };
        for record in records {
            merged = merge_module_fields(&code, &merged, &record, logger)?;
        }
        let value = serde_json::to_value(&merged)?;
        write_record(&dest, &code, &config.consolidate.dest_file_name, &value).await?;
        written += 1;
    }

    logger.info(&format!("consolidated {written} modules for {semester_dir}"));
    Ok(written)
}

/// Run consolidation for every (year, semester) in the configured matrix.
///
/// A semester whose source directory does not exist yet is skipped; other
/// failures abort the run.
pub async fn run_consolidate(config: Arc<Config>, logger: &dyn Logger) -> Result<usize> {
    let mut total = 0;
    for year in config.years.from..config.years.to {
        for &semester in &config.semesters {
            let src = Path::new(&config.consolidate.src_folder)
                .join(format!("{}-{}", year, year + 1))
                .join(semester.to_string());
            if !src.is_dir() {
                logger.info(&format!(
                    "no scraped data for {year}/{semester}, skipping consolidation"
                ));
                continue;
            }
            total += consolidate_semester(&config, year, semester, logger).await?;
        }
    }
    log::info!("consolidation finished: {total} modules");
    Ok(total)
}
