// src/models/mod.rs

//! Domain models for the scraper application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod exam;
mod job;
mod module;

// Re-export all public types
pub use config::{Config, ConsolidateConfig, ExamTaskConfig, ScraperConfig, YearRange};
pub use exam::ExamRecord;
pub use job::ScrapeJob;
pub use module::{MODULE_CODE_FIELD, ModuleFields, identity_of};
