// src/error.rs

//! Unified error handling for the scraper application.

use std::fmt;

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream returned a status that is neither 200 nor 304
    #[error("Unexpected status {status} fetching {url}")]
    Status { status: u16, url: String },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// PDF document could not be loaded or read
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Exam record carried a date that is not a real calendar date
    #[error("Module {code}'s date format is wrong: {date}")]
    InvalidExamDate { code: String, date: String },

    /// Two records with different identity keys were passed to a merge
    #[error("Identity mismatch: expected module code {expected}, found {found}")]
    IdentityMismatch { expected: String, found: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Scraping error with job context
    #[error("Scrape error for {context}: {message}")]
    Scrape { context: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a scrape error with job context.
    pub fn scrape(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Scrape {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid-date error naming the offending record.
    pub fn invalid_exam_date(code: impl Into<String>, date: impl Into<String>) -> Self {
        Self::InvalidExamDate {
            code: code.into(),
            date: date.into(),
        }
    }

    /// Create an identity-mismatch error for a merge call.
    pub fn identity_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::IdentityMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
