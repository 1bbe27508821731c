//! CPU-bound parsing stages.
//!
//! - `pdf`: byte buffer → per-page text tokens
//! - `exam`: token stream → typed exam records

pub mod exam;
pub mod pdf;

pub use exam::{normalize_tokens, parse_exam_document, parse_exam_pages};
pub use pdf::extract_pages;
