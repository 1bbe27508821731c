//! Parsed exam timetable records.

use serde::{Deserialize, Serialize};

/// One row of a parsed exam timetable.
///
/// Field names serialize in the upstream PascalCase form so scrape output
/// stays byte-compatible with the documents consumed downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRecord {
    /// Exam date in `D/M/YYYY` form, delimiters normalized to `/`
    #[serde(rename = "Date")]
    pub date: String,

    /// Exam time as matched, AM/PM-qualified, internal whitespace removed
    #[serde(rename = "Time")]
    pub time: String,

    /// Faculty running the exam
    #[serde(rename = "Faculty")]
    pub faculty: String,

    /// Module code, e.g. `CS1010`
    #[serde(rename = "ModuleCode")]
    pub module_code: String,

    /// Module title
    #[serde(rename = "Title")]
    pub title: String,
}
