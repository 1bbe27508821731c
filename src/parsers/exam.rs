// src/parsers/exam.rs

//! Exam timetable grammar.
//!
//! The upstream exam timetable is published as a PDF whose text extraction
//! order runs bottom-to-top relative to logical record order, with each
//! record's cells also emitted in reverse. `normalize_tokens` is the
//! isolated stage that undoes this layout quirk; `parse_record_group`
//! extracts typed fields from one normalized record group. Keeping the two
//! apart means a layout change upstream breaks one small, separately
//! tested function instead of the whole parser.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::ExamRecord;
use crate::parsers::pdf::extract_pages;
use crate::utils::log::Logger;

/// Matches dd/mm/yyyy down to d/m/yy with any single non-word delimiter.
static DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}\W\d{1,2}\W[20]{0,2}\d{2}").unwrap());

/// Matches 0900AM, 900PM or 9:00 PM, anchored to the end of a record.
/// The numeric core is captured; the two-letter period marker is not
/// validated so a glitched marker still yields the time digits.
static TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-2]?[1-9]\W?[0-5]\d)\s?[A-Z]{2}$").unwrap());

/// A faculty abbreviation cell: exactly three capital letters.
static FACULTY_START_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());

/// Strict D/M/YYYY shape required after delimiter normalization.
static DATE_FORM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").unwrap());

/// Column boundaries inside one extracted text cell.
static COLUMN_SPLIT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Regroup raw per-page tokens into per-record token groups, in source
/// reading order.
///
/// Stages, in order:
/// 1. Per page, drop leading tokens before the first faculty abbreviation
///    and trailing tokens after the last `AM`/`PM` (headers, footers, page
///    numbers). Pages left with nothing are warned about and skipped.
/// 2. Flatten, trim, drop empty tokens, reverse the whole sequence.
/// 3. Start a new group at every `AM`/`PM` token; split each cell on runs
///    of two or more whitespace characters and append the sub-cells in
///    reverse.
/// 4. Un-reverse each group and the group list, restoring top-to-bottom
///    record order.
pub fn normalize_tokens(pages: &[Vec<String>], logger: &dyn Logger) -> Vec<Vec<String>> {
    let mut flat: Vec<&str> = Vec::new();
    for (index, page) in pages.iter().enumerate() {
        let start = page
            .iter()
            .position(|t| FACULTY_START_REGEX.is_match(t.trim()));
        let end = page.iter().rposition(|t| is_period_marker(t.trim()));

        match (start, end) {
            (Some(start), Some(end)) if start <= end => {
                flat.extend(page[start..=end].iter().map(String::as_str));
            }
            _ => {
                logger.warn(&format!(
                    "page {} of pdf has no data, please visually check if this is correct",
                    index + 1
                ));
            }
        }
    }

    let mut tokens: Vec<&str> = flat.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect();
    tokens.reverse();

    let mut groups: Vec<Vec<String>> = Vec::new();
    for token in tokens {
        if is_period_marker(token) {
            groups.push(Vec::new());
        }
        let Some(group) = groups.last_mut() else {
            continue;
        };
        let mut cells: Vec<&str> = COLUMN_SPLIT_REGEX
            .split(token)
            .filter(|c| !c.is_empty())
            .collect();
        cells.reverse();
        group.extend(cells.into_iter().map(str::to_string));
    }

    for group in &mut groups {
        group.reverse();
    }
    groups.reverse();
    groups
}

fn is_period_marker(token: &str) -> bool {
    token == "AM" || token == "PM"
}

/// Find the exam date in a joined record string, delimiters normalized
/// to `/`.
pub fn match_date(text: &str) -> Option<String> {
    DATE_REGEX.find(text).map(|m| {
        m.as_str()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '/' })
            .collect()
    })
}

/// Find the exam time at the end of a joined record string.
///
/// Returns the numeric core and the full qualified time with internal
/// whitespace removed.
pub fn match_time(text: &str) -> Option<(String, String)> {
    TIME_REGEX.captures(text).map(|caps| {
        let core = caps[1].to_string();
        let qualified: String = caps[0].split_whitespace().collect();
        (core, qualified)
    })
}

/// Extract a typed exam record from one normalized token group.
///
/// The first cell is the faculty; the module code and the first word of
/// the title share the second cell; the title runs until the first cell
/// containing a digit. The date must be a real calendar date in strict
/// D/M/YYYY form.
pub fn parse_record_group(tokens: &[String]) -> Result<ExamRecord> {
    let joined = tokens.join(" ");

    let (date, time) = match (match_date(&joined), match_time(&joined)) {
        (Some(date), Some((_, time))) => (date, time),
        _ => {
            return Err(AppError::validation(format!(
                "'{joined}' is not a valid exam record"
            )));
        }
    };

    if tokens.len() < 2 {
        return Err(AppError::validation(format!(
            "'{joined}' is not a valid exam record"
        )));
    }
    let faculty = tokens[0].clone();

    let mut code_cell = tokens[1].split_whitespace();
    let Some(code) = code_cell.next() else {
        return Err(AppError::validation(format!(
            "'{joined}' is not a valid exam record"
        )));
    };
    let first_title_word = code_cell.collect::<Vec<_>>().join(" ");

    let mut title_words: Vec<&str> = Vec::new();
    if !first_title_word.is_empty() {
        title_words.push(&first_title_word);
    }
    for token in &tokens[2..] {
        if token.chars().any(|c| c.is_ascii_digit()) {
            break;
        }
        title_words.push(token);
    }
    let title = title_words.join(" ").trim().to_string();

    if !DATE_FORM_REGEX.is_match(&date) || NaiveDate::parse_from_str(&date, "%d/%m/%Y").is_err() {
        return Err(AppError::invalid_exam_date(code, &date));
    }

    Ok(ExamRecord {
        date,
        time,
        faculty,
        module_code: code.to_string(),
        title,
    })
}

/// Parse normalized pages of tokens into exam records, in source order.
///
/// Groups that do not look like a record are warned about and dropped;
/// a record whose date fails calendar validation aborts the document so
/// the owning job can report it.
pub fn parse_exam_pages(pages: &[Vec<String>], logger: &dyn Logger) -> Result<Vec<ExamRecord>> {
    let groups = normalize_tokens(pages, logger);

    let mut records = Vec::with_capacity(groups.len());
    for group in &groups {
        match parse_record_group(group) {
            Ok(record) => records.push(record),
            Err(e @ AppError::InvalidExamDate { .. }) => return Err(e),
            Err(e) => logger.warn(&e.to_string()),
        }
    }
    Ok(records)
}

/// Parse a raw exam timetable PDF into exam records.
pub fn parse_exam_document(bytes: &[u8], logger: &dyn Logger) -> Result<Vec<ExamRecord>> {
    let pages = extract_pages(bytes)?;
    parse_exam_pages(&pages, logger)
}
