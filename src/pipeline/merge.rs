// src/pipeline/merge.rs

//! Field-level merge of partial module records.
//!
//! Two scrape passes frequently describe the same module with partially
//! overlapping, partially conflicting fields. This engine reconciles them
//! field by field: placeholder markers lose to real data, supersets beat
//! subsets, and a genuine conflict keeps the second record's value while
//! logging both sides. The second-argument tie-break is preserved from the
//! upstream data pipeline; swapping the arguments changes conflicting
//! fields only.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use similar::{ChangeTag, TextDiff};

use crate::error::{AppError, Result};
use crate::models::{ModuleFields, identity_of};
use crate::utils::log::Logger;
use crate::utils::truncate_graphemes;

/// Fields whose conflicts are logged at `warn` because disagreement
/// materially affects downstream correctness.
const CRITICAL_FIELDS: [&str; 7] = [
    "Department",
    "CrossModule",
    "ModuleCredit",
    "ExamDate",
    "ExamOpenBook",
    "ExamDuration",
    "ExamVenue",
];

/// Character budget for field values quoted in conflict logs.
const LOG_VALUE_BUDGET: usize = 120;

/// Conventional "no data" markers, case-insensitive, optional trailing dot.
static NULL_LIKE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:|(?:--|n/a|n\.a\.|nil|none|null)\.?)$").unwrap());

/// Whether a value is semantically absent.
fn is_null_like(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => NULL_LIKE_REGEX.is_match(s.trim()),
        _ => false,
    }
}

/// Merge two partial records describing the module `module_code`.
///
/// Either record carrying an identity field that disagrees with
/// `module_code` is a caller bug and fails the whole call. The result
/// contains a resolved value for every field name observed in either
/// input; neither input is mutated.
pub fn merge_module_fields(
    module_code: &str,
    a: &ModuleFields,
    b: &ModuleFields,
    logger: &dyn Logger,
) -> Result<ModuleFields> {
    for record in [a, b] {
        if let Some(found) = identity_of(record) {
            if found != module_code {
                return Err(AppError::identity_mismatch(module_code, found));
            }
        }
    }

    let fields: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
    let mut merged = ModuleFields::new();
    for field in fields {
        let left = a.get(field).unwrap_or(&Value::Null);
        let right = b.get(field).unwrap_or(&Value::Null);
        merged.insert(
            field.clone(),
            resolve_field(module_code, field, left, right, logger),
        );
    }
    Ok(merged)
}

/// Resolve one field according to the fixed conflict policy.
fn resolve_field(
    module_code: &str,
    field: &str,
    a: &Value,
    b: &Value,
    logger: &dyn Logger,
) -> Value {
    match (is_null_like(a), is_null_like(b)) {
        (true, true) => Value::String(String::new()),
        (true, false) => b.clone(),
        (false, true) => a.clone(),
        (false, false) => {
            if a == b {
                return a.clone();
            }
            if let Some(value) = resolve_superset(a, b) {
                return value;
            }

            let message = format!(
                "{module_code}: conflicting {field}: '{}' vs '{}', keeping the latter",
                truncate_graphemes(&display_value(a), LOG_VALUE_BUDGET),
                truncate_graphemes(&display_value(b), LOG_VALUE_BUDGET),
            );
            if CRITICAL_FIELDS.contains(&field) {
                logger.warn(&message);
            } else {
                logger.info(&message);
            }
            b.clone()
        }
    }
}

/// Keep the richer value when one side subsumes the other.
///
/// Strings compare by word-level diff: no insertions going a → b means b is
/// a subset of a, no deletions means a is a subset of b. Composite values
/// compare by deep structural containment.
fn resolve_superset(a: &Value, b: &Value) -> Option<Value> {
    match (a, b) {
        (Value::String(sa), Value::String(sb)) => {
            let diff = TextDiff::from_words(sa.as_str(), sb.as_str());
            let mut added = 0usize;
            let mut removed = 0usize;
            for change in diff.iter_all_changes() {
                match change.tag() {
                    ChangeTag::Insert => added += 1,
                    ChangeTag::Delete => removed += 1,
                    ChangeTag::Equal => {}
                }
            }
            if added == 0 {
                Some(a.clone())
            } else if removed == 0 {
                Some(b.clone())
            } else {
                None
            }
        }
        _ => {
            if contains(a, b) {
                Some(a.clone())
            } else if contains(b, a) {
                Some(b.clone())
            } else {
                None
            }
        }
    }
}

/// Deep structural containment: every part of `inner` appears in `outer`.
fn contains(outer: &Value, inner: &Value) -> bool {
    match (outer, inner) {
        (Value::Object(outer), Value::Object(inner)) => inner
            .iter()
            .all(|(key, value)| outer.get(key).is_some_and(|o| contains(o, value))),
        (Value::Array(outer), Value::Array(inner)) => inner
            .iter()
            .all(|value| outer.iter().any(|o| contains(o, value))),
        _ => outer == inner,
    }
}

/// Render a value for log output without JSON string quoting noise.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::log::{Level, MemoryLogger, NopLogger};
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> ModuleFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn null_like_markers() {
        for marker in ["", "--", "n/a", "N/A", "n.a.", "nil", "NONE", "null", "None."] {
            assert!(is_null_like(&json!(marker)), "{marker:?} should be null-like");
        }
        assert!(is_null_like(&Value::Null));
        assert!(!is_null_like(&json!("no")));
        assert!(!is_null_like(&json!("n/a and more")));
        assert!(!is_null_like(&json!(0)));
    }

    #[test]
    fn null_like_loses_to_real_data() {
        let merged = merge_module_fields(
            "CS1010",
            &record(&[("ModuleDescription", json!("n/a"))]),
            &record(&[("ModuleDescription", json!("Intro to CS"))]),
            &NopLogger,
        )
        .unwrap();
        assert_eq!(merged["ModuleDescription"], json!("Intro to CS"));
    }

    #[test]
    fn both_null_like_resolves_to_empty_string() {
        let merged = merge_module_fields(
            "CS1010",
            &record(&[("ModuleDescription", json!(""))]),
            &record(&[("ModuleDescription", json!("none"))]),
            &NopLogger,
        )
        .unwrap();
        assert_eq!(merged["ModuleDescription"], json!(""));
    }

    #[test]
    fn superset_wins_in_both_argument_orders() {
        let logger = MemoryLogger::new();
        let short = record(&[("ModuleDescription", json!("Intro"))]);
        let long = record(&[("ModuleDescription", json!("Intro to CS"))]);

        let merged = merge_module_fields("CS1010", &short, &long, &logger).unwrap();
        assert_eq!(merged["ModuleDescription"], json!("Intro to CS"));

        let merged = merge_module_fields("CS1010", &long, &short, &logger).unwrap();
        assert_eq!(merged["ModuleDescription"], json!("Intro to CS"));

        assert!(logger.entries().is_empty());
    }

    #[test]
    fn genuine_conflict_keeps_second_argument() {
        let logger = MemoryLogger::new();
        let merged = merge_module_fields(
            "CS1010",
            &record(&[("ModuleCredit", json!("4"))]),
            &record(&[("ModuleCredit", json!("5"))]),
            &logger,
        )
        .unwrap();

        assert_eq!(merged["ModuleCredit"], json!("5"));
        let warnings = logger.messages_at(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("ModuleCredit"));
    }

    #[test]
    fn non_critical_conflict_logs_at_info() {
        let logger = MemoryLogger::new();
        let merged = merge_module_fields(
            "CS1010",
            &record(&[("Workload", json!("2-1-1-3-3"))]),
            &record(&[("Workload", json!("2-1-1-4-2"))]),
            &logger,
        )
        .unwrap();

        assert_eq!(merged["Workload"], json!("2-1-1-4-2"));
        assert!(logger.messages_at(Level::Warn).is_empty());
        assert_eq!(logger.messages_at(Level::Info).len(), 1);
    }

    #[test]
    fn identity_mismatch_is_fatal() {
        let err = merge_module_fields(
            "CS1010",
            &record(&[
                ("ModuleCode", json!("MA1101R")),
                ("ModuleDescription", json!("x")),
            ]),
            &record(&[("ModuleDescription", json!("y"))]),
            &NopLogger,
        )
        .unwrap_err();

        match err {
            AppError::IdentityMismatch { expected, found } => {
                assert_eq!(expected, "CS1010");
                assert_eq!(found, "MA1101R");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fields_present_on_one_side_carry_over() {
        let merged = merge_module_fields(
            "CS1010",
            &record(&[("ExamDate", json!("2016-11-23T09:00+0800"))]),
            &record(&[("ModuleTitle", json!("Programming Methodology"))]),
            &NopLogger,
        )
        .unwrap();

        assert_eq!(merged["ExamDate"], json!("2016-11-23T09:00+0800"));
        assert_eq!(merged["ModuleTitle"], json!("Programming Methodology"));
    }

    #[test]
    fn structural_superset_keeps_richer_composite() {
        let merged = merge_module_fields(
            "CS1010",
            &record(&[("Types", json!(["Core"]))]),
            &record(&[("Types", json!(["Core", "GEM"]))]),
            &NopLogger,
        )
        .unwrap();
        assert_eq!(merged["Types"], json!(["Core", "GEM"]));
    }

    #[test]
    fn conflicting_composites_keep_second_argument() {
        let logger = MemoryLogger::new();
        let merged = merge_module_fields(
            "CS1010",
            &record(&[("Types", json!(["Core"]))]),
            &record(&[("Types", json!(["GEM"]))]),
            &logger,
        )
        .unwrap();

        assert_eq!(merged["Types"], json!(["GEM"]));
        assert_eq!(logger.messages_at(Level::Info).len(), 1);
    }

    #[test]
    fn long_conflicting_values_are_truncated_in_logs() {
        let logger = MemoryLogger::new();
        let long_a = "alpha ".repeat(60);
        let long_b = "omega ".repeat(60);
        merge_module_fields(
            "CS1010",
            &record(&[("ModuleDescription", json!(long_a))]),
            &record(&[("ModuleDescription", json!(long_b))]),
            &logger,
        )
        .unwrap();

        let logs = logger.messages_at(Level::Info);
        assert_eq!(logs.len(), 1);
        assert!(logs[0].len() < 400);
        assert!(logs[0].contains('…'));
    }

    #[test]
    fn matching_identity_fields_merge_cleanly() {
        let merged = merge_module_fields(
            "CS1010",
            &record(&[("ModuleCode", json!("CS1010")), ("ModuleCredit", json!("4"))]),
            &record(&[("ModuleCode", json!("CS1010"))]),
            &NopLogger,
        )
        .unwrap();
        assert_eq!(merged["ModuleCode"], json!("CS1010"));
        assert_eq!(merged["ModuleCredit"], json!("4"));
    }
}
