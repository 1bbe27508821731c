//! Partially-known module records, as read from scrape output documents.

use std::collections::BTreeMap;

use serde_json::Value;

/// The identity field two records must agree on before they may be merged.
pub const MODULE_CODE_FIELD: &str = "ModuleCode";

/// A mapping from field name to field value describing one module, possibly
/// incomplete and possibly carrying placeholder markers ("n/a", "--", ...).
///
/// A `BTreeMap` keeps field iteration (and therefore conflict logging and
/// serialized output) deterministic across runs.
pub type ModuleFields = BTreeMap<String, Value>;

/// Read the identity key of a record, if it carries one.
pub fn identity_of(fields: &ModuleFields) -> Option<&str> {
    fields.get(MODULE_CODE_FIELD).and_then(Value::as_str)
}
