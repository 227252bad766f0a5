//! Placeholder substitution.
//!
//! Replacement is exact-match only: a string equal to
//! [`APP_ID_PLACEHOLDER`] becomes the identifier, any other string is kept as
//! is, even if it contains the token. Object keys are never rewritten here;
//! document-id keys are handled by the importer.

use serde_json::{Map, Value};

use crate::contract::Fields;
use crate::seed::APP_ID_PLACEHOLDER;

/// Return a copy of `value` with every placeholder string replaced by `app_id`.
pub fn substitute(value: &Value, app_id: &str) -> Value {
    match value {
        Value::String(s) if s == APP_ID_PLACEHOLDER => Value::String(app_id.to_string()),
        Value::String(s) => Value::String(s.clone()),
        Value::Array(items) => Value::Array(items.iter().map(|v| substitute(v, app_id)).collect()),
        Value::Object(map) => Value::Object(substitute_fields(map, app_id)),
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
    }
}

/// Substitute every value of a field map, keeping its keys.
pub fn substitute_fields(fields: &Fields, app_id: &str) -> Fields {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), substitute(v, app_id)))
        .collect::<Map<String, Value>>()
}

/// Effective document id for a raw seed key.
pub fn resolve_document_id<'a>(raw_id: &'a str, app_id: &'a str) -> &'a str {
    if raw_id == APP_ID_PLACEHOLDER {
        app_id
    } else {
        raw_id
    }
}
