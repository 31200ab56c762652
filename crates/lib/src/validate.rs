//! # Response Validation
//!
//! Structural and presence checks on a parsed provider answer. Field formats
//! (digit counts and the like) are requested in the prompt but not enforced.

use crate::types::DocumentType;
use serde_json::Value;

/// Whether a JSON value counts as present.
///
/// Empty strings, `null`, `false` and zero are absent. Objects and arrays are
/// absent too: only scalars can be carried into the details map.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Lists the required fields of `document_type` that `parsed.details` lacks.
///
/// Returns every required field when `parsed` or `parsed.details` is not an object.
pub fn missing_fields(parsed: &Value, document_type: DocumentType) -> Vec<&'static str> {
    let required = document_type.policy().required;
    let Some(details) = parsed.get("details").and_then(Value::as_object) else {
        return required.to_vec();
    };
    required
        .iter()
        .copied()
        .filter(|field| !details.get(*field).is_some_and(is_present))
        .collect()
}

/// Checks that `parsed` is `{ "details": { ... } }` with every required field present.
pub fn validate(parsed: &Value, document_type: DocumentType) -> bool {
    parsed.is_object() && missing_fields(parsed, document_type).is_empty()
}
