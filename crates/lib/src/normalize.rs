//! # Field Normalization
//!
//! Per-type post-processing of accepted details. Each function here is
//! referenced from the [`crate::policy`] table.

use crate::types::{Details, DocumentType};

/// Returns a normalized copy of `details` for the given document type.
pub fn normalize(details: &Details, document_type: DocumentType) -> Details {
    let mut normalized = details.clone();
    (document_type.policy().normalize)(&mut normalized);
    normalized
}

/// Removes every whitespace character.
pub fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Reformats an NID date of birth.
///
/// Dates are passed through in the format printed on the card. An empty value
/// yields `None`, which leaves the field untouched.
pub fn parse_nid_date(input: &str) -> Option<String> {
    if input.is_empty() {
        None
    } else {
        Some(input.to_string())
    }
}

fn strip_field(details: &mut Details, field: &str) {
    if let Some(value) = details.get_mut(field) {
        *value = strip_whitespace(value);
    }
}

pub(crate) fn nid(details: &mut Details) {
    if let Some(dob) = details.get("date_of_birth").and_then(|d| parse_nid_date(d)) {
        details.insert("date_of_birth".to_string(), dob);
    }
    strip_field(details, "nid_number");
}

pub(crate) fn bo(details: &mut Details) {
    strip_field(details, "bo_id");
}

pub(crate) fn tin(details: &mut Details) {
    strip_field(details, "tin_number");
}

pub(crate) fn bank(details: &mut Details) {
    strip_field(details, "account_number");
}
