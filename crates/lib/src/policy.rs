//! # Document-Type Policy
//!
//! One table entry per [`DocumentType`] holding everything type-specific: the
//! fields the provider schema declares, which of them the schema marks as
//! required, which of them must be present for a response to be accepted, and
//! the normalization applied to accepted details.

use crate::normalize;
use crate::types::{Details, DocumentType};
use serde_json::{json, Map, Value};

/// Per-type extraction policy.
#[derive(Debug)]
pub struct DocumentPolicy {
    /// Every field the provider may return for this type, in schema order.
    pub fields: &'static [&'static str],
    /// Fields the response schema marks as `required`.
    pub schema_required: &'static [&'static str],
    /// Fields that must be present and non-empty for the response to be accepted.
    pub required: &'static [&'static str],
    /// Post-processing applied to accepted details.
    pub normalize: fn(&mut Details),
}

static NID_POLICY: DocumentPolicy = DocumentPolicy {
    fields: &["name", "date_of_birth", "nid_number"],
    schema_required: &["name", "date_of_birth", "nid_number"],
    required: &["name", "date_of_birth", "nid_number"],
    normalize: normalize::nid,
};

static BO_POLICY: DocumentPolicy = DocumentPolicy {
    fields: &["bo_id"],
    schema_required: &["bo_id"],
    required: &["bo_id"],
    normalize: normalize::bo,
};

static TIN_POLICY: DocumentPolicy = DocumentPolicy {
    fields: &["tin_number"],
    schema_required: &["tin_number"],
    required: &["tin_number"],
    normalize: normalize::tin,
};

// routing_number is requested from the provider but not enforced on acceptance.
static BANK_POLICY: DocumentPolicy = DocumentPolicy {
    fields: &["account_number", "routing_number"],
    schema_required: &["account_number", "routing_number"],
    required: &["account_number"],
    normalize: normalize::bank,
};

impl DocumentType {
    pub fn policy(&self) -> &'static DocumentPolicy {
        match self {
            DocumentType::Nid => &NID_POLICY,
            DocumentType::Bo => &BO_POLICY,
            DocumentType::Tin => &TIN_POLICY,
            DocumentType::Bank => &BANK_POLICY,
        }
    }
}

impl DocumentPolicy {
    /// Builds the provider-side response schema.
    ///
    /// The shape is `{ details: { <field>: STRING, ... } }` using the uppercase
    /// type names of the Gemini `responseSchema` dialect.
    pub fn response_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.to_string(), json!({ "type": "STRING" })))
            .collect();

        json!({
            "type": "OBJECT",
            "properties": {
                "details": {
                    "type": "OBJECT",
                    "properties": properties,
                    "required": self.schema_required,
                }
            },
            "required": ["details"],
        })
    }

    pub fn allows(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields_are_declared_fields() {
        for t in DocumentType::ALL {
            let policy = t.policy();
            for f in policy.required.iter().chain(policy.schema_required) {
                assert!(policy.allows(f), "{t}: '{f}' is not a declared field");
            }
        }
    }

    #[test]
    fn test_bank_schema_requires_routing_number_but_policy_does_not() {
        let policy = DocumentType::Bank.policy();
        let schema = policy.response_schema();
        assert_eq!(
            schema["properties"]["details"]["required"],
            json!(["account_number", "routing_number"])
        );
        assert_eq!(policy.required, &["account_number"]);
    }

    #[test]
    fn test_nid_schema_shape() {
        let schema = DocumentType::Nid.policy().response_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["required"], json!(["details"]));
        let props = schema["properties"]["details"]["properties"]
            .as_object()
            .unwrap();
        assert_eq!(props.len(), 3);
        assert_eq!(props["nid_number"], json!({ "type": "STRING" }));
    }
}
