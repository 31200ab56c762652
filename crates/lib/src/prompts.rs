//! # Extraction Prompts
//!
//! Instruction text sent alongside each document, and the selection of
//! prompt and response schema for a request.
//!
//! The prompt only depends on the media kind. Both prompts list the full field
//! superset for every document type; the per-type response schema is what
//! constrains the fields the provider emits.

use crate::types::{DocumentType, PDF_MIME_TYPE};
use serde_json::Value;

/// The prompt used for images and any other non-PDF media.
pub const IMAGE_EXTRACTION_PROMPT: &str = r#"Extract these fields from the image:
NID: name, date_of_birth, nid_number
BO: bo_id (16 digits)
TIN: tin_number (12 digits)
BANK: account_number (11/13/17 digits), routing_number (9 digits)
- Use only visible, readable text
- Use empty string if unclear
- Keep original date/number formats
- Output valid JSON only"#;

/// The prompt used for PDF documents.
pub const PDF_EXTRACTION_PROMPT: &str = r#"Extract fields from PDF:
NID: name, date_of_birth, nid_number | BO: bo_id | TIN: tin_number | BANK: account_number, routing_number
Only use visible text. Use empty string if unclear. Return JSON."#;

/// The instruction text and output schema for one provider request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderInstruction {
    pub prompt: &'static str,
    pub schema: Value,
}

/// Chooses the prompt by media kind and the schema by document type.
pub fn select(document_type: DocumentType, mime_type: &str) -> ProviderInstruction {
    let prompt = if mime_type == PDF_MIME_TYPE {
        PDF_EXTRACTION_PROMPT
    } else {
        IMAGE_EXTRACTION_PROMPT
    };
    ProviderInstruction {
        prompt,
        schema: document_type.policy().response_schema(),
    }
}
