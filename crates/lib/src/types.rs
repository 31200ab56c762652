//! # Core Data Types
//!
//! The request and result types that flow through the extraction pipeline.

use crate::errors::FailureReason;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The extracted-field payload returned to the caller.
pub type Details = BTreeMap<String, String>;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// The kind of document supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    /// National ID card.
    #[serde(rename = "NID")]
    Nid,
    /// Beneficial-owner certificate.
    #[serde(rename = "BO")]
    Bo,
    /// Tax identification certificate.
    #[serde(rename = "TIN")]
    Tin,
    /// Bank document (cheque leaf, statement).
    #[serde(rename = "BANK")]
    Bank,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Nid,
        DocumentType::Bo,
        DocumentType::Tin,
        DocumentType::Bank,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Nid => "NID",
            DocumentType::Bo => "BO",
            DocumentType::Tin => "TIN",
            DocumentType::Bank => "BANK",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of `NID`, `BO`, `TIN`, `BANK`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported document type '{0}'. Expected one of NID, BO, TIN, BANK")]
pub struct UnknownDocumentType(pub String);

impl FromStr for DocumentType {
    type Err = UnknownDocumentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NID" => Ok(DocumentType::Nid),
            "BO" => Ok(DocumentType::Bo),
            "TIN" => Ok(DocumentType::Tin),
            "BANK" => Ok(DocumentType::Bank),
            other => Err(UnknownDocumentType(other.to_string())),
        }
    }
}

/// An uploaded file, owned by the request that carried it.
#[derive(Debug, Clone)]
pub struct InputDocument {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub original_name: String,
    pub size: usize,
}

impl InputDocument {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, original_name: impl Into<String>) -> Self {
        let size = bytes.len();
        Self {
            bytes,
            mime_type: mime_type.into(),
            original_name: original_name.into(),
            size,
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == PDF_MIME_TYPE || self.original_name.to_lowercase().ends_with(".pdf")
    }
}

/// The unit of work handed to the extractor.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub document: Option<InputDocument>,
    pub document_type: DocumentType,
}

/// The response body of the OCR endpoint.
///
/// `failure` is internal bookkeeping: every failure path serializes to the same
/// `{ "type": ..., "details": {} }` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub details: Details,
    #[serde(skip)]
    pub failure: Option<FailureReason>,
}

impl ExtractionResult {
    pub fn populated(document_type: DocumentType, details: Details) -> Self {
        Self {
            document_type,
            details,
            failure: None,
        }
    }

    pub fn empty(document_type: DocumentType, reason: FailureReason) -> Self {
        Self {
            document_type,
            details: Details::new(),
            failure: Some(reason),
        }
    }
}
