//! # Request Fingerprints
//!
//! The key under which concurrent identical requests are deduplicated.
//!
//! The default [`FingerprintMode::Metadata`] key is built from the upload's
//! byte length, document type and original filename. It is not a content
//! hash: two different files sharing all three, uploaded at the same time,
//! receive the same result. [`FingerprintMode::Content`] adds an MD5 digest of
//! the bytes to the key for deployments where that collision is unacceptable.

use crate::types::{DocumentType, InputDocument};
use serde::Deserialize;
use std::fmt;

/// How request fingerprints are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintMode {
    #[default]
    Metadata,
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestFingerprint(String);

impl RequestFingerprint {
    pub fn new(document: &InputDocument, document_type: DocumentType, mode: FingerprintMode) -> Self {
        let key = format!(
            "{}-{}-{}",
            document.size, document_type, document.original_name
        );
        match mode {
            FingerprintMode::Metadata => Self(key),
            FingerprintMode::Content => {
                Self(format!("{key}-{:x}", md5::compute(&document.bytes)))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
