//! # Identity and Financial Document Extraction
//!
//! This crate turns an uploaded national ID, beneficial-owner certificate, tax
//! certificate or bank document into a small structured record by delegating
//! the reading itself to a multimodal inference provider.
//!
//! The crate owns everything around that call: choosing the prompt and output
//! schema for a document type, locating the JSON answer in the provider's
//! response envelope, checking required fields, normalizing values, and making
//! sure identical concurrent uploads share a single provider call.
//!
//! The entry point is [`Extractor`], built with [`ExtractorBuilder`].

pub mod envelope;
pub mod errors;
pub mod extractor;
pub mod fingerprint;
pub mod inflight;
pub mod normalize;
pub mod optimizer;
pub mod policy;
pub mod prompts;
pub mod providers;
pub mod types;
pub mod validate;

pub use errors::{ExtractError, FailureReason, ProviderError, SettleError};
pub use extractor::{Extractor, ExtractorBuilder};
pub use fingerprint::{FingerprintMode, RequestFingerprint};
pub use types::{Details, DocumentType, ExtractionRequest, ExtractionResult, InputDocument};
