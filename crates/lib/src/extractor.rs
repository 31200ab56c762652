//! # Extraction Orchestrator
//!
//! [`Extractor`] ties the pipeline together: it fingerprints a request, runs
//! (or joins) the optimize → prompt → provider → parse → validate → normalize
//! sequence through the in-flight table, and turns every failure into an
//! empty result of the requested type.

use crate::{
    envelope,
    errors::{ExtractError, FailureReason, ProviderError, SettleError},
    fingerprint::{FingerprintMode, RequestFingerprint},
    inflight::InFlight,
    normalize::normalize,
    optimizer::{DocumentOptimizer, ImageOptimizer},
    prompts,
    providers::ai::{GenerationSettings, InferenceProvider, InferenceRequest},
    types::{Details, DocumentType, ExtractionRequest, ExtractionResult, InputDocument},
    validate,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

type PendingExtractions = InFlight<RequestFingerprint, Details, Arc<ExtractError>>;

/// Runs document extractions against an inference provider.
///
/// Cloning is cheap and clones share the same in-flight table.
#[derive(Clone, Debug)]
pub struct Extractor {
    pipeline: Pipeline,
    fingerprint_mode: FingerprintMode,
    inflight: PendingExtractions,
}

/// A builder for creating [`Extractor`] instances.
#[derive(Default)]
pub struct ExtractorBuilder {
    provider: Option<Arc<dyn InferenceProvider>>,
    optimizer: Option<Arc<dyn DocumentOptimizer>>,
    generation: GenerationSettings,
    fingerprint_mode: FingerprintMode,
}

impl ExtractorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inference provider. Required.
    pub fn provider(mut self, provider: Arc<dyn InferenceProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the upload optimizer. Defaults to [`ImageOptimizer`] with default limits.
    pub fn optimizer(mut self, optimizer: Arc<dyn DocumentOptimizer>) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    pub fn generation(mut self, generation: GenerationSettings) -> Self {
        self.generation = generation;
        self
    }

    pub fn fingerprint_mode(mut self, mode: FingerprintMode) -> Self {
        self.fingerprint_mode = mode;
        self
    }

    pub fn build(self) -> Result<Extractor, ProviderError> {
        let provider = self.provider.ok_or(ProviderError::MissingProvider)?;
        let optimizer = self
            .optimizer
            .unwrap_or_else(|| Arc::new(ImageOptimizer::default()));
        Ok(Extractor {
            pipeline: Pipeline {
                provider,
                optimizer,
                generation: self.generation,
            },
            fingerprint_mode: self.fingerprint_mode,
            inflight: InFlight::new(),
        })
    }
}

impl Extractor {
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::new()
    }

    /// Extracts the fields of `request.document_type` from the uploaded document.
    ///
    /// Never fails. Without a document, or when any pipeline step fails, the
    /// result has empty details and `failure` records why.
    pub async fn extract(&self, request: ExtractionRequest) -> ExtractionResult {
        let document_type = request.document_type;
        let Some(document) = request.document else {
            info!(%document_type, "No file uploaded, returning empty details");
            return ExtractionResult::empty(document_type, FailureReason::MissingFile);
        };

        let fingerprint = RequestFingerprint::new(&document, document_type, self.fingerprint_mode);
        let pipeline = self.pipeline.clone();
        let outcome = self
            .inflight
            .submit(fingerprint.clone(), move || async move {
                pipeline.run(document, document_type).await.map_err(Arc::new)
            })
            .await;

        match outcome {
            Ok(details) => {
                info!(%fingerprint, fields = details.len(), "Extraction succeeded");
                ExtractionResult::populated(document_type, details)
            }
            Err(SettleError::Failed(e)) => {
                warn!(%fingerprint, reason = %e.reason(), "Extraction failed: {e}");
                ExtractionResult::empty(document_type, e.reason())
            }
            Err(SettleError::Aborted(e)) => {
                warn!(%fingerprint, "Extraction aborted: {e}");
                ExtractionResult::empty(document_type, FailureReason::Aborted)
            }
        }
    }
}

/// The per-request work shared through the in-flight table.
#[derive(Clone, Debug)]
struct Pipeline {
    provider: Arc<dyn InferenceProvider>,
    optimizer: Arc<dyn DocumentOptimizer>,
    generation: GenerationSettings,
}

impl Pipeline {
    async fn run(
        self,
        document: InputDocument,
        document_type: DocumentType,
    ) -> Result<Details, ExtractError> {
        let optimized = self.optimizer.optimize(document).await;
        debug!(
            file = %optimized.original_name,
            mime_type = %optimized.mime_type,
            size = optimized.size,
            optimized = optimized.is_optimized,
            "Prepared upload"
        );

        let instruction = prompts::select(document_type, &optimized.mime_type);
        let request = InferenceRequest {
            prompt: instruction.prompt.to_string(),
            schema: instruction.schema,
            data: general_purpose::STANDARD.encode(&optimized.bytes),
            mime_type: optimized.mime_type,
            generation: self.generation,
        };

        let raw = self.provider.generate(&request).await?;
        let parsed = envelope::parse(&raw).ok_or(ExtractError::UnparseableResponse)?;
        if !validate::validate(&parsed, document_type) {
            return Err(ExtractError::Validation {
                missing: validate::missing_fields(&parsed, document_type),
            });
        }

        let details = collect_details(&parsed, document_type);
        Ok(normalize(&details, document_type))
    }
}

/// Copies the declared fields of `parsed.details` into a string map.
///
/// Numbers and booleans are stringified; nulls, arrays and objects are dropped.
fn collect_details(parsed: &Value, document_type: DocumentType) -> Details {
    let policy = document_type.policy();
    let Some(details) = parsed.get("details").and_then(Value::as_object) else {
        return Details::new();
    };
    details
        .iter()
        .filter(|(key, _)| policy.allows(key))
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collect_details_keeps_declared_fields_only() {
        let parsed = json!({
            "details": {
                "account_number": 12345678901u64,
                "routing_number": "123456789",
                "name": "Not a bank field",
                "branch": { "code": 1 }
            }
        });
        let details = collect_details(&parsed, DocumentType::Bank);
        assert_eq!(details.len(), 2);
        assert_eq!(details["account_number"], "12345678901");
        assert_eq!(details["routing_number"], "123456789");
    }

    #[test]
    fn test_collect_details_drops_nulls() {
        let parsed = json!({ "details": { "bo_id": null } });
        assert!(collect_details(&parsed, DocumentType::Bo).is_empty());
    }
}
