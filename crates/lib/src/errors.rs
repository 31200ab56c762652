use thiserror::Error;

/// Errors raised while talking to the inference provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to inference provider: {0}")]
    Request(reqwest::Error),
    #[error("Failed to deserialize inference provider response: {0}")]
    Deserialization(reqwest::Error),
    #[error("Inference provider returned an error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("API key is missing")]
    MissingApiKey,
    #[error("An inference provider is required")]
    MissingProvider,
}

/// Errors raised inside a single extraction pipeline run.
///
/// These never reach the HTTP caller. The extractor converts every variant
/// into an empty result and keeps only a [`FailureReason`] for logging.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("Provider response did not contain a parseable JSON payload")]
    UnparseableResponse,
    #[error("Provider response is missing required fields: {missing:?}")]
    Validation { missing: Vec<&'static str> },
}

impl ExtractError {
    pub fn reason(&self) -> FailureReason {
        match self {
            ExtractError::Provider(_) => FailureReason::ProviderCall,
            ExtractError::UnparseableResponse => FailureReason::UnparseableResponse,
            ExtractError::Validation { .. } => FailureReason::Validation,
        }
    }
}

/// The failure of a computation shared through [`crate::inflight::InFlight`].
///
/// Every caller waiting on the same fingerprint receives a clone of the same value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettleError<E> {
    #[error("{0}")]
    Failed(E),
    #[error("In-flight computation aborted: {0}")]
    Aborted(String),
}

/// Why an extraction produced empty details.
///
/// Carried on [`crate::types::ExtractionResult`] for logs only; it is never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    MissingFile,
    ProviderCall,
    UnparseableResponse,
    Validation,
    Aborted,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureReason::MissingFile => "missing_file",
            FailureReason::ProviderCall => "provider_call",
            FailureReason::UnparseableResponse => "unparseable_response",
            FailureReason::Validation => "validation",
            FailureReason::Aborted => "aborted",
        };
        f.write_str(s)
    }
}
