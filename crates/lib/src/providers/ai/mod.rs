pub mod gemini;

use crate::errors::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Debug;

/// Sampling settings sent with every extraction request.
///
/// The defaults pin the provider to deterministic, short answers with no
/// extended reasoning budget.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GenerationSettings {
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default)]
    pub thinking_budget: u32,
}

fn default_max_output_tokens() -> u32 {
    256
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_output_tokens: default_max_output_tokens(),
            thinking_budget: 0,
        }
    }
}

/// A single-turn extraction request: one instruction and one inline attachment.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub prompt: String,
    /// The JSON schema the answer must follow.
    pub schema: Value,
    pub mime_type: String,
    /// The attachment, base64 encoded.
    pub data: String,
    pub generation: GenerationSettings,
}

/// A trait for interacting with a multimodal inference provider.
///
/// Implementations return the provider's raw response envelope. Locating the
/// JSON answer inside it is left to [`crate::envelope`].
#[async_trait]
pub trait InferenceProvider: Send + Sync + Debug {
    async fn generate(&self, request: &InferenceRequest) -> Result<Value, ProviderError>;
}
