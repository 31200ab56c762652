//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds the configuration and the
//! single `Extractor`, whose in-flight table is shared by every request handler.

use crate::config::AppConfig;
use kycocr::{
    optimizer::ImageOptimizer,
    providers::ai::gemini::{gemini_api_url, GeminiProvider},
    Extractor,
};
use std::{sync::Arc, time::Duration};
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The application's configuration.
    pub config: Arc<AppConfig>,
    /// The extraction pipeline. Clones share one deduplication table.
    pub extractor: Extractor,
}

/// Builds the shared application state from the configuration.
///
/// Fails when no Gemini API key is configured.
pub fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let api_key = config
        .gemini_api_key
        .clone()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY is required to start the server"))?;

    // If api_url is not provided in config, construct it from the model name.
    let api_url = config
        .provider
        .api_url
        .clone()
        .unwrap_or_else(|| gemini_api_url(&config.provider.model_name));
    let timeout = config.provider.timeout_secs.map(Duration::from_secs);
    let provider = GeminiProvider::new(api_url, api_key, timeout)?;
    info!(
        model = %config.provider.model_name,
        fingerprint_mode = ?config.fingerprint_mode,
        "Initialized Gemini inference provider."
    );

    let extractor = Extractor::builder()
        .provider(Arc::new(provider))
        .optimizer(Arc::new(ImageOptimizer::new(config.optimizer)))
        .generation(config.generation)
        .fingerprint_mode(config.fingerprint_mode)
        .build()?;

    Ok(AppState {
        config: Arc::new(config),
        extractor,
    })
}
