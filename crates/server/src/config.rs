//! # Application Configuration
//!
//! This module defines the configuration structure for the `kycocr-server` and
//! provides the logic for loading it from an optional `config.yml` file and
//! environment variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use kycocr::optimizer::OptimizerSettings;
use kycocr::providers::ai::gemini::DEFAULT_GEMINI_MODEL;
use kycocr::providers::ai::GenerationSettings;
use kycocr::FingerprintMode;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The largest accepted multipart body, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// The Gemini API key. Loaded from `GEMINI_API_KEY` env var.
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub optimizer: OptimizerSettings,
    /// `metadata` (size, type, filename) or `content` (adds an MD5 of the bytes).
    #[serde(default)]
    pub fingerprint_mode: FingerprintMode,
}

/// Provides a default value for the `port` field if not set in the environment.
fn default_port() -> u16 {
    3000
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

/// Connection settings for the inference provider.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// The API URL. Derived from the model name when absent.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Overall HTTP timeout for one provider call. No timeout when absent.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_model_name() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            model_name: default_model_name(),
            timeout_secs: None,
        }
    }
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(format!("Invalid substitution pattern: {e}")))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// Layers, lowest precedence first:
/// - Serde defaults on `AppConfig`.
/// - The YAML file at `config_path_override`, or `config.yml` next to the
///   crate manifest if it exists. `${VAR}` placeholders are substituted from
///   the environment.
/// - Environment variables for top-level keys (`PORT`, `GEMINI_API_KEY`).
/// - `KYCOCR_...` variables for nested keys (e.g. `KYCOCR_PROVIDER__MODEL_NAME`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Config file not found at '{path}'."))
            })?;
            info!("Loading configuration from '{path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None => {
            let default_path = format!("{}/config.yml", env!("CARGO_MANIFEST_DIR"));
            if let Some(content) = read_and_substitute(&default_path)? {
                info!("Loading user-defined configuration from '{default_path}'.");
                builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
            }
        }
    }

    let settings = builder
        .add_source(Environment::default())
        .add_source(
            Environment::with_prefix("KYCOCR")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
