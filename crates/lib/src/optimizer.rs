//! # Upload Optimization
//!
//! Shrinks raster uploads before they are sent to the provider. Images are
//! fitted inside a bounding box (never enlarged) and re-encoded as JPEG. PDFs
//! and unsupported media pass through untouched.
//!
//! Optimization is best-effort: any decode or encode failure returns the
//! original bytes.

use crate::types::InputDocument;
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageError;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, warn};

const OPTIMIZABLE_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/bmp",
    "image/tiff",
];

/// A document after optimization.
#[derive(Debug, Clone)]
pub struct OptimizedDocument {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub original_name: String,
    pub size: usize,
    /// `true` when the bytes were transcoded.
    pub is_optimized: bool,
}

impl OptimizedDocument {
    pub fn unchanged(document: InputDocument) -> Self {
        Self {
            size: document.size,
            bytes: document.bytes,
            mime_type: document.mime_type,
            original_name: document.original_name,
            is_optimized: false,
        }
    }
}

/// Prepares a document for upload to the inference provider.
///
/// Implementations must not fail: on any internal error they return the input unchanged.
#[async_trait]
pub trait DocumentOptimizer: Send + Sync + Debug {
    async fn optimize(&self, document: InputDocument) -> OptimizedDocument;
}

/// Limits applied by [`ImageOptimizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OptimizerSettings {
    #[serde(default = "default_max_dimension")]
    pub max_width: u32,
    #[serde(default = "default_max_dimension")]
    pub max_height: u32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_max_dimension() -> u32 {
    800
}

fn default_jpeg_quality() -> u8 {
    75
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            max_width: default_max_dimension(),
            max_height: default_max_dimension(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// Resizes and re-encodes raster images with the `image` crate.
#[derive(Debug, Clone, Default)]
pub struct ImageOptimizer {
    settings: OptimizerSettings,
}

impl ImageOptimizer {
    pub fn new(settings: OptimizerSettings) -> Self {
        Self { settings }
    }

    fn should_transcode(document: &InputDocument) -> bool {
        !document.is_pdf() && OPTIMIZABLE_IMAGE_TYPES.contains(&document.mime_type.as_str())
    }
}

fn transcode(bytes: &[u8], settings: OptimizerSettings) -> Result<Vec<u8>, ImageError> {
    let mut img = image::load_from_memory(bytes)?;
    if img.width() > settings.max_width || img.height() > settings.max_height {
        // `resize` keeps the aspect ratio and fits inside the given bounds.
        img = img.resize(settings.max_width, settings.max_height, FilterType::Triangle);
    }

    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, settings.jpeg_quality);
    encoder.encode_image(&img.to_rgb8())?;
    Ok(buffer)
}

#[async_trait]
impl DocumentOptimizer for ImageOptimizer {
    async fn optimize(&self, document: InputDocument) -> OptimizedDocument {
        if !Self::should_transcode(&document) {
            return OptimizedDocument::unchanged(document);
        }

        let settings = self.settings;
        let bytes = document.bytes.clone();
        let transcoded = tokio::task::spawn_blocking(move || transcode(&bytes, settings)).await;

        match transcoded {
            Ok(Ok(bytes)) => {
                debug!(
                    file = %document.original_name,
                    before = document.size,
                    after = bytes.len(),
                    "Transcoded upload to JPEG"
                );
                OptimizedDocument {
                    size: bytes.len(),
                    bytes,
                    mime_type: "image/jpeg".to_string(),
                    original_name: document.original_name,
                    is_optimized: true,
                }
            }
            Ok(Err(e)) => {
                warn!(file = %document.original_name, "Image optimization failed, sending original: {e}");
                OptimizedDocument::unchanged(document)
            }
            Err(e) => {
                warn!(file = %document.original_name, "Image optimization task failed, sending original: {e}");
                OptimizedDocument::unchanged(document)
            }
        }
    }
}
