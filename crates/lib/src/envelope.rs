//! # Response Envelope Parsing
//!
//! The provider nests its JSON answer in one of several shapes depending on the
//! endpoint and encoding used:
//!
//! - `candidates[0].content.parts[0].text` (regular `generateContent`)
//! - `candidates[0].content.parts[0].inlineData.data` (base64 encoded bytes)
//! - a top-level `text` field (SDK convenience wrappers)
//!
//! Shapes are tried in that order and the first one that yields a JSON value
//! wins. Malformed JSON never produces a partial value.
//!
//! A shape that is present but malformed does not end the search. If the
//! candidate text is not valid JSON, a top-level `text` field is still tried
//! before giving up.

use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;
use tracing::debug;

/// One place an answer can live inside a provider envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape<'a> {
    CandidateText(&'a str),
    CandidateInlineData(&'a str),
    TopLevelText(&'a str),
}

impl<'a> EnvelopeShape<'a> {
    /// Lists the shapes present in `raw`, highest priority first.
    pub fn detect(raw: &'a Value) -> Vec<EnvelopeShape<'a>> {
        let mut shapes = Vec::with_capacity(2);

        if let Some(part) = first_candidate_part(raw) {
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                shapes.push(EnvelopeShape::CandidateText(text));
            } else if let Some(data) = part
                .get("inlineData")
                .or_else(|| part.get("inline_data"))
                .and_then(|d| d.get("data"))
                .and_then(Value::as_str)
            {
                shapes.push(EnvelopeShape::CandidateInlineData(data));
            }
        }

        if let Some(text) = raw.get("text").and_then(Value::as_str) {
            shapes.push(EnvelopeShape::TopLevelText(text));
        }

        shapes
    }

    /// Extracts the JSON answer carried by this shape.
    pub fn extract(&self) -> Option<Value> {
        match self {
            EnvelopeShape::CandidateText(text) | EnvelopeShape::TopLevelText(text) => {
                parse_strict(text)
            }
            EnvelopeShape::CandidateInlineData(data) => {
                let bytes = general_purpose::STANDARD.decode(data).ok()?;
                let text = String::from_utf8(bytes).ok()?;
                parse_strict(&text)
            }
        }
    }
}

fn first_candidate_part(raw: &Value) -> Option<&Value> {
    raw.get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?
        .first()
        .filter(|part| part.is_object())
}

fn parse_strict(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Discarding malformed JSON from provider envelope: {e}");
            None
        }
    }
}

/// Returns the JSON answer nested in a provider response, if any.
pub fn parse(raw: &Value) -> Option<Value> {
    EnvelopeShape::detect(raw)
        .iter()
        .find_map(EnvelopeShape::extract)
}
