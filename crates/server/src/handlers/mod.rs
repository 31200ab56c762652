//! # API Route Handlers
//!
//! This module organizes the Axum route handlers for the `kycocr-server`.

pub mod general;
pub mod ocr;

// Re-export all handlers so the router can reach them under `handlers::`.
pub use general::*;
pub use ocr::*;

use super::{errors::AppError, state::AppState};
