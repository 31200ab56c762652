//! # General Route Handlers

/// The handler for the root path (`/`).
pub async fn root() -> &'static str {
    "Document extraction server is running. POST a file and a type to /api/ocr."
}

/// The handler for the health check endpoint (`/health`).
pub async fn health_check() -> &'static str {
    "OK"
}
