use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kycocr::types::UnknownDocumentType;
use serde_json::json;
use tracing::{error, warn};

/// A custom error type for the server application.
///
/// Extraction failures never reach this type: the extractor answers them with
/// empty details. Only request-shape problems and internal faults end up here.
#[derive(Debug)]
pub enum AppError {
    /// The request could not be understood (bad multipart, missing or invalid `type`).
    BadRequest(String),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<UnknownDocumentType> for AppError {
    fn from(err: UnknownDocumentType) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<axum_extra::extract::multipart::MultipartError> for AppError {
    fn from(err: axum_extra::extract::multipart::MultipartError) -> Self {
        AppError::BadRequest(format!("Malformed multipart body: {}", err.body_text()))
    }
}

/// Conversion from `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::BadRequest(message) => {
                warn!("Rejected request: {message}");
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
