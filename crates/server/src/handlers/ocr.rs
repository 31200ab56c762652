//! # Document Extraction Handler
//!
//! Accepts a `multipart/form-data` upload with a `file` part and a `type`
//! field, and answers with the extracted details for that document type.

use super::{AppError, AppState};
use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use kycocr::{DocumentType, ExtractionRequest, ExtractionResult, InputDocument};
use std::path::Path;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

const OCTET_STREAM: &str = "application/octet-stream";

/// Handler for `POST /api/ocr`.
///
/// A missing or unknown `type` is a 400. A missing file is not: the extractor
/// answers it with empty details, like any other failed extraction.
pub async fn ocr_handler(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractionResult>, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("ocr", %request_id);

    async move {
        let request = read_request(multipart).await?;
        info!(
            document_type = %request.document_type,
            has_file = request.document.is_some(),
            "Extraction request received."
        );

        let result = app_state.extractor.extract(request).await;
        Ok(Json(result))
    }
    .instrument(span)
    .await
}

async fn read_request(mut multipart: Multipart) -> Result<ExtractionRequest, AppError> {
    let mut document: Option<InputDocument> = None;
    let mut document_type: Option<DocumentType> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let declared = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                if bytes.is_empty() {
                    debug!(file_name = %file_name, "Ignoring empty file part.");
                    continue;
                }
                let mime_type = resolve_mime_type(declared.as_deref(), &file_name);
                debug!(
                    file_name = %file_name,
                    mime_type = %mime_type,
                    size = bytes.len(),
                    "Received upload."
                );
                document = Some(InputDocument::new(bytes.to_vec(), mime_type, file_name));
            }
            "type" => {
                let raw = field.text().await?;
                document_type = Some(raw.trim().parse()?);
            }
            other => debug!("Ignoring unexpected multipart field '{other}'."),
        }
    }

    let document_type = document_type
        .ok_or_else(|| AppError::BadRequest("Missing 'type' field.".to_string()))?;

    Ok(ExtractionRequest {
        document,
        document_type,
    })
}

/// Uses the declared content type unless it is absent or generic, in which
/// case the file extension decides.
fn resolve_mime_type(declared: Option<&str>, file_name: &str) -> String {
    match declared {
        Some(mime) if !mime.is_empty() && mime != OCTET_STREAM => mime.to_string(),
        _ => guess_mime_type(file_name).to_string(),
    }
}

fn guess_mime_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => OCTET_STREAM,
    }
}
