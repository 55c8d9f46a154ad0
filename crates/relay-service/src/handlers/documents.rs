//! Upload analysis handlers: PDF text extraction and image OCR.
//!
//! Uploads are multipart forms. Files are written under the configured
//! upload directory with sanitized names before processing, matching what
//! the frontend expects to reference later.

use crate::errors::RelayError;
use crate::routes::AppState;
use crate::services::extraction::{extract_pdf_text, ocr_image, sanitize_filename};
use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, instrument};

/// Response for POST /analyze-pdf.
#[derive(Debug, Clone, Serialize)]
pub struct PdfAnalysisResponse {
    /// Sanitized filename the upload was stored under.
    pub filename: String,

    /// Extracted text, trimmed.
    pub text: String,

    /// Number of pages in the document.
    pub page_count: usize,
}

/// Response for POST /analyze-image.
#[derive(Debug, Clone, Serialize)]
pub struct ImageAnalysisResponse {
    /// Sanitized filename the upload was stored under.
    pub filename: String,

    /// Recognized text, trimmed.
    pub text: String,
}

/// An uploaded file pulled out of a multipart form.
struct Upload {
    filename: String,
    data: Vec<u8>,
}

/// Pull the named file field out of a multipart form.
///
/// Returns `BadRequest` with the given message if the field is absent,
/// has no filename, or the body cannot be read.
async fn read_upload(
    multipart: &mut Multipart,
    field_name: &str,
    missing_message: &str,
) -> Result<Upload, RelayError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| RelayError::BadRequest(missing_message.to_string()))?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let Some(raw_name) = field.file_name().map(ToString::to_string) else {
            break;
        };
        let Some(filename) = sanitize_filename(&raw_name) else {
            break;
        };

        let data = field
            .bytes()
            .await
            .map_err(|_| RelayError::BadRequest(missing_message.to_string()))?
            .to_vec();

        return Ok(Upload { filename, data });
    }

    Err(RelayError::BadRequest(missing_message.to_string()))
}

/// Write an upload into the configured upload directory.
async fn store_upload(state: &AppState, upload: &Upload) -> Result<PathBuf, RelayError> {
    let dir = PathBuf::from(&state.config.upload_dir);
    tokio::fs::create_dir_all(&dir).await.map_err(|e| {
        error!(target: "relay.handlers.documents", error = %e, "Failed to create upload directory");
        RelayError::Internal
    })?;

    let path = dir.join(&upload.filename);
    tokio::fs::write(&path, &upload.data).await.map_err(|e| {
        error!(target: "relay.handlers.documents", error = %e, "Failed to store upload");
        RelayError::Internal
    })?;

    Ok(path)
}

/// Handler for POST /analyze-pdf
///
/// Accepts a multipart form with a `file` field containing a PDF, stores
/// it, and returns the extracted text.
///
/// ## Errors
///
/// - 400 if no file is uploaded, the name is unusable, the extension is
///   not `.pdf`, or the document cannot be parsed
/// - 500 if the upload cannot be stored
#[instrument(skip_all, name = "relay.handlers.analyze_pdf")]
pub async fn analyze_pdf(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<PdfAnalysisResponse>, RelayError> {
    let upload = read_upload(&mut multipart, "file", "No PDF uploaded").await?;

    if !upload.filename.to_lowercase().ends_with(".pdf") {
        return Err(RelayError::BadRequest("File must be a PDF".to_string()));
    }

    store_upload(&state, &upload).await?;

    let extraction = extract_pdf_text(upload.data).await?;

    Ok(Json(PdfAnalysisResponse {
        filename: upload.filename,
        text: extraction.text,
        page_count: extraction.page_count,
    }))
}

/// Handler for POST /analyze-image
///
/// Accepts a multipart form with an `image` field, stores it, and returns
/// the OCR text.
///
/// ## Errors
///
/// - 400 if no image is uploaded or the name is unusable
/// - 500 with code `OCR_UNAVAILABLE` when the `tesseract` binary is not
///   installed; generic 500 if the upload cannot be stored or OCR fails
#[instrument(skip_all, name = "relay.handlers.analyze_image")]
pub async fn analyze_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ImageAnalysisResponse>, RelayError> {
    let upload = read_upload(&mut multipart, "image", "No image uploaded").await?;

    let path = store_upload(&state, &upload).await?;

    let text = ocr_image(&path).await?;

    Ok(Json(ImageAnalysisResponse {
        filename: upload.filename,
        text,
    }))
}
