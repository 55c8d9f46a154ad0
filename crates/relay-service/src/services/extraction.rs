//! Content extraction: PDF text and image OCR.
//!
//! PDF parsing is CPU-bound and runs on the blocking thread pool. OCR
//! shells out to the `tesseract` binary; an absent binary is reported
//! distinctly from a failed recognition so operators can tell a deployment
//! problem from a bad image.

use crate::errors::RelayError;
use std::path::Path;
use tracing::{error, instrument, warn};

/// Text extracted from an uploaded PDF.
#[derive(Debug, Clone)]
pub struct PdfExtraction {
    /// Concatenated per-page text, one page per line group.
    pub text: String,

    /// Number of pages in the document.
    pub page_count: usize,
}

/// Extract text from a PDF document.
///
/// Pages that yield no text are skipped; the remaining page texts are
/// joined with newlines and trimmed. Runs on the blocking pool.
///
/// # Errors
///
/// Returns `RelayError::BadRequest` if the document cannot be parsed.
#[instrument(skip_all, fields(bytes = data.len()))]
pub async fn extract_pdf_text(data: Vec<u8>) -> Result<PdfExtraction, RelayError> {
    let result = tokio::task::spawn_blocking(move || parse_pdf(&data))
        .await
        .map_err(|e| {
            error!(target: "relay.services.extraction", error = %e, "PDF extraction task failed");
            RelayError::Internal
        })?;

    result.map_err(|e| {
        warn!(target: "relay.services.extraction", error = %e, "PDF parsing failed");
        RelayError::BadRequest("PDF processing failed".to_string())
    })
}

fn parse_pdf(data: &[u8]) -> Result<PdfExtraction, lopdf::Error> {
    let document = lopdf::Document::load_mem(data)?;
    let pages = document.get_pages();
    let page_count = pages.len();

    let mut text = String::new();
    for page_number in pages.keys() {
        // A page that fails text extraction is treated as empty, matching
        // the behavior for image-only pages
        if let Ok(page_text) = document.extract_text(&[*page_number]) {
            if !page_text.is_empty() {
                text.push_str(&page_text);
                text.push('\n');
            }
        }
    }

    Ok(PdfExtraction {
        text: text.trim().to_string(),
        page_count,
    })
}

/// Run OCR on an image file using the `tesseract` binary.
///
/// # Errors
///
/// - `RelayError::OcrUnavailable` if the binary is not installed
/// - `RelayError::Internal` if the binary cannot be spawned or recognition
///   fails
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn ocr_image(path: &Path) -> Result<String, RelayError> {
    let output = tokio::process::Command::new("tesseract")
        .arg(path)
        .arg("stdout")
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RelayError::OcrUnavailable
            } else {
                error!(target: "relay.services.extraction", error = %e, "Failed to run tesseract");
                RelayError::Internal
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(
            target: "relay.services.extraction",
            status = ?output.status.code(),
            stderr = %stderr,
            "Tesseract exited with error"
        );
        return Err(RelayError::Internal);
    }

    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(text)
}

/// Reduce an uploaded filename to a safe basename.
///
/// Path components are discarded and any character outside
/// `[A-Za-z0-9._-]` is replaced with `_`. Returns `None` when nothing
/// usable remains.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let basename = Path::new(name).file_name()?.to_string_lossy();

    let cleaned: String = basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Reject names that are only separators or dots
    if cleaned.chars().all(|c| matches!(c, '.' | '_' | '-')) {
        return None;
    }

    Some(cleaned)
}
