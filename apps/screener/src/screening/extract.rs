//! Document Extractor — converts a resume file into plain text.

use std::path::Path;

use thiserror::Error;

/// Per-resume extraction failure. Logged at the pipeline boundary; the
/// resume is excluded and the batch continues.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("cannot read document {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("document {path} has no extractable text layer")]
    NoTextLayer { path: String },

    #[error("unsupported document type: {path}")]
    UnsupportedType { path: String },
}

/// Extracts concatenated text from all pages of a resume document, in
/// document order. Read-only: the file is never modified.
///
/// PDF is the primary format; plain-text files pass through so corpora of
/// pre-extracted resumes can be screened with the same pipeline.
pub fn extract_document_text(path: &Path) -> Result<String, ExtractionError> {
    let display = path.display().to_string();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| ExtractionError::UnsupportedType {
            path: display.clone(),
        })?;

    let text = match extension.as_str() {
        "pdf" => pdf_extract::extract_text(path).map_err(|e| ExtractionError::Unreadable {
            path: display.clone(),
            message: e.to_string(),
        })?,
        "txt" | "text" => {
            std::fs::read_to_string(path).map_err(|e| ExtractionError::Unreadable {
                path: display.clone(),
                message: e.to_string(),
            })?
        }
        _ => return Err(ExtractionError::UnsupportedType { path: display }),
    };

    // A scanned image-only PDF extracts to nothing; treat as unreadable
    // rather than feeding an empty block downstream.
    if text.trim().is_empty() {
        return Err(ExtractionError::NoTextLayer { path: display });
    }

    Ok(text)
}
