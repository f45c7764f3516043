//! Turns uploaded job description / CV files into plain text.
//!
//! PDFs go through `pdf-extract` on the blocking pool; anything declared as
//! text is decoded as UTF-8. Extraction quality is whatever the PDF gives us.

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

/// Per-file upload limit.
pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("{field} file must be PDF or text (got '{content_type}')")]
    UnsupportedType { field: String, content_type: String },

    #[error("{field} file size must be under 5MB (got {size} bytes)")]
    TooLarge { field: String, size: usize },

    #[error("Could not extract text from {field} file: {reason}")]
    Extraction { field: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

/// One uploaded file, as received from multipart or base64 input.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Form field name ("job" or "cv"), used in error messages.
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn kind(&self) -> Result<DocumentKind, DocumentError> {
        classify(self.content_type.as_deref(), self.file_name.as_deref()).ok_or_else(|| {
            DocumentError::UnsupportedType {
                field: self.field.clone(),
                content_type: self.content_type.clone().unwrap_or_default(),
            }
        })
    }

    /// Checks size and type, then extracts the document's text.
    pub async fn extract_text(self) -> Result<String, DocumentError> {
        if self.bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(DocumentError::TooLarge {
                field: self.field,
                size: self.bytes.len(),
            });
        }

        let text = match self.kind()? {
            DocumentKind::Text => String::from_utf8_lossy(&self.bytes).into_owned(),
            DocumentKind::Pdf => extract_pdf_text(&self.field, self.bytes.clone()).await?,
        };
        debug!("Extracted {} chars from {} file", text.len(), self.field);
        Ok(text)
    }
}

/// Decides how to read a file. The declared content type wins; the file
/// extension is only consulted when the type is missing or generic.
pub fn classify(content_type: Option<&str>, file_name: Option<&str>) -> Option<DocumentKind> {
    let content_type = content_type
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if content_type.starts_with("application/pdf") {
        return Some(DocumentKind::Pdf);
    }
    if content_type.contains("text") {
        return Some(DocumentKind::Text);
    }
    if !content_type.is_empty() && content_type != "application/octet-stream" {
        return None;
    }

    let extension = file_name?.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some(DocumentKind::Pdf),
        "txt" | "text" | "md" => Some(DocumentKind::Text),
        _ => None,
    }
}

async fn extract_pdf_text(field: &str, bytes: Bytes) -> Result<String, DocumentError> {
    let extraction = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await;
    match extraction {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(DocumentError::Extraction {
            field: field.to_string(),
            reason: e.to_string(),
        }),
        Err(join_err) => Err(DocumentError::Extraction {
            field: field.to_string(),
            reason: format!("PDF parser aborted: {join_err}"),
        }),
    }
}
