//! Resume text extraction: uploaded PDF bytes in, plain text out.

pub mod cache;

use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::resume::cache::{content_key, ResumeCache};

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("Error reading PDF: {0}")]
    Parse(String),

    #[error("The PDF contains no extractable text")]
    Empty,
}

/// A resume file as received from the client.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

impl ResumeUpload {
    pub fn new(file_name: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name,
            bytes: bytes.into(),
        }
    }
}

/// Turns an uploaded resume into plain text.
/// Implementations are synchronous; callers run them off the async executor.
pub trait ResumeTextExtractor: Send + Sync {
    fn extract(&self, resume: &ResumeUpload) -> Result<String, ResumeError>;
}

/// `pdf-extract` backed reader with a content-addressed cache in front.
pub struct PdfResumeReader {
    cache: ResumeCache,
}

impl PdfResumeReader {
    pub fn new(cache: ResumeCache) -> Self {
        Self { cache }
    }
}

impl ResumeTextExtractor for PdfResumeReader {
    fn extract(&self, resume: &ResumeUpload) -> Result<String, ResumeError> {
        let key = content_key(&resume.bytes);
        if let Some(text) = self.cache.get(&key) {
            debug!("Resume text served from cache ({} chars)", text.len());
            return Ok(text);
        }

        let text = extract_pdf_text(&resume.bytes).map_err(|e| {
            warn!(
                "Failed to read resume {:?}: {e}",
                resume.file_name.as_deref().unwrap_or("<unnamed>")
            );
            e
        })?;

        self.cache.insert(key, text.clone());
        info!(
            "Extracted {} chars of resume text ({} cached)",
            text.len(),
            self.cache.len()
        );
        Ok(text)
    }
}

/// Concatenates the text of every page in document order and trims the result.
///
/// The parsed document lives only inside this call and is dropped on every
/// path. Panics raised by the PDF parser on malformed input are converted into
/// `ResumeError::Parse`.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ResumeError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }));

    let text = match outcome {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => return Err(ResumeError::Parse(e.to_string())),
        Err(payload) => return Err(ResumeError::Parse(panic_message(payload.as_ref()))),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(ResumeError::Empty);
    }
    Ok(text.to_string())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "PDF parser aborted".to_string()
    }
}
