//! PDF text extraction
//!
//! PDFs are not OCRed: their embedded text layer is extracted directly.
//! Parsing is CPU-bound and runs on the blocking pool.

mod mupdf_extractor;

pub use mupdf_extractor::MupdfExtractor;

use std::sync::Arc;

use thiserror::Error;

/// PDF processing errors
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to load PDF: {0}")]
    LoadError(String),
    #[error("Failed to extract text: {0}")]
    ExtractError(String),
    #[error("PDF worker failed: {0}")]
    Worker(String),
}

/// Page counting and text extraction for PDF bytes
pub trait PdfExtractor: Send + Sync {
    /// Number of pages in the document
    fn page_count(&self, data: &[u8]) -> Result<usize, PdfError>;

    /// Text of every page, in order
    fn extract_text(&self, data: &[u8]) -> Result<String, PdfError>;
}

/// Page count, or 1 when the document cannot be parsed
///
/// Unparseable PDFs pass the page limit here and fail later at extraction.
pub async fn page_count_or_default(extractor: Arc<dyn PdfExtractor>, data: Arc<Vec<u8>>) -> usize {
    let result = tokio::task::spawn_blocking(move || extractor.page_count(&data))
        .await
        .map_err(|e| PdfError::Worker(e.to_string()))
        .and_then(|count| count);

    match result {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!("Could not count PDF pages, assuming 1: {}", e);
            1
        }
    }
}

/// Extract text on the blocking pool
pub async fn extract_text(extractor: Arc<dyn PdfExtractor>, data: Arc<Vec<u8>>) -> Result<String, PdfError> {
    tokio::task::spawn_blocking(move || extractor.extract_text(&data))
        .await
        .map_err(|e| PdfError::Worker(e.to_string()))?
}
