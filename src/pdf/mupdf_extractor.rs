//! MuPDF-backed extractor

use mupdf::{Document, TextPageOptions};

use super::{PdfError, PdfExtractor};

const PDF_MIME: &str = "application/pdf";

/// Extracts page counts and text with MuPDF
///
/// MuPDF documents are not thread-safe, so each call opens a fresh document.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfExtractor;

impl MupdfExtractor {
    pub fn new() -> Self {
        Self
    }

    fn open(data: &[u8]) -> Result<Document, PdfError> {
        Document::from_bytes(data, PDF_MIME).map_err(|e| PdfError::LoadError(e.to_string()))
    }
}

impl PdfExtractor for MupdfExtractor {
    fn page_count(&self, data: &[u8]) -> Result<usize, PdfError> {
        let doc = Self::open(data)?;
        let count = doc
            .page_count()
            .map_err(|e| PdfError::LoadError(e.to_string()))?;
        Ok(count.max(0) as usize)
    }

    fn extract_text(&self, data: &[u8]) -> Result<String, PdfError> {
        let doc = Self::open(data)?;
        let count = doc
            .page_count()
            .map_err(|e| PdfError::LoadError(e.to_string()))?;

        let mut pages = Vec::with_capacity(count.max(0) as usize);
        for index in 0..count {
            let page = doc
                .load_page(index)
                .map_err(|e| PdfError::ExtractError(format!("page {}: {}", index + 1, e)))?;
            let text = page
                .to_text_page(TextPageOptions::empty())
                .and_then(|text_page| text_page.to_text())
                .map_err(|e| PdfError::ExtractError(format!("page {}: {}", index + 1, e)))?;
            pages.push(text);
        }

        Ok(pages.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_load_error() {
        let extractor = MupdfExtractor::new();
        let result = extractor.page_count(b"this is not a pdf");
        assert!(matches!(result, Err(PdfError::LoadError(_))));
    }
}
