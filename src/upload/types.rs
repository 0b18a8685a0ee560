//! Upload types and limits

use std::sync::Arc;

// ============================================================================
// Constants
// ============================================================================

/// Maximum files per submission
pub const MAX_FILES_PER_SUBMISSION: usize = 3;

/// Maximum file size in megabytes
pub const MAX_FILE_SIZE_MB: usize = 5;

/// Maximum file size: 5MB
pub const MAX_FILE_SIZE_BYTES: usize = MAX_FILE_SIZE_MB * 1024 * 1024;

/// Maximum pages in a PDF
pub const MAX_PDF_PAGES: usize = 20;

/// Request body limit; leaves room for one file over the count limit
pub const MAX_REQUEST_BYTES: usize = (MAX_FILES_PER_SUBMISSION + 1) * MAX_FILE_SIZE_BYTES + 64 * 1024;

/// Multipart field carrying the files
pub const FILES_FIELD: &str = "files";

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Accepted MIME types
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    PDF_MIME_TYPE,
];

/// Check if file type is allowed
pub fn is_valid_file_type(mime_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime_type)
}

/// Check if file size is allowed
pub fn is_valid_file_size(size: usize) -> bool {
    size <= MAX_FILE_SIZE_BYTES
}

// ============================================================================
// Incoming File
// ============================================================================

/// A file received in a submission
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Original file name, as sent by the client
    pub file_name: String,

    /// MIME type
    pub mime_type: String,

    /// File contents
    pub data: Arc<Vec<u8>>,
}

impl IncomingFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data: Arc::new(data),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == PDF_MIME_TYPE
    }

    /// File name without any client-side directory components
    pub fn base_name(&self) -> &str {
        self.file_name
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("upload")
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Upload validation errors
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No files provided")]
    NoFiles,

    #[error("Maximum 3 files allowed")]
    TooManyFiles(usize),

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("File too large: {0}. Max 5MB")]
    FileTooLarge(String),

    #[error("PDF has too many pages: {0}. Max 20 pages")]
    TooManyPages(String),

    #[error("Malformed upload: {0}")]
    Multipart(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_types() {
        for mime in ["image/jpeg", "image/png", "image/gif", "image/webp", "application/pdf"] {
            assert!(is_valid_file_type(mime), "{mime} should be allowed");
        }
        for mime in ["image/tiff", "text/plain", "application/zip", ""] {
            assert!(!is_valid_file_type(mime), "{mime} should be rejected");
        }
    }

    #[test]
    fn test_size_boundary() {
        assert!(is_valid_file_size(MAX_FILE_SIZE_BYTES));
        assert!(!is_valid_file_size(MAX_FILE_SIZE_BYTES + 1));
    }

    #[test]
    fn test_base_name() {
        let file = IncomingFile::new("C:\\scans\\page1.png", "image/png", vec![]);
        assert_eq!(file.base_name(), "page1.png");

        let file = IncomingFile::new("../../etc/notes.pdf", "application/pdf", vec![]);
        assert_eq!(file.base_name(), "notes.pdf");
        assert!(file.is_pdf());

        let file = IncomingFile::new("dir/", "image/png", vec![]);
        assert_eq!(file.base_name(), "upload");
    }

    #[test]
    fn test_error_messages_name_the_file() {
        assert_eq!(
            UploadError::FileTooLarge("big.png".into()).to_string(),
            "File too large: big.png. Max 5MB"
        );
        assert_eq!(
            UploadError::TooManyPages("long.pdf".into()).to_string(),
            "PDF has too many pages: long.pdf. Max 20 pages"
        );
        assert_eq!(UploadError::TooManyFiles(4).to_string(), "Maximum 3 files allowed");
    }
}
