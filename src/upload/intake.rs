//! Multipart reading, validation and storage of submitted files

use std::sync::Arc;

use axum::{extract::Multipart, http::StatusCode};
use chrono::{DateTime, Utc};

use super::types::*;
use crate::auth::Caller;
use crate::db::{NewUploadedFile, UploadedFile, UploadedFileRepository};
use crate::error::Result;
use crate::pdf::{self, PdfExtractor};
use crate::state::AppState;

/// Collect every `files` part of a multipart body
///
/// Parts under other names are ignored. A missing content type is guessed
/// from the file name. The count and per-file size limits are enforced while
/// streaming, so an oversized part is rejected by name instead of running
/// into the request body limit.
pub async fn read_files(multipart: &mut Multipart) -> std::result::Result<Vec<IncomingFile>, UploadError> {
    let mut files = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        UploadError::Multipart(e.to_string())
    })? {
        if field.name() != Some(FILES_FIELD) {
            tracing::debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        if files.len() == MAX_FILES_PER_SUBMISSION {
            return Err(UploadError::TooManyFiles(files.len() + 1));
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = match field.content_type() {
            Some(content_type) if !content_type.is_empty() => content_type.to_string(),
            _ => mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        };

        let mut data = Vec::new();
        loop {
            let chunk = match field.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                    tracing::warn!(file = %file_name, "Request body limit reached while reading file");
                    return Err(UploadError::FileTooLarge(file_name));
                }
                Err(e) => {
                    tracing::error!("Failed to read file data for '{}': {}", file_name, e);
                    return Err(UploadError::Multipart(e.to_string()));
                }
            };

            if data.len() + chunk.len() > MAX_FILE_SIZE_BYTES {
                tracing::debug!(file = %file_name, "File exceeds size limit");
                return Err(UploadError::FileTooLarge(file_name));
            }
            data.extend_from_slice(&chunk);
        }

        tracing::debug!(
            file = %file_name,
            mime = %mime_type,
            bytes = data.len(),
            "Received file"
        );

        files.push(IncomingFile::new(file_name, mime_type, data));
    }

    Ok(files)
}

/// Check a submission against the upload limits
///
/// The first failing file rejects the whole batch.
pub async fn validate_files(
    files: &[IncomingFile],
    extractor: &Arc<dyn PdfExtractor>,
) -> std::result::Result<(), UploadError> {
    if files.is_empty() {
        return Err(UploadError::NoFiles);
    }
    if files.len() > MAX_FILES_PER_SUBMISSION {
        return Err(UploadError::TooManyFiles(files.len()));
    }

    for file in files {
        if !is_valid_file_type(&file.mime_type) {
            return Err(UploadError::InvalidFileType(file.file_name.clone()));
        }
        if !is_valid_file_size(file.size()) {
            return Err(UploadError::FileTooLarge(file.file_name.clone()));
        }
        if file.is_pdf() {
            let pages = pdf::page_count_or_default(extractor.clone(), file.data.clone()).await;
            if pages > MAX_PDF_PAGES {
                return Err(UploadError::TooManyPages(file.file_name.clone()));
            }
        }
    }

    Ok(())
}

/// Persists accepted files for a caller
pub struct UploadIntake<'a> {
    state: &'a AppState,
}

impl<'a> UploadIntake<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Blob key for a file: `{user or ip}/{unix millis}-{file name}`
    pub fn object_key(caller: &Caller, file: &IncomingFile, now: DateTime<Utc>) -> String {
        format!(
            "{}/{}-{}",
            caller.storage_prefix(),
            now.timestamp_millis(),
            file.base_name()
        )
    }

    /// Upload the bytes and record the metadata row
    pub async fn store(&self, caller: &Caller, file: &IncomingFile, now: DateTime<Utc>) -> Result<UploadedFile> {
        let key = Self::object_key(caller, file, now);

        self.state
            .blobs()
            .put_object(&key, file.data.as_ref().clone(), &file.mime_type)
            .await?;

        let record = UploadedFileRepository::new(self.state.db())
            .create(
                &NewUploadedFile {
                    user_id: caller.user_id.as_deref(),
                    ip_address: &caller.ip,
                    file_name: &file.file_name,
                    file_path: &key,
                    file_size: file.size() as i64,
                    mime_type: &file.mime_type,
                },
                now,
            )
            .await?;

        tracing::info!(
            id = %record.id,
            key = %key,
            bytes = file.size(),
            "Stored upload"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::PdfError;

    struct PagesExtractor(usize);

    impl PdfExtractor for PagesExtractor {
        fn page_count(&self, _data: &[u8]) -> std::result::Result<usize, PdfError> {
            Ok(self.0)
        }

        fn extract_text(&self, _data: &[u8]) -> std::result::Result<String, PdfError> {
            Ok(String::new())
        }
    }

    fn extractor(pages: usize) -> Arc<dyn PdfExtractor> {
        Arc::new(PagesExtractor(pages))
    }

    fn png(name: &str, size: usize) -> IncomingFile {
        IncomingFile::new(name, "image/png", vec![0u8; size])
    }

    #[tokio::test]
    async fn test_rejects_empty_and_oversized_batches() {
        let err = validate_files(&[], &extractor(1)).await.unwrap_err();
        assert!(matches!(err, UploadError::NoFiles));

        let files: Vec<_> = (0..4).map(|i| png(&format!("{i}.png"), 10)).collect();
        let err = validate_files(&files, &extractor(1)).await.unwrap_err();
        assert!(matches!(err, UploadError::TooManyFiles(4)));

        assert!(validate_files(&files[..3], &extractor(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_whole_batch_on_one_bad_file() {
        let files = vec![
            png("ok.png", 10),
            IncomingFile::new("notes.txt", "text/plain", b"hi".to_vec()),
        ];
        let err = validate_files(&files, &extractor(1)).await.unwrap_err();
        assert!(matches!(err, UploadError::InvalidFileType(ref name) if name == "notes.txt"));

        let files = vec![png("big.png", MAX_FILE_SIZE_BYTES + 1)];
        let err = validate_files(&files, &extractor(1)).await.unwrap_err();
        assert!(matches!(err, UploadError::FileTooLarge(ref name) if name == "big.png"));
    }

    #[tokio::test]
    async fn test_pdf_page_limit() {
        let files = vec![IncomingFile::new("doc.pdf", "application/pdf", b"%PDF".to_vec())];

        assert!(validate_files(&files, &extractor(MAX_PDF_PAGES)).await.is_ok());

        let err = validate_files(&files, &extractor(MAX_PDF_PAGES + 1)).await.unwrap_err();
        assert!(matches!(err, UploadError::TooManyPages(ref name) if name == "doc.pdf"));
    }

    #[test]
    fn test_object_key_layout() {
        let now = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let file = png("scans/page.png", 1);

        let key = UploadIntake::object_key(&Caller::user("user-1", "1.2.3.4"), &file, now);
        assert_eq!(key, format!("user-1/{}-page.png", now.timestamp_millis()));

        let key = UploadIntake::object_key(&Caller::guest("1.2.3.4"), &file, now);
        assert!(key.starts_with("1.2.3.4/"));
    }
}
