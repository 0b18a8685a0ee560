//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtVerifier;
use crate::config::Config;
use crate::ocr::OcrService;
use crate::pdf::PdfExtractor;
use crate::storage::BlobStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    blobs: Arc<dyn BlobStore>,
    ocr: OcrService,
    pdf: Arc<dyn PdfExtractor>,
    jwt: Option<JwtVerifier>,
}

impl AppState {
    /// Create a new application state
    ///
    /// Session validation is enabled only when the config carries a JWT secret.
    pub fn new(
        config: Config,
        db: SqlitePool,
        blobs: Arc<dyn BlobStore>,
        ocr: OcrService,
        pdf: Arc<dyn PdfExtractor>,
    ) -> Self {
        let jwt = config.auth.jwt_secret.as_deref().map(JwtVerifier::new);
        if jwt.is_none() {
            tracing::warn!("AUTH_JWT_SECRET not set; every caller is treated as a guest");
        }

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                blobs,
                ocr,
                pdf,
                jwt,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Get the blob store
    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.inner.blobs
    }

    /// Get the OCR service
    pub fn ocr(&self) -> &OcrService {
        &self.inner.ocr
    }

    /// Get the PDF extractor
    pub fn pdf(&self) -> &Arc<dyn PdfExtractor> {
        &self.inner.pdf
    }

    /// Get the session verifier, if sessions are enabled
    pub fn jwt(&self) -> Option<&JwtVerifier> {
        self.inner.jwt.as_ref()
    }
}
