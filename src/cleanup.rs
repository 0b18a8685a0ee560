//! Expiry of stored uploads
//!
//! Uploads are kept for 24 hours. A run deletes the blob objects of every
//! older record, then the records themselves. The two deletes are not
//! transactional: a blob-store failure is logged and row deletion goes ahead.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::UploadedFileRepository;
use crate::error::Result;
use crate::state::AppState;
use crate::storage::BlobStore;

/// How long uploads are retained
pub const RETENTION_HOURS: i64 = 24;

/// Outcome of a cleanup run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub deleted_count: usize,
}

/// Deletes uploads older than the retention window
#[derive(Clone)]
pub struct CleanupJob {
    db: SqlitePool,
    blobs: Arc<dyn BlobStore>,
}

impl CleanupJob {
    pub fn new(db: SqlitePool, blobs: Arc<dyn BlobStore>) -> Self {
        Self { db, blobs }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db().clone(), state.blobs().clone())
    }

    /// Delete every upload created before `now - 24h`
    pub async fn run(&self, now: DateTime<Utc>) -> Result<CleanupReport> {
        let cutoff = now - chrono::Duration::hours(RETENTION_HOURS);
        let files = UploadedFileRepository::new(&self.db);

        let expired = files.list_created_before(cutoff).await?;
        if expired.is_empty() {
            tracing::debug!(cutoff = %cutoff, "No uploads to clean up");
            return Ok(CleanupReport { deleted_count: 0 });
        }

        let keys: Vec<String> = expired.iter().map(|f| f.file_path.clone()).collect();
        match self.blobs.delete_objects(&keys).await {
            Ok(deleted) => tracing::debug!(objects = deleted, "Deleted expired blob objects"),
            Err(e) => tracing::error!(
                objects = keys.len(),
                "Failed to delete expired blob objects, removing records anyway: {}",
                e
            ),
        }

        let ids: Vec<String> = expired.into_iter().map(|f| f.id).collect();
        files.delete_many(&ids).await?;

        tracing::info!(deleted = ids.len(), cutoff = %cutoff, "Cleanup completed");

        Ok(CleanupReport {
            deleted_count: ids.len(),
        })
    }
}

/// Run cleanup every `interval` until the task is aborted
///
/// The first run happens one interval after startup.
pub fn spawn_periodic(job: CleanupJob, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.tick().await;

        loop {
            timer.tick().await;
            match job.run(Utc::now()).await {
                Ok(CleanupReport { deleted_count: 0 }) => {}
                Ok(report) => tracing::info!(deleted = report.deleted_count, "Periodic cleanup removed expired uploads"),
                Err(e) => tracing::warn!(error = %e, "Periodic cleanup failed"),
            }
        }
    })
}
