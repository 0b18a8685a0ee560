//! Uploaded file metadata operations

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::format_timestamp;
use crate::error::{AppError, Result};

/// Metadata for a stored upload
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UploadedFile {
    pub id: String,
    pub user_id: Option<String>,
    pub ip_address: String,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub created_at: String,
}

/// Fields for a new upload record
#[derive(Debug, Clone)]
pub struct NewUploadedFile<'a> {
    pub user_id: Option<&'a str>,
    pub ip_address: &'a str,
    pub file_name: &'a str,
    pub file_path: &'a str,
    pub file_size: i64,
    pub mime_type: &'a str,
}

/// Uploaded file repository
pub struct UploadedFileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UploadedFileRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a specific record
    pub async fn get(&self, id: &str) -> Result<Option<UploadedFile>> {
        let file = sqlx::query_as::<_, UploadedFile>(
            r#"
            SELECT id, user_id, ip_address, file_name, file_path, file_size, mime_type, created_at
            FROM uploaded_files
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(file)
    }

    /// Record a stored upload
    pub async fn create(&self, data: &NewUploadedFile<'_>, now: DateTime<Utc>) -> Result<UploadedFile> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO uploaded_files (id, user_id, ip_address, file_name, file_path, file_size, mime_type, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(data.user_id)
        .bind(data.ip_address)
        .bind(data.file_name)
        .bind(data.file_path)
        .bind(data.file_size)
        .bind(data.mime_type)
        .bind(format_timestamp(now))
        .execute(self.pool)
        .await?;

        self.get(&id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created upload record".to_string()))
    }

    /// List records created strictly before `cutoff`
    pub async fn list_created_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<UploadedFile>> {
        let files = sqlx::query_as::<_, UploadedFile>(
            r#"
            SELECT id, user_id, ip_address, file_name, file_path, file_size, mime_type, created_at
            FROM uploaded_files
            WHERE created_at < ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(format_timestamp(cutoff))
        .fetch_all(self.pool)
        .await?;

        Ok(files)
    }

    /// Delete records by id
    pub async fn delete_many(&self, ids: &[String]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        // Build dynamic IN clause
        let placeholders = vec!["?"; ids.len()].join(", ");
        let query = format!("DELETE FROM uploaded_files WHERE id IN ({})", placeholders);

        let mut sql_query = sqlx::query(&query);
        for id in ids {
            sql_query = sql_query.bind(id);
        }

        let result = sql_query.execute(self.pool).await?;

        Ok(result.rows_affected())
    }

    /// Count all records
    pub async fn count(&self) -> Result<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM uploaded_files")
            .fetch_one(self.pool)
            .await?;

        Ok(result.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use chrono::Duration;

    fn new_file<'a>(path: &'a str) -> NewUploadedFile<'a> {
        NewUploadedFile {
            user_id: Some("user-1"),
            ip_address: "203.0.113.7",
            file_name: "notes.png",
            file_path: path,
            file_size: 1024,
            mime_type: "image/png",
        }
    }

    #[tokio::test]
    async fn test_create_and_list_before_cutoff() {
        let pool = create_memory_pool().await.unwrap();
        let repo = UploadedFileRepository::new(&pool);
        let now = Utc::now();

        let old = repo
            .create(&new_file("user-1/1-old.png"), now - Duration::hours(25))
            .await
            .unwrap();
        repo.create(&new_file("user-1/2-new.png"), now - Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(old.user_id.as_deref(), Some("user-1"));
        assert_eq!(old.file_size, 1024);

        let stale = repo
            .list_created_before(now - Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].id, old.id);
    }

    #[tokio::test]
    async fn test_delete_many() {
        let pool = create_memory_pool().await.unwrap();
        let repo = UploadedFileRepository::new(&pool);
        let now = Utc::now();

        let a = repo.create(&new_file("a"), now).await.unwrap();
        let b = repo.create(&new_file("b"), now).await.unwrap();
        repo.create(&new_file("c"), now).await.unwrap();

        assert_eq!(repo.delete_many(&[]).await.unwrap(), 0);
        assert_eq!(repo.delete_many(&[a.id, b.id]).await.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
