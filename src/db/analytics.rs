//! Analytics event log

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::format_timestamp;
use crate::error::Result;

/// A recorded analytics event
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AnalyticsEvent {
    pub id: String,
    pub event_type: String,
    pub user_id: Option<String>,
    pub ip_address: String,
    /// JSON object
    pub metadata: String,
    pub created_at: String,
}

/// Analytics repository; append-only
pub struct AnalyticsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AnalyticsRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append an event
    pub async fn record(
        &self,
        event_type: &str,
        user_id: Option<&str>,
        ip_address: &str,
        metadata: &serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO analytics_events (id, event_type, user_id, ip_address, metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(event_type)
        .bind(user_id)
        .bind(ip_address)
        .bind(metadata.to_string())
        .bind(format_timestamp(now))
        .execute(self.pool)
        .await?;

        Ok(id)
    }

    /// List events of a type, newest first
    pub async fn list_by_type(&self, event_type: &str) -> Result<Vec<AnalyticsEvent>> {
        let events = sqlx::query_as::<_, AnalyticsEvent>(
            r#"
            SELECT id, event_type, user_id, ip_address, metadata, created_at
            FROM analytics_events
            WHERE event_type = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(event_type)
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    #[tokio::test]
    async fn test_record_event() {
        let pool = create_memory_pool().await.unwrap();
        let repo = AnalyticsRepository::new(&pool);

        let metadata = serde_json::json!({ "files": 2 });
        let id = repo
            .record("upload_started", None, "203.0.113.7", &metadata, Utc::now())
            .await
            .unwrap();

        let events = repo.list_by_type("upload_started").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, id);
        assert!(events[0].user_id.is_none());

        let stored: serde_json::Value = serde_json::from_str(&events[0].metadata).unwrap();
        assert_eq!(stored, metadata);
    }
}
