//! Guest usage database operations

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use super::format_timestamp;
use crate::error::Result;

/// Usage record for a guest IP address
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct IpUsage {
    pub ip_address: String,
    pub used: bool,
    pub used_at: Option<String>,
}

/// Guest usage repository
pub struct IpUsageRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> IpUsageRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the usage record for an IP
    pub async fn get(&self, ip_address: &str) -> Result<Option<IpUsage>> {
        let usage = sqlx::query_as::<_, IpUsage>(
            r#"
            SELECT ip_address, used, used_at
            FROM ip_usage
            WHERE ip_address = ?
            "#,
        )
        .bind(ip_address)
        .fetch_optional(self.pool)
        .await?;

        Ok(usage)
    }

    /// Whether the IP has spent its free use
    pub async fn is_used(&self, ip_address: &str) -> Result<bool> {
        Ok(self.get(ip_address).await?.is_some_and(|usage| usage.used))
    }

    /// Mark the IP's free use as spent
    pub async fn mark_used(&self, ip_address: &str, now: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ip_usage (ip_address, used, used_at)
            VALUES (?, 1, ?)
            ON CONFLICT(ip_address) DO UPDATE SET used = 1, used_at = excluded.used_at
            "#,
        )
        .bind(ip_address)
        .bind(format_timestamp(now))
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    #[tokio::test]
    async fn test_mark_used() {
        let pool = create_memory_pool().await.unwrap();
        let repo = IpUsageRepository::new(&pool);

        assert!(!repo.is_used("203.0.113.7").await.unwrap());
        assert!(repo.get("203.0.113.7").await.unwrap().is_none());

        repo.mark_used("203.0.113.7", Utc::now()).await.unwrap();
        repo.mark_used("203.0.113.7", Utc::now()).await.unwrap();

        let usage = repo.get("203.0.113.7").await.unwrap().unwrap();
        assert!(usage.used);
        assert!(usage.used_at.is_some());
        assert!(repo.is_used("203.0.113.7").await.unwrap());
        assert!(!repo.is_used("198.51.100.1").await.unwrap());
    }
}
