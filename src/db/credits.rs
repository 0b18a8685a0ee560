//! Credit balance database operations

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use super::{format_timestamp, parse_timestamp};
use crate::error::{AppError, Result};

/// Credit record for a signed-in user
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserCredits {
    pub user_id: String,
    pub credits_remaining: i64,
    pub reset_at: Option<String>,
    pub last_used_at: Option<String>,
    pub created_at: String,
}

impl UserCredits {
    /// When the balance replenishes, if it is exhausted
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        self.reset_at.as_deref().and_then(parse_timestamp)
    }

    /// Whether the reset time has passed
    pub fn reset_due(&self, now: DateTime<Utc>) -> bool {
        self.reset_at().is_some_and(|at| at <= now)
    }
}

/// Credit repository
pub struct CreditRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CreditRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the credit record for a user
    pub async fn get(&self, user_id: &str) -> Result<Option<UserCredits>> {
        let credits = sqlx::query_as::<_, UserCredits>(
            r#"
            SELECT user_id, credits_remaining, reset_at, last_used_at, created_at
            FROM user_credits
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(credits)
    }

    /// Create a record with a full balance
    ///
    /// A concurrent insert for the same user wins; the stored row is returned either way.
    pub async fn create(
        &self,
        user_id: &str,
        credits: i64,
        now: DateTime<Utc>,
    ) -> Result<UserCredits> {
        sqlx::query(
            r#"
            INSERT INTO user_credits (user_id, credits_remaining, reset_at, created_at)
            VALUES (?, ?, NULL, ?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(credits)
        .bind(format_timestamp(now))
        .execute(self.pool)
        .await?;

        self.get(user_id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created credit record".to_string()))
    }

    /// Restore the balance and clear the reset time
    pub async fn reset(&self, user_id: &str, credits: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE user_credits
            SET credits_remaining = ?, reset_at = NULL
            WHERE user_id = ?
            "#,
        )
        .bind(credits)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Spend one credit
    ///
    /// Decrement and reset stamping happen in one statement guarded by
    /// `credits_remaining > 0`, so concurrent submissions cannot push the
    /// balance below zero. Returns the new balance, or `None` when there was
    /// nothing to spend.
    pub async fn consume(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        reset_at: DateTime<Utc>,
    ) -> Result<Option<i64>> {
        let remaining: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE user_credits
            SET credits_remaining = credits_remaining - 1,
                reset_at = CASE WHEN credits_remaining - 1 = 0 THEN ? ELSE reset_at END,
                last_used_at = ?
            WHERE user_id = ? AND credits_remaining > 0
            RETURNING credits_remaining
            "#,
        )
        .bind(format_timestamp(reset_at))
        .bind(format_timestamp(now))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(remaining.map(|(credits,)| credits))
    }
}
