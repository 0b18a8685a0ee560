//! Quota ledger

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use super::CREDIT_RESET_HOURS;
use crate::auth::Caller;
use crate::db::{CreditRepository, IpUsageRepository};
use crate::error::Result;

/// Records quota consumption after a successful submission
pub struct QuotaLedger<'a> {
    pool: &'a SqlitePool,
}

impl<'a> QuotaLedger<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Charge the caller for one submission
    ///
    /// Returns the remaining credits for signed-in users and `None` for guests.
    pub async fn consume(&self, caller: &Caller, now: DateTime<Utc>) -> Result<Option<i64>> {
        let Some(user_id) = caller.user_id.as_deref() else {
            IpUsageRepository::new(self.pool).mark_used(&caller.ip, now).await?;
            tracing::info!(ip = %caller.ip, "Guest trial consumed");
            return Ok(None);
        };

        let reset_at = now + Duration::hours(CREDIT_RESET_HOURS);
        match CreditRepository::new(self.pool)
            .consume(user_id, now, reset_at)
            .await?
        {
            Some(remaining) => {
                tracing::info!(user_id = %user_id, remaining, "Credit consumed");
                Ok(Some(remaining))
            }
            None => {
                // A concurrent submission spent the last credit first
                tracing::warn!(user_id = %user_id, "No credit left to consume");
                Ok(Some(0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::quota::AccessGate;

    #[tokio::test]
    async fn test_user_credits_count_down_to_reset() {
        let pool = create_memory_pool().await.unwrap();
        let caller = Caller::user("user-1", "203.0.113.7");
        let now = Utc::now();

        AccessGate::new(&pool).check(&caller, now).await.unwrap();
        let ledger = QuotaLedger::new(&pool);

        assert_eq!(ledger.consume(&caller, now).await.unwrap(), Some(2));
        assert_eq!(ledger.consume(&caller, now).await.unwrap(), Some(1));
        assert_eq!(ledger.consume(&caller, now).await.unwrap(), Some(0));
        assert_eq!(ledger.consume(&caller, now).await.unwrap(), Some(0));

        let record = CreditRepository::new(&pool).get("user-1").await.unwrap().unwrap();
        assert_eq!(record.credits_remaining, 0);
        assert_eq!(
            record.reset_at,
            Some(crate::db::format_timestamp(now + Duration::hours(24)))
        );
    }

    #[tokio::test]
    async fn test_guest_marked_used() {
        let pool = create_memory_pool().await.unwrap();
        let caller = Caller::guest("203.0.113.7");

        assert_eq!(QuotaLedger::new(&pool).consume(&caller, Utc::now()).await.unwrap(), None);
        assert!(IpUsageRepository::new(&pool).is_used("203.0.113.7").await.unwrap());

        let decision = AccessGate::new(&pool).check(&caller, Utc::now()).await.unwrap();
        assert!(!decision.allowed);
    }
}
