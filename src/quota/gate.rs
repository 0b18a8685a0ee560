//! Access gate

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use super::AUTHENTICATED_CREDITS;
use crate::auth::Caller;
use crate::db::{CreditRepository, IpUsageRepository};
use crate::error::{AppError, Result};

const TRIAL_USED_REASON: &str = "Free trial used. Please sign in to continue.";

/// Outcome of an access check
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_guest: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AccessDecision {
    fn user(credits: i64, reset_at: Option<DateTime<Utc>>) -> Self {
        Self {
            allowed: credits > 0,
            credits: Some(credits),
            reset_at,
            requires_auth: None,
            is_guest: None,
            reason: None,
        }
    }

    fn guest_allowed() -> Self {
        Self {
            allowed: true,
            credits: None,
            reset_at: None,
            requires_auth: None,
            is_guest: Some(true),
            reason: None,
        }
    }

    fn guest_denied() -> Self {
        Self {
            allowed: false,
            credits: None,
            reset_at: None,
            requires_auth: Some(true),
            is_guest: None,
            reason: Some(TRIAL_USED_REASON.to_string()),
        }
    }
}

/// Decides whether a caller may submit work
pub struct AccessGate<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccessGate<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Check the caller's remaining quota
    ///
    /// Creates a full balance for users seen for the first time and applies
    /// any reset that has come due.
    pub async fn check(&self, caller: &Caller, now: DateTime<Utc>) -> Result<AccessDecision> {
        let Some(user_id) = caller.user_id.as_deref() else {
            let used = IpUsageRepository::new(self.pool).is_used(&caller.ip).await?;
            return Ok(if used {
                AccessDecision::guest_denied()
            } else {
                AccessDecision::guest_allowed()
            });
        };

        let repo = CreditRepository::new(self.pool);

        let Some(record) = repo.get(user_id).await? else {
            let created = repo.create(user_id, AUTHENTICATED_CREDITS, now).await?;
            tracing::info!(user_id = %user_id, "Created credit balance");
            return Ok(AccessDecision::user(created.credits_remaining, created.reset_at()));
        };

        if record.reset_due(now) {
            repo.reset(user_id, AUTHENTICATED_CREDITS).await?;
            tracing::info!(user_id = %user_id, "Credit balance reset");
            return Ok(AccessDecision::user(AUTHENTICATED_CREDITS, None));
        }

        Ok(AccessDecision::user(record.credits_remaining, record.reset_at()))
    }

    /// Check the caller's quota and turn a denial into an error
    pub async fn enforce(&self, caller: &Caller, now: DateTime<Utc>) -> Result<AccessDecision> {
        let decision = self.check(caller, now).await?;

        if decision.allowed {
            return Ok(decision);
        }

        tracing::info!(
            user_id = ?caller.user_id,
            ip = %caller.ip,
            "Submission refused: quota exhausted"
        );

        if caller.is_guest() {
            Err(AppError::TrialUsed)
        } else {
            Err(AppError::NoCredits {
                reset_at: decision.reset_at,
            })
        }
    }
}
