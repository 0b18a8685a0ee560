//! Upload cleanup trigger

use axum::{
    extract::State,
    http::{header, HeaderMap},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use subtle::ConstantTimeEq;

use crate::cleanup::CleanupJob;
use crate::error::{AppError, Result};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(run_cleanup))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub message: &'static str,
    pub deleted_count: usize,
}

/// Delete expired uploads
///
/// Requires the configured bearer secret. With no secret configured every
/// call is rejected.
async fn run_cleanup(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<CleanupResponse>> {
    let expected = state
        .config()
        .cleanup
        .secret_token
        .as_deref()
        .ok_or(AppError::Unauthorized)?;

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if !token_matches(provided, expected) {
        tracing::warn!("Rejected cleanup request with missing or wrong token");
        return Err(AppError::Unauthorized);
    }

    let report = CleanupJob::from_state(&state).run(Utc::now()).await?;

    let message = if report.deleted_count == 0 {
        "No files to clean up"
    } else {
        "Cleanup completed"
    };

    Ok(Json(CleanupResponse {
        message,
        deleted_count: report.deleted_count,
    }))
}

/// Compare the presented token without leaking a matching prefix through timing
fn token_matches(provided: Option<&str>, expected: &str) -> bool {
    provided.is_some_and(|token| bool::from(token.as_bytes().ct_eq(expected.as_bytes())))
}
