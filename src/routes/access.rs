//! Access check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;

use crate::auth::Caller;
use crate::error::Result;
use crate::quota::{AccessDecision, AccessGate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/check", get(check_access))
}

/// Report whether the caller may submit work
async fn check_access(State(state): State<AppState>, caller: Caller) -> Result<Json<AccessDecision>> {
    let decision = AccessGate::new(state.db()).check(&caller, Utc::now()).await?;

    tracing::debug!(
        user = ?caller.user_id,
        ip = %caller.ip,
        allowed = decision.allowed,
        "Access checked"
    );

    Ok(Json(decision))
}
