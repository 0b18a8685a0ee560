//! Usage analytics endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::Caller;
use crate::db::AnalyticsRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/track", post(track_event))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    pub event_type: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub success: bool,
}

/// Record a client-side event
async fn track_event(
    State(state): State<AppState>,
    caller: Caller,
    payload: std::result::Result<Json<TrackRequest>, JsonRejection>,
) -> Result<Json<TrackResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Rejected analytics payload: {}", rejection.body_text());
        AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let event_type = request
        .event_type
        .as_deref()
        .map(str::trim)
        .filter(|event_type| !event_type.is_empty())
        .ok_or_else(|| AppError::BadRequest("Event type required".to_string()))?;

    let metadata = match request.metadata {
        Some(value) if !value.is_null() => value,
        _ => serde_json::json!({}),
    };

    let id = AnalyticsRepository::new(state.db())
        .record(event_type, caller.user_id.as_deref(), &caller.ip, &metadata, Utc::now())
        .await?;

    tracing::debug!(id = %id, event_type = %event_type, "Recorded analytics event");

    Ok(Json(TrackResponse { success: true }))
}
