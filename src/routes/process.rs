//! Handwriting processing endpoint

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use crate::auth::Caller;
use crate::error::Result;
use crate::quota::{AccessGate, QuotaLedger};
use crate::state::AppState;
use crate::upload::{self, UploadIntake, MAX_REQUEST_BYTES};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(process_files))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
}

/// Process response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub text: String,
    /// Diagram extraction is not performed; always empty
    pub diagrams: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits_remaining: Option<i64>,
}

/// Store the submitted files, extract their text and charge the caller
///
/// Nothing is stored unless the caller is allowed and every file passes
/// validation. A failed extraction aborts the request without charging.
async fn process_files(
    State(state): State<AppState>,
    caller: Caller,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>> {
    AccessGate::new(state.db()).enforce(&caller, Utc::now()).await?;

    let files = upload::read_files(&mut multipart).await?;
    upload::validate_files(&files, state.pdf()).await?;

    tracing::info!(
        user = ?caller.user_id,
        ip = %caller.ip,
        files = files.len(),
        "Processing submission"
    );

    let intake = UploadIntake::new(&state);
    let mut texts = Vec::with_capacity(files.len());
    for file in &files {
        intake.store(&caller, file, Utc::now()).await?;
        texts.push(upload::extract_text(&state, file).await?);
    }

    let credits_remaining = QuotaLedger::new(state.db()).consume(&caller, Utc::now()).await?;
    let text = upload::join_texts(&texts);

    tracing::info!(
        user = ?caller.user_id,
        chars = text.len(),
        credits_remaining = ?credits_remaining,
        "Submission processed"
    );

    Ok(Json(ProcessResponse {
        text,
        diagrams: Vec::new(),
        credits_remaining,
    }))
}
