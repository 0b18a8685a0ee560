//! Scrawl Server Library
//!
//! Handwriting OCR over HTTP. Signed-in users get three submissions a day;
//! guests get one per IP address. Uploads are kept for a day, then removed.
//!
//! # Modules
//!
//! - `quota`: access gate and credit ledger
//! - `upload`: multipart intake, validation, storage and text dispatch
//! - `ocr`: OCR providers behind a common trait
//! - `pdf`: PDF page counting and text extraction via MuPDF
//! - `cleanup`: expiry of stored uploads

pub mod auth;
pub mod cleanup;
pub mod config;
pub mod db;
pub mod error;
pub mod ocr;
pub mod pdf;
pub mod quota;
pub mod routes;
pub mod state;
pub mod storage;
pub mod upload;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;

/// Build the HTTP router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/access", routes::access::router())
        .nest("/api/process", routes::process::router())
        .nest("/api/analytics", routes::analytics::router())
        .nest("/api/cleanup", routes::cleanup::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
