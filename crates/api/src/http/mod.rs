//! HTTP surface
//!
//! - `POST /api/calendar/sync`: manual sync for the caller's tenant
//! - `POST /api/calendar/sync/scheduled`: fan-out across every tenant
//! - `GET /health`: database and scheduler status

pub mod error;
pub mod health;
pub mod sync;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::context::AppContext;

pub use error::ApiError;

/// Build the application router over a shared context.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/calendar/sync", post(sync::manual_sync))
        .route("/api/calendar/sync/scheduled", post(sync::scheduled_sync))
        .with_state(ctx)
}
