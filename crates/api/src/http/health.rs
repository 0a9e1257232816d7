use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::context::AppContext;
use crate::utils::health::{ComponentHealth, HealthStatus};

pub async fn health(State(ctx): State<Arc<AppContext>>) -> (StatusCode, Json<HealthStatus>) {
    let db = Arc::clone(&ctx.db);
    let database = match tokio::task::spawn_blocking(move || db.health_check()).await {
        Ok(Ok(())) => ComponentHealth::healthy("database"),
        Ok(Err(e)) => ComponentHealth::unhealthy("database", e.to_string()),
        Err(e) => ComponentHealth::unhealthy("database", format!("health check task failed: {e}")),
    };

    let scheduler = match ctx.scheduler_running().await {
        None => ComponentHealth::healthy_with("scheduler", "disabled"),
        Some(true) => ComponentHealth::healthy("scheduler"),
        Some(false) => ComponentHealth::unhealthy("scheduler", "not running"),
    };

    let status = HealthStatus::new().add_component(database).add_component(scheduler);
    let code = if status.is_healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(status))
}
