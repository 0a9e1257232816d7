//! Manual and scheduled sync endpoints.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use lexsync_core::MemberDirectory;
use lexsync_domain::constants::CRON_SECRET_HEADER;
use lexsync_domain::{FanOutReport, LexSyncError, Result, SyncSummary};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::info;

use super::error::ApiError;
use crate::context::AppContext;
use crate::utils::logging::log_endpoint_execution;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualSyncRequest {
    pub tenant_id: Option<String>,
}

/// `POST /api/calendar/sync`
pub async fn manual_sync(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Json<SyncSummary>, ApiError> {
    let started = Instant::now();
    let result = run_manual_sync(&ctx, &headers, &body).await;
    log_endpoint_execution("calendar.sync.manual", started.elapsed(), result.as_ref().err());
    Ok(Json(result?))
}

async fn run_manual_sync(
    ctx: &AppContext,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<SyncSummary> {
    let token = bearer_token(headers)
        .ok_or_else(|| LexSyncError::Auth("missing bearer token".to_string()))?;
    let member = ctx
        .members
        .find_by_api_token(token)
        .await?
        .ok_or_else(|| LexSyncError::Auth("invalid api token".to_string()))?;

    let request = parse_request(body)?;
    let tenant_id = member.resolve_sync_tenant(request.tenant_id.as_deref())?;

    info!(member_id = %member.id, tenant_id = %tenant_id, "manual calendar sync requested");
    ctx.orchestrator.sync_tenant(&tenant_id).await
}

/// `POST /api/calendar/sync/scheduled`
pub async fn scheduled_sync(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> std::result::Result<Json<FanOutReport>, ApiError> {
    let started = Instant::now();
    let result = run_scheduled_sync(&ctx, &headers).await;
    log_endpoint_execution("calendar.sync.scheduled", started.elapsed(), result.as_ref().err());
    Ok(Json(result?))
}

async fn run_scheduled_sync(ctx: &AppContext, headers: &HeaderMap) -> Result<FanOutReport> {
    let presented = headers.get(CRON_SECRET_HEADER).and_then(|v| v.to_str().ok());
    if !cron_secret_matches(ctx.config.server.cron_secret.as_deref(), presented) {
        return Err(LexSyncError::Auth("invalid cron secret".to_string()));
    }

    ctx.fan_out.run().await
}

/// `Authorization: Bearer <token>`, scheme case-insensitive.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Empty body means no explicit tenant.
fn parse_request(body: &[u8]) -> Result<ManualSyncRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ManualSyncRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| LexSyncError::InvalidInput(format!("invalid request body: {e}")))
}

/// Compare SHA-256 digests so the comparison does not depend on where the
/// inputs first differ. An unset secret rejects everything.
fn cron_secret_matches(expected: Option<&str>, presented: Option<&str>) -> bool {
    let (Some(expected), Some(presented)) = (expected, presented) else {
        return false;
    };
    let expected = Sha256::digest(expected.as_bytes());
    let presented = Sha256::digest(presented.as_bytes());
    expected.iter().zip(presented.iter()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
