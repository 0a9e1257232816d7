//! Token lifecycle for one tenant's integration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lexsync_domain::{Integration, LexSyncError, Result, TokenState};
use tracing::{debug, info, instrument, warn};

use super::ports::{CalendarProvider, IntegrationRepository};

/// Keeps an integration's access token usable.
pub struct TokenManager {
    provider: Arc<dyn CalendarProvider>,
    integrations: Arc<dyn IntegrationRepository>,
    skew_secs: i64,
}

impl TokenManager {
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        integrations: Arc<dyn IntegrationRepository>,
        skew_secs: i64,
    ) -> Self {
        Self { provider, integrations, skew_secs }
    }

    /// Return token state whose access token is valid past `now + skew`.
    ///
    /// Refreshes through the provider when needed and persists the result.
    /// Missing refresh token or a failed exchange is an `Auth` error. A
    /// failed persist is logged and the in-memory token is still returned.
    #[instrument(skip(self, integration), fields(tenant_id = %integration.tenant_id))]
    pub async fn ensure_fresh_access_token(
        &self,
        integration: &Integration,
        now: DateTime<Utc>,
    ) -> Result<TokenState> {
        let current = &integration.tokens;
        if !current.needs_refresh(now, self.skew_secs) {
            debug!("access token still valid");
            return Ok(current.clone());
        }

        let refresh_token = current
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LexSyncError::Auth("integration has no refresh token".to_string()))?;

        let grant = self.provider.refresh_access_token(refresh_token).await.map_err(|e| match e {
            LexSyncError::Auth(_) => e,
            other => LexSyncError::Auth(format!("token refresh failed: {other}")),
        })?;

        let refreshed = current.apply_grant(grant, now);

        if let Err(e) = self.integrations.save_token_state(&integration.id, &refreshed).await {
            warn!(
                error = %e,
                integration_id = %integration.id,
                "failed to persist refreshed token"
            );
        } else {
            info!(expires_at = ?refreshed.expires_at, "access token refreshed");
        }

        Ok(refreshed)
    }
}
