//! Per-tenant sync entry point.

use std::sync::Arc;

use lexsync_domain::constants::DEFAULT_CALENDAR_ID;
use lexsync_domain::{LexSyncError, ProviderKind, Result, SyncConfig, SyncSummary, SyncWindow};
use tracing::{info, instrument};

use super::fetcher::EventFetcher;
use super::lease::TenantLeases;
use super::ports::{
    AppointmentRepository, CalendarProvider, Clock, IntegrationRepository, SystemClock,
};
use super::reconcile::{Reconciler, RemoteTarget};
use super::token::TokenManager;

/// Knobs the orchestrator reads from configuration.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub past_days: u32,
    pub future_days: u32,
    pub default_calendar_id: String,
    pub page_size: u32,
    pub token_refresh_skew_secs: i64,
}

impl From<&SyncConfig> for SyncSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            past_days: config.past_days,
            future_days: config.future_days,
            default_calendar_id: config.default_calendar_id.clone(),
            page_size: config.page_size,
            token_refresh_skew_secs: config.token_refresh_skew_secs,
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

/// Runs token refresh, fetch, Pull and Push for one tenant.
pub struct SyncOrchestrator {
    provider_kind: ProviderKind,
    integrations: Arc<dyn IntegrationRepository>,
    tokens: TokenManager,
    fetcher: EventFetcher,
    reconciler: Reconciler,
    leases: TenantLeases,
    clock: Arc<dyn Clock>,
    settings: SyncSettings,
}

impl SyncOrchestrator {
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        integrations: Arc<dyn IntegrationRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            provider_kind: provider.kind(),
            tokens: TokenManager::new(
                Arc::clone(&provider),
                Arc::clone(&integrations),
                settings.token_refresh_skew_secs,
            ),
            fetcher: EventFetcher::new(Arc::clone(&provider), settings.page_size),
            reconciler: Reconciler::new(provider, appointments),
            integrations,
            leases: TenantLeases::new(),
            clock: Arc::new(SystemClock),
            settings,
        }
    }

    /// Share a lease registry with other orchestrators in the process
    pub fn with_leases(mut self, leases: TenantLeases) -> Self {
        self.leases = leases;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn provider_kind(&self) -> ProviderKind {
        self.provider_kind
    }

    pub fn leases(&self) -> &TenantLeases {
        &self.leases
    }

    /// Synchronize one tenant's calendar.
    ///
    /// 1. Acquire the tenant lease
    /// 2. Load the enabled integration
    /// 3. Ensure a fresh access token
    /// 4. Resolve the calendar id and the window
    /// 5. Fetch the complete remote window
    /// 6. Pull, then Push
    ///
    /// Token, lease and fetch failures abort the run. Item failures are
    /// counted in `failed`.
    #[instrument(skip(self), fields(provider = %self.provider_kind))]
    pub async fn sync_tenant(&self, tenant_id: &str) -> Result<SyncSummary> {
        let _lease = self.leases.try_acquire(tenant_id)?;

        let integration = self
            .integrations
            .find_for_tenant(tenant_id, self.provider_kind)
            .await?
            .filter(|integration| integration.enabled)
            .ok_or_else(|| {
                LexSyncError::NotFound(format!(
                    "no enabled {} integration for tenant {tenant_id}",
                    self.provider_kind
                ))
            })?;

        let now = self.clock.now();
        let tokens = self.tokens.ensure_fresh_access_token(&integration, now).await?;
        let access_token = tokens
            .access_token
            .as_deref()
            .ok_or_else(|| LexSyncError::Auth("no access token after refresh".to_string()))?;

        let default_calendar = self.default_calendar_id();
        let calendar_id = integration.calendar_id_or(default_calendar);
        let window = SyncWindow::around(now, self.settings.past_days, self.settings.future_days);

        info!(
            calendar_id,
            time_min = %window.time_min,
            time_max = %window.time_max,
            "starting calendar sync"
        );

        let events = self.fetcher.list_events(calendar_id, access_token, window).await?;

        let mut summary = SyncSummary {
            remote_count: u32::try_from(events.len()).unwrap_or(u32::MAX),
            ..SyncSummary::default()
        };

        self.reconciler.pull(tenant_id, &events, now, &mut summary).await;
        drop(events);

        let target = RemoteTarget { calendar_id, access_token };
        self.reconciler.push(tenant_id, target, &window, &mut summary).await?;

        info!(
            pulled = summary.pulled,
            created = summary.created,
            updated = summary.updated,
            cancelled = summary.cancelled,
            pushed = summary.pushed,
            deleted = summary.deleted,
            remote_count = summary.remote_count,
            local_count = summary.local_count,
            failed = summary.failed,
            "calendar sync completed"
        );

        Ok(summary)
    }

    fn default_calendar_id(&self) -> &str {
        let configured = self.settings.default_calendar_id.trim();
        if configured.is_empty() {
            DEFAULT_CALENDAR_ID
        } else {
            configured
        }
    }
}
