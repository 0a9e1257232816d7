//! Fan-out over every enabled tenant integration.

use std::sync::Arc;

use lexsync_domain::{FanOutReport, Result, TenantSyncResult};
use tracing::{error, info, instrument, warn};

use super::orchestrator::SyncOrchestrator;
use super::ports::IntegrationRepository;

/// Runs the orchestrator once per enabled integration, one tenant at a time
/// to stay inside the provider's rate limits.
pub struct FanOutDriver {
    orchestrator: Arc<SyncOrchestrator>,
    integrations: Arc<dyn IntegrationRepository>,
}

impl FanOutDriver {
    pub fn new(
        orchestrator: Arc<SyncOrchestrator>,
        integrations: Arc<dyn IntegrationRepository>,
    ) -> Self {
        Self { orchestrator, integrations }
    }

    /// Sync every enabled tenant. A tenant failure is recorded and the loop
    /// continues; only failing to enumerate integrations is an error.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<FanOutReport> {
        let provider = self.orchestrator.provider_kind();
        let integrations = self.integrations.list_enabled(provider).await?;

        info!(%provider, tenants = integrations.len(), "starting scheduled calendar sync");

        let mut report = FanOutReport::default();

        for integration in integrations {
            let tenant_id = integration.tenant_id;
            match self.orchestrator.sync_tenant(&tenant_id).await {
                Ok(summary) => {
                    info!(
                        tenant_id = %tenant_id,
                        pulled = summary.pulled,
                        pushed = summary.pushed,
                        deleted = summary.deleted,
                        failed = summary.failed,
                        "tenant sync succeeded"
                    );
                    report.record(TenantSyncResult::success(tenant_id, summary));
                }
                Err(e) => {
                    let label = e.label();
                    if e.is_fatal_for_tenant() {
                        warn!(%tenant_id, error_type = label, error = %e, "tenant sync aborted");
                    } else {
                        error!(%tenant_id, error_type = label, error = %e, "tenant sync failed");
                    }
                    report.record(TenantSyncResult::failure(tenant_id, e.to_string()));
                }
            }
        }

        info!(success = report.success, failed = report.failed, "scheduled calendar sync finished");

        Ok(report)
    }
}
