//! Application context - dependency injection container

use std::sync::Arc;

use lexsync_core::{FanOutDriver, SyncOrchestrator, SyncSettings};
use lexsync_domain::{Config, Result};
use lexsync_infra::integrations::{GoogleCalendarProvider, GoogleCalendarSettings};
use lexsync_infra::scheduling::{CalendarSyncScheduler, CalendarSyncSchedulerConfig};
use lexsync_infra::{
    DbManager, SqliteAppointmentRepository, SqliteIntegrationRepository, SqliteMemberRepository,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub integrations: Arc<SqliteIntegrationRepository>,
    pub appointments: Arc<SqliteAppointmentRepository>,
    pub members: Arc<SqliteMemberRepository>,
    pub orchestrator: Arc<SyncOrchestrator>,
    pub fan_out: Arc<FanOutDriver>,
    /// Present when `sync.scheduler_enabled` is set.
    pub scheduler: Option<Mutex<CalendarSyncScheduler>>,
}

impl AppContext {
    /// Open the database, apply migrations and wire every service.
    pub fn new(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let integrations = Arc::new(SqliteIntegrationRepository::new(Arc::clone(&db)));
        let appointments = Arc::new(SqliteAppointmentRepository::new(Arc::clone(&db)));
        let members = Arc::new(SqliteMemberRepository::new(Arc::clone(&db)));

        let provider =
            Arc::new(GoogleCalendarProvider::new(GoogleCalendarSettings::from(&config.google))?);

        let orchestrator = Arc::new(SyncOrchestrator::new(
            provider,
            integrations.clone(),
            appointments.clone(),
            SyncSettings::from(&config.sync),
        ));
        let fan_out = Arc::new(FanOutDriver::new(Arc::clone(&orchestrator), integrations.clone()));

        let scheduler = config.sync.scheduler_enabled.then(|| {
            Mutex::new(CalendarSyncScheduler::new(
                CalendarSyncSchedulerConfig::from(&config.sync),
                Arc::clone(&fan_out),
            ))
        });

        info!(
            db_path = %config.database.path,
            scheduler_enabled = config.sync.scheduler_enabled,
            "application context initialised"
        );

        Ok(Self {
            config,
            db,
            integrations,
            appointments,
            members,
            orchestrator,
            fan_out,
            scheduler,
        })
    }

    /// Start the cron scheduler if one is configured.
    pub async fn start_scheduler(&self) -> Result<()> {
        if let Some(scheduler) = &self.scheduler {
            scheduler.lock().await.start().await?;
        }
        Ok(())
    }

    /// Stop the cron scheduler; a scheduler that is not running is ignored.
    pub async fn shutdown(&self) {
        if let Some(scheduler) = &self.scheduler {
            let mut scheduler = scheduler.lock().await;
            if scheduler.is_running() {
                if let Err(e) = scheduler.stop().await {
                    warn!(error = %e, "failed to stop calendar sync scheduler");
                }
            }
        }
    }

    /// Scheduler state for the health report: `None` when disabled.
    pub async fn scheduler_running(&self) -> Option<bool> {
        match &self.scheduler {
            Some(scheduler) => Some(scheduler.lock().await.is_running()),
            None => None,
        }
    }
}
