//! Cron scheduler for the calendar fan-out.
//!
//! Each tick runs [`FanOutDriver::run`] under a timeout. Ticks that fire
//! after `stop` has begun are skipped through a cancellation token.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lexsync_core::FanOutDriver;
//! use lexsync_infra::scheduling::{
//!     CalendarSyncScheduler, CalendarSyncSchedulerConfig, SchedulerResult,
//! };
//!
//! # async fn example(driver: Arc<FanOutDriver>) -> SchedulerResult<()> {
//! let mut scheduler = CalendarSyncScheduler::new(
//!     CalendarSyncSchedulerConfig {
//!         cron_expression: "0 */15 * * * *".into(),
//!         ..Default::default()
//!     },
//!     driver,
//! );
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lexsync_core::FanOutDriver;
use lexsync_domain::constants::{DEFAULT_JOB_TIMEOUT_SECS, DEFAULT_SYNC_CRON};
use lexsync_domain::SyncConfig;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

#[derive(Debug, Clone)]
pub struct CalendarSyncSchedulerConfig {
    /// Six-field cron expression (seconds first).
    pub cron_expression: String,
    /// Timeout applied to a single fan-out run.
    pub job_timeout: Duration,
    pub start_timeout: Duration,
    pub stop_timeout: Duration,
}

impl Default for CalendarSyncSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: DEFAULT_SYNC_CRON.into(),
            job_timeout: Duration::from_secs(DEFAULT_JOB_TIMEOUT_SECS),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&SyncConfig> for CalendarSyncSchedulerConfig {
    fn from(config: &SyncConfig) -> Self {
        Self {
            cron_expression: config.cron_expression.clone(),
            job_timeout: Duration::from_secs(config.job_timeout_secs),
            ..Default::default()
        }
    }
}

/// Calendar fan-out scheduler with explicit lifecycle management.
pub struct CalendarSyncScheduler {
    scheduler: Option<JobScheduler>,
    config: CalendarSyncSchedulerConfig,
    cancellation: CancellationToken,
    driver: Arc<FanOutDriver>,
    completed_runs: Arc<AtomicU64>,
}

impl CalendarSyncScheduler {
    pub fn new(config: CalendarSyncSchedulerConfig, driver: Arc<FanOutDriver>) -> Self {
        Self {
            scheduler: None,
            config,
            cancellation: CancellationToken::new(),
            driver,
            completed_runs: Arc::new(AtomicU64::new(0)),
        }
    }

    #[instrument(skip(self), fields(cron = %self.config.cron_expression))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|source| SchedulerError::Timeout { duration: start_timeout, source })?
            .map_err(|source| SchedulerError::StartFailed { source })?;

        self.scheduler = Some(scheduler_instance);
        info!("calendar sync scheduler started");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let Some(mut scheduler) = self.scheduler.take() else {
            return Err(SchedulerError::NotRunning);
        };

        self.cancellation.cancel();

        let stop_timeout = self.config.stop_timeout;
        tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
            .await
            .map_err(|source| SchedulerError::Timeout { duration: stop_timeout, source })?
            .map_err(|source| SchedulerError::StopFailed { source })?;

        info!("calendar sync scheduler stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Fan-out runs that finished (successfully or not) since creation.
    pub fn completed_runs(&self) -> u64 {
        self.completed_runs.load(Ordering::SeqCst)
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler =
            JobScheduler::new().await.map_err(|source| SchedulerError::CreationFailed { source })?;
        let driver = Arc::clone(&self.driver);
        let cancel = self.cancellation.clone();
        let completed_runs = Arc::clone(&self.completed_runs);
        let job_timeout = self.config.job_timeout;

        let job = Job::new_async(self.config.cron_expression.as_str(), move |_id, _lock| {
            let driver = Arc::clone(&driver);
            let cancel = cancel.clone();
            let completed_runs = Arc::clone(&completed_runs);

            Box::pin(async move {
                if cancel.is_cancelled() {
                    debug!("scheduler stopping; skipping calendar sync tick");
                    return;
                }

                let started = Instant::now();
                match tokio::time::timeout(job_timeout, driver.run()).await {
                    Ok(Ok(report)) => {
                        info!(
                            success = report.success,
                            failed = report.failed,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "scheduled calendar sync finished"
                        );
                    }
                    Ok(Err(err)) => {
                        error!(
                            error_type = err.label(),
                            error = %err,
                            "scheduled calendar sync failed"
                        );
                    }
                    Err(_) => {
                        warn!(
                            timeout_secs = job_timeout.as_secs(),
                            "scheduled calendar sync timed out"
                        );
                    }
                }
                completed_runs.fetch_add(1, Ordering::SeqCst);
            })
        })
        .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        let job_id = scheduler
            .add(job)
            .await
            .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        debug!(
            cron = %self.config.cron_expression,
            job_id = %job_id,
            "registered calendar sync job"
        );
        Ok(scheduler)
    }
}

impl Drop for CalendarSyncScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("CalendarSyncScheduler dropped while running; cancelling ticks");
            self.cancellation.cancel();
        }
    }
}
