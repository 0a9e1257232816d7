//! Scheduling infrastructure
//!
//! A cron-driven job runs the fan-out driver across every enabled
//! integration. Lifecycle is explicit (start/stop) and each run is wrapped
//! in a timeout.

pub mod calendar_scheduler;
pub mod error;

pub use calendar_scheduler::{CalendarSyncScheduler, CalendarSyncSchedulerConfig};
pub use error::{SchedulerError, SchedulerResult};
