//! Application constants
//!
//! Centralized location for domain-level defaults used by the sync engine.

// Sync horizon defaults
pub const DEFAULT_PAST_DAYS: u32 = 90;
pub const DEFAULT_FUTURE_DAYS: u32 = 180;
/// Upper bound for either side of the sync horizon.
pub const MAX_HORIZON_DAYS: u32 = 36_600;

// Calendar provider defaults
pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_PAGE_SIZE: u32 = 250;
pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Refresh the access token when it expires within this many seconds.
pub const TOKEN_REFRESH_SKEW_SECS: i64 = 60;

/// Private extended property carrying the local appointment id on events
/// created by the push phase.
pub const ORIGIN_MARKER_KEY: &str = "lexsyncAppointmentId";

// Scheduling
pub const DEFAULT_SYNC_CRON: &str = "0 */15 * * * *";
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 600;

// HTTP surface
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";
pub const CRON_SECRET_HEADER: &str = "x-cron-secret";
