//! Configuration structures
//!
//! Loaded by `lexsync-infra::config` from the environment or a JSON/TOML
//! file. Every section except `database` and `google` has usable defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_CALENDAR_ID, DEFAULT_FUTURE_DAYS, DEFAULT_JOB_TIMEOUT_SECS,
    DEFAULT_PAGE_SIZE, DEFAULT_PAST_DAYS, DEFAULT_SYNC_CRON, GOOGLE_CALENDAR_API_BASE,
    GOOGLE_TOKEN_ENDPOINT, MAX_HORIZON_DAYS, TOKEN_REFRESH_SKEW_SECS,
};
use crate::errors::{LexSyncError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    pub google: GoogleConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Sync horizon and scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_past_days")]
    pub past_days: u32,
    #[serde(default = "default_future_days")]
    pub future_days: u32,
    /// Used when an integration has no calendar id of its own.
    #[serde(default = "default_calendar_id")]
    pub default_calendar_id: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_refresh_skew")]
    pub token_refresh_skew_secs: i64,
    #[serde(default = "default_cron")]
    pub cron_expression: String,
    #[serde(default = "default_job_timeout")]
    pub job_timeout_secs: u64,
    #[serde(default)]
    pub scheduler_enabled: bool,
}

impl SyncConfig {
    /// Reject values the sync window and the provider cannot work with.
    pub fn validate(&self) -> Result<()> {
        for (name, days) in [("past_days", self.past_days), ("future_days", self.future_days)] {
            if days > MAX_HORIZON_DAYS {
                return Err(LexSyncError::Config(format!(
                    "sync.{name} must be at most {MAX_HORIZON_DAYS}, got {days}"
                )));
            }
        }
        if self.page_size == 0 {
            return Err(LexSyncError::Config("sync.page_size must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            past_days: DEFAULT_PAST_DAYS,
            future_days: DEFAULT_FUTURE_DAYS,
            default_calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            token_refresh_skew_secs: TOKEN_REFRESH_SKEW_SECS,
            cron_expression: DEFAULT_SYNC_CRON.to_string(),
            job_timeout_secs: DEFAULT_JOB_TIMEOUT_SECS,
            scheduler_enabled: false,
        }
    }
}

/// OAuth client credentials and endpoints for Google Calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Shared secret for the scheduled endpoint. The endpoint rejects every
    /// request while unset.
    #[serde(default)]
    pub cron_secret: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: default_bind_addr(), cron_secret: None }
    }
}

fn default_pool_size() -> u32 {
    4
}

fn default_past_days() -> u32 {
    DEFAULT_PAST_DAYS
}

fn default_future_days() -> u32 {
    DEFAULT_FUTURE_DAYS
}

fn default_calendar_id() -> String {
    DEFAULT_CALENDAR_ID.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_refresh_skew() -> i64 {
    TOKEN_REFRESH_SKEW_SECS
}

fn default_cron() -> String {
    DEFAULT_SYNC_CRON.to_string()
}

fn default_job_timeout() -> u64 {
    DEFAULT_JOB_TIMEOUT_SECS
}

fn default_api_base() -> String {
    GOOGLE_CALENDAR_API_BASE.to_string()
}

fn default_token_endpoint() -> String {
    GOOGLE_TOKEN_ENDPOINT.to_string()
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}
