//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If required variables are missing, falls back to loading from file
//! 3. Searches several paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Required:
//! - `LEXSYNC_DB_PATH`: Database file path
//! - `LEXSYNC_GOOGLE_CLIENT_ID`, `LEXSYNC_GOOGLE_CLIENT_SECRET`: OAuth client
//!
//! Optional (defaults in `lexsync_domain::constants`):
//! - `LEXSYNC_DB_POOL_SIZE`
//! - `LEXSYNC_GOOGLE_API_BASE`, `LEXSYNC_GOOGLE_TOKEN_ENDPOINT`
//! - `LEXSYNC_SYNC_PAST_DAYS`, `LEXSYNC_SYNC_FUTURE_DAYS`
//! - `LEXSYNC_DEFAULT_CALENDAR_ID`, `LEXSYNC_SYNC_PAGE_SIZE`
//! - `LEXSYNC_TOKEN_REFRESH_SKEW_SECS`
//! - `LEXSYNC_SYNC_CRON`, `LEXSYNC_SYNC_JOB_TIMEOUT_SECS`,
//!   `LEXSYNC_SCHEDULER_ENABLED`
//! - `LEXSYNC_BIND_ADDR`, `LEXSYNC_CRON_SECRET`
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./config.{json,toml}` then `./lexsync.{json,toml}` (working directory)
//! 2. The same names in the parent and grandparent directories
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use lexsync_domain::{
    Config, DatabaseConfig, GoogleConfig, LexSyncError, Result, ServerConfig, SyncConfig,
};

const CONFIG_FILE_NAMES: [&str; 4] = ["config.json", "config.toml", "lexsync.json", "lexsync.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `LexSyncError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `LexSyncError::Config` if required variables are missing or any
/// variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let defaults = SyncConfig::default();
    let server_defaults = ServerConfig::default();

    let database = DatabaseConfig {
        path: env_var("LEXSYNC_DB_PATH")?,
        pool_size: env_parse("LEXSYNC_DB_POOL_SIZE", 4)?,
    };

    let google = GoogleConfig {
        client_id: env_var("LEXSYNC_GOOGLE_CLIENT_ID")?,
        client_secret: env_var("LEXSYNC_GOOGLE_CLIENT_SECRET")?,
        api_base: env_or(
            "LEXSYNC_GOOGLE_API_BASE",
            lexsync_domain::constants::GOOGLE_CALENDAR_API_BASE,
        ),
        token_endpoint: env_or(
            "LEXSYNC_GOOGLE_TOKEN_ENDPOINT",
            lexsync_domain::constants::GOOGLE_TOKEN_ENDPOINT,
        ),
    };

    let sync = SyncConfig {
        past_days: env_parse("LEXSYNC_SYNC_PAST_DAYS", defaults.past_days)?,
        future_days: env_parse("LEXSYNC_SYNC_FUTURE_DAYS", defaults.future_days)?,
        default_calendar_id: env_or("LEXSYNC_DEFAULT_CALENDAR_ID", &defaults.default_calendar_id),
        page_size: env_parse("LEXSYNC_SYNC_PAGE_SIZE", defaults.page_size)?,
        token_refresh_skew_secs: env_parse(
            "LEXSYNC_TOKEN_REFRESH_SKEW_SECS",
            defaults.token_refresh_skew_secs,
        )?,
        cron_expression: env_or("LEXSYNC_SYNC_CRON", &defaults.cron_expression),
        job_timeout_secs: env_parse("LEXSYNC_SYNC_JOB_TIMEOUT_SECS", defaults.job_timeout_secs)?,
        scheduler_enabled: env_bool("LEXSYNC_SCHEDULER_ENABLED", defaults.scheduler_enabled),
    };

    let server = ServerConfig {
        bind_addr: env_or("LEXSYNC_BIND_ADDR", &server_defaults.bind_addr),
        cron_secret: std::env::var("LEXSYNC_CRON_SECRET").ok().filter(|s| !s.is_empty()),
    };

    sync.validate()?;
    Ok(Config { database, sync, google, server })
}

/// Load configuration from a file
///
/// If `path` is `None`, searches several locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `LexSyncError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LexSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => discover_config_path().ok_or_else(|| {
            LexSyncError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LexSyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format chosen by extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let config: Config = match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| LexSyncError::Config(format!("Invalid TOML format: {e}")))?,
        "json" => serde_json::from_str(contents)
            .map_err(|e| LexSyncError::Config(format!("Invalid JSON format: {e}")))?,
        _ => return Err(LexSyncError::Config(format!("Unsupported config format: {extension}"))),
    };

    config.sync.validate()?;
    Ok(config)
}

/// Search several paths for a configuration file
///
/// Returns the first config file found, or `None` if no file exists.
pub fn discover_config_path() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend([exe_dir.to_path_buf(), exe_dir.join(".."), exe_dir.join("../..")]);
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            LexSyncError::Config(format!("Missing required environment variable: {key}"))
        })
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| LexSyncError::Config(format!("Invalid value for {key}: {e}"))),
        _ => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
