//! Tracing setup and structured endpoint logging.

use std::time::Duration;

use lexsync_domain::LexSyncError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Output format of the process-wide subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `LEXSYNC_LOG_FORMAT=json` selects JSON lines; anything else is pretty.
    pub fn from_env() -> Self {
        match std::env::var("LEXSYNC_LOG_FORMAT") {
            Ok(value) if value.trim().eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info`
/// filter. Returns an error if a subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Log the outcome of an endpoint execution with structured fields.
///
/// `endpoint` should be a stable route identifier without request data.
#[inline]
pub fn log_endpoint_execution(endpoint: &str, elapsed: Duration, error: Option<&LexSyncError>) {
    let duration_ms = elapsed.as_millis() as u64;

    match error {
        None => info!(endpoint, duration_ms, "endpoint_execution_success"),
        Some(err) => warn!(
            endpoint,
            duration_ms,
            error_type = err.label(),
            error = %err,
            "endpoint_execution_failure"
        ),
    }
}
