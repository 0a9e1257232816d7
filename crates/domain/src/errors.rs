//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for LexSync
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum LexSyncError {
    /// Local appointment store failure.
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failure talking to a remote service.
    #[error("Network error: {0}")]
    Network(String),

    /// Missing/invalid credentials or a failed token refresh. Fatal for the
    /// tenant's run.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Caller is authenticated but lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The calendar provider answered with a non-success status.
    #[error("Remote API error: {0}")]
    RemoteApi(String),

    /// Another sync run already holds the tenant's lease.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LexSyncError {
    /// Stable, low-cardinality label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::RemoteApi(_) => "remote_api",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal",
        }
    }

    /// True when the error must abort the tenant's whole run rather than a
    /// single reconciliation step.
    pub fn is_fatal_for_tenant(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Forbidden(_) | Self::Conflict(_))
    }
}

/// Result type alias for LexSync operations
pub type Result<T> = std::result::Result<T, LexSyncError>;
