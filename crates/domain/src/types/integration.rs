//! Tenant integration with the calendar provider and its OAuth token state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
}

impl_domain_status_conversions!(ProviderKind {
    Google => "google",
});

/// OAuth token state stored on the integration row.
///
/// Threaded explicitly through a sync run and persisted back after a refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
}

impl TokenState {
    /// True when there is no usable access token or it expires within
    /// `skew_secs` of `now`. A token without a known expiry is trusted.
    pub fn needs_refresh(&self, now: DateTime<Utc>, skew_secs: i64) -> bool {
        if self.access_token.as_deref().filter(|t| !t.is_empty()).is_none() {
            return true;
        }

        match self.expires_at {
            Some(expires_at) => expires_at <= now + Duration::seconds(skew_secs),
            None => false,
        }
    }

    /// New state after a successful refresh. Providers usually omit the
    /// refresh token on refresh, in which case the stored one is kept.
    pub fn apply_grant(&self, grant: TokenGrant, now: DateTime<Utc>) -> Self {
        Self {
            access_token: Some(grant.access_token),
            refresh_token: grant.refresh_token.or_else(|| self.refresh_token.clone()),
            expires_at: Some(now + Duration::seconds(grant.expires_in.max(0))),
            scope: grant.scope.or_else(|| self.scope.clone()),
        }
    }
}

/// Result of a refresh-token exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: i64,
    pub scope: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationSettings {
    pub calendar_id: Option<String>,
}

/// One tenant's connection to the calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integration {
    pub id: String,
    pub tenant_id: String,
    pub provider: ProviderKind,
    pub enabled: bool,
    pub tokens: TokenState,
    pub settings: IntegrationSettings,
}

impl Integration {
    /// Configured calendar id, or `default` when unset or blank.
    pub fn calendar_id_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.settings
            .calendar_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(default)
    }
}
