#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use lexsync_domain::{
    Appointment, Integration, IntegrationSettings, ProviderKind, TokenState,
};
use lexsync_infra::database::DbManager;
use lexsync_infra::integrations::{GoogleCalendarProvider, GoogleCalendarSettings};
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with the schema applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("lexsync-test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap()
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
}

pub fn integration(tenant_id: &str) -> Integration {
    Integration {
        id: format!("int-{tenant_id}"),
        tenant_id: tenant_id.to_string(),
        provider: ProviderKind::Google,
        enabled: true,
        tokens: TokenState {
            access_token: Some(format!("access-{tenant_id}")),
            refresh_token: Some(format!("refresh-{tenant_id}")),
            expires_at: Some(now() + Duration::hours(1)),
            scope: Some("https://www.googleapis.com/auth/calendar".to_string()),
        },
        settings: IntegrationSettings::default(),
    }
}

pub fn appointment(tenant_id: &str, title: &str, start: DateTime<Utc>) -> Appointment {
    Appointment::new_local(tenant_id, title, start, start + Duration::hours(1), now())
}

/// Provider pointed at a mock server for both the API and the token endpoint.
pub fn google_provider(base_uri: &str) -> GoogleCalendarProvider {
    GoogleCalendarProvider::new(GoogleCalendarSettings {
        api_base: format!("{base_uri}/calendar/v3"),
        token_endpoint: format!("{base_uri}/token"),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
    })
    .expect("provider should build")
}

/// Clock pinned to [`now`].
pub struct FixedClock;

impl lexsync_core::Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        now()
    }
}
