//! Shared test helpers for `lexsync-core` integration tests.
//!
//! In-memory implementations of every port plus a harness that wires them
//! into a `SyncOrchestrator`, so tests can focus on reconciliation behaviour
//! instead of boilerplate.

#![allow(dead_code)]

pub mod calendar;
pub mod repositories;

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use lexsync_core::{FanOutDriver, Reconciler, SyncOrchestrator, SyncSettings};
use lexsync_domain::{
    Appointment, Integration, IntegrationSettings, ProviderKind, TokenState,
};

pub use calendar::MockCalendarProvider;
pub use repositories::{FixedClock, MockAppointmentRepository, MockIntegrationRepository};

/// Reference "now" for every test: 2025-03-10T08:00Z.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap()
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
}

/// Enabled Google integration with an access token valid for an hour.
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

/// Local appointment that was never pushed.
pub fn local_appointment(tenant_id: &str, title: &str, start: DateTime<Utc>) -> Appointment {
    let end = start + Duration::hours(1);
    Appointment::new_local(tenant_id, title, start, end, now() - Duration::hours(1))
}

pub struct Harness {
    pub provider: Arc<MockCalendarProvider>,
    pub integrations: Arc<MockIntegrationRepository>,
    pub appointments: Arc<MockAppointmentRepository>,
    pub clock: Arc<FixedClock>,
    pub orchestrator: Arc<SyncOrchestrator>,
}

impl Harness {
    /// Harness with one enabled integration for `tenant_id`.
    pub fn new(tenant_id: &str) -> Self {
        Self::with_integrations(vec![integration(tenant_id)], SyncSettings::default())
    }

    pub fn with_integrations(integrations: Vec<Integration>, settings: SyncSettings) -> Self {
        let provider = Arc::new(MockCalendarProvider::new(now()));
        let integrations = Arc::new(MockIntegrationRepository::new(integrations));
        let appointments = Arc::new(MockAppointmentRepository::default());
        let clock = Arc::new(FixedClock::new(now()));

        let orchestrator = Arc::new(
            SyncOrchestrator::new(
                provider.clone(),
                integrations.clone(),
                appointments.clone(),
                settings,
            )
            .with_clock(clock.clone()),
        );

        Self { provider, integrations, appointments, clock, orchestrator }
    }

    /// Reconciler over the same in-memory provider and store.
    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.provider.clone(), self.appointments.clone())
    }

    pub fn fan_out(&self) -> FanOutDriver {
        FanOutDriver::new(Arc::clone(&self.orchestrator), self.integrations.clone())
    }
}
