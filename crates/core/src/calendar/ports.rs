//! Port interfaces for calendar reconciliation
//!
//! These traits define the boundaries between the sync engine and its
//! infrastructure implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lexsync_domain::{
    Appointment, EventDraft, EventPage, Integration, Member, ProviderKind, RemoteEvent, Result,
    SyncWindow, TokenGrant, TokenState,
};

/// Trait for calendar provider operations
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Provider this adapter talks to
    fn kind(&self) -> ProviderKind;

    /// Fetch one page of events inside `window`, cancelled entries included
    async fn list_events_page(
        &self,
        access_token: &str,
        calendar_id: &str,
        window: &SyncWindow,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<EventPage>;

    /// Create an event and return it as stored by the provider
    async fn create_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        draft: &EventDraft,
    ) -> Result<RemoteEvent>;

    /// Patch an existing event with the draft's fields
    async fn update_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
        draft: &EventDraft,
    ) -> Result<RemoteEvent>;

    /// Delete an event. An event that is already gone counts as deleted.
    async fn delete_event(&self, access_token: &str, calendar_id: &str, event_id: &str)
        -> Result<()>;

    /// Exchange a refresh token for a new access token
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant>;
}

/// Trait for tenant integration records
#[async_trait]
pub trait IntegrationRepository: Send + Sync {
    /// All enabled integrations of a provider, across tenants
    async fn list_enabled(&self, provider: ProviderKind) -> Result<Vec<Integration>>;

    /// The tenant's integration with a provider, enabled or not
    async fn find_for_tenant(
        &self,
        tenant_id: &str,
        provider: ProviderKind,
    ) -> Result<Option<Integration>>;

    /// Persist refreshed token state onto the integration
    async fn save_token_state(&self, integration_id: &str, tokens: &TokenState) -> Result<()>;
}

/// Trait for the local appointment store, always scoped by tenant
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Appointments overlapping the window, tombstones included
    async fn list_in_window(&self, tenant_id: &str, window: &SyncWindow)
        -> Result<Vec<Appointment>>;

    async fn find_by_external_id(
        &self,
        tenant_id: &str,
        provider: ProviderKind,
        external_id: &str,
    ) -> Result<Option<Appointment>>;

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Appointment>>;

    async fn insert(&self, appointment: &Appointment) -> Result<()>;

    /// Overwrite the stored row, sync metadata included
    async fn update(&self, appointment: &Appointment) -> Result<()>;

    /// Physically remove a row
    async fn delete(&self, tenant_id: &str, id: &str) -> Result<()>;
}

/// Trait for resolving callers of the manual sync endpoint
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Member owning the given API token, with their memberships
    async fn find_by_api_token(&self, token: &str) -> Result<Option<Member>>;
}

/// Wall clock, injectable for deterministic tests
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
