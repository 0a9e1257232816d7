//! Mock repository implementations for testing
//!
//! In-memory versions of the store ports with simple failure injection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use lexsync_core::{AppointmentRepository, Clock, IntegrationRepository};
use lexsync_domain::{
    Appointment, Integration, LexSyncError, ProviderKind, Result as DomainResult, SyncWindow,
    TokenState,
};

/// In-memory mock for `IntegrationRepository`.
#[derive(Default)]
pub struct MockIntegrationRepository {
    integrations: Mutex<Vec<Integration>>,
    saved: Mutex<Vec<(String, TokenState)>>,
    fail_save: AtomicBool,
    fail_list: AtomicBool,
}

impl MockIntegrationRepository {
    pub fn new(integrations: Vec<Integration>) -> Self {
        Self { integrations: Mutex::new(integrations), ..Self::default() }
    }

    /// Token states persisted so far, keyed by integration id.
    pub fn saved_tokens(&self) -> Vec<(String, TokenState)> {
        self.saved.lock().unwrap().clone()
    }

    pub fn fail_saves(&self) {
        self.fail_save.store(true, Ordering::SeqCst);
    }

    pub fn fail_listing(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    pub fn update_tokens(&self, tenant_id: &str, tokens: TokenState) {
        let mut integrations = self.integrations.lock().unwrap();
        if let Some(integration) = integrations.iter_mut().find(|i| i.tenant_id == tenant_id) {
            integration.tokens = tokens;
        }
    }
}

#[async_trait]
impl IntegrationRepository for MockIntegrationRepository {
    async fn list_enabled(&self, provider: ProviderKind) -> DomainResult<Vec<Integration>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(LexSyncError::Database("database is locked".to_string()));
        }
        Ok(self
            .integrations
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.enabled && i.provider == provider)
            .cloned()
            .collect())
    }

    async fn find_for_tenant(
        &self,
        tenant_id: &str,
        provider: ProviderKind,
    ) -> DomainResult<Option<Integration>> {
        Ok(self
            .integrations
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.tenant_id == tenant_id && i.provider == provider)
            .cloned())
    }

    async fn save_token_state(
        &self,
        integration_id: &str,
        tokens: &TokenState,
    ) -> DomainResult<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(LexSyncError::Database("disk I/O error".to_string()));
        }

        let mut integrations = self.integrations.lock().unwrap();
        if let Some(integration) = integrations.iter_mut().find(|i| i.id == integration_id) {
            integration.tokens = tokens.clone();
        }
        self.saved.lock().unwrap().push((integration_id.to_string(), tokens.clone()));
        Ok(())
    }
}

/// In-memory mock for `AppointmentRepository`.
///
/// Rows keep insertion order so list results are deterministic.
#[derive(Default)]
pub struct MockAppointmentRepository {
    rows: Mutex<Vec<Appointment>>,
    fail_next_update: AtomicBool,
    fail_list: AtomicBool,
}

impl MockAppointmentRepository {
    pub fn seed(&self, appointment: Appointment) {
        self.rows.lock().unwrap().push(appointment);
    }

    pub fn all(&self) -> Vec<Appointment> {
        self.rows.lock().unwrap().clone()
    }

    pub fn get(&self, id: &str) -> Option<Appointment> {
        self.all().into_iter().find(|a| a.id == id)
    }

    pub fn by_external_id(&self, external_id: &str) -> Option<Appointment> {
        self.all().into_iter().find(|a| a.external_id.as_deref() == Some(external_id))
    }

    /// Simulate a user edit: replace the row and bump its revision.
    pub fn edit_locally(
        &self,
        id: &str,
        edited_at: DateTime<Utc>,
        edit: impl FnOnce(&mut Appointment),
    ) {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.iter_mut().find(|a| a.id == id).expect("appointment to edit");
        edit(row);
        row.updated_at = edited_at;
    }

    pub fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }

    pub fn fail_listing(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AppointmentRepository for MockAppointmentRepository {
    async fn list_in_window(
        &self,
        tenant_id: &str,
        window: &SyncWindow,
    ) -> DomainResult<Vec<Appointment>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(LexSyncError::Database("database is locked".to_string()));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.tenant_id == tenant_id && window.overlaps(a.start, a.end))
            .cloned()
            .collect())
    }

    async fn find_by_external_id(
        &self,
        tenant_id: &str,
        provider: ProviderKind,
        external_id: &str,
    ) -> DomainResult<Option<Appointment>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|a| {
                a.tenant_id == tenant_id
                    && a.external_provider == Some(provider)
                    && a.external_id.as_deref() == Some(external_id)
            })
            .cloned())
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> DomainResult<Option<Appointment>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.tenant_id == tenant_id && a.id == id)
            .cloned())
    }

    async fn insert(&self, appointment: &Appointment) -> DomainResult<()> {
        self.rows.lock().unwrap().push(appointment.clone());
        Ok(())
    }

    async fn update(&self, appointment: &Appointment) -> DomainResult<()> {
        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Err(LexSyncError::Database("database is busy".to_string()));
        }

        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|a| a.id == appointment.id)
            .ok_or_else(|| LexSyncError::NotFound(format!("appointment {}", appointment.id)))?;
        *row = appointment.clone();
        Ok(())
    }

    async fn delete(&self, tenant_id: &str, id: &str) -> DomainResult<()> {
        self.rows.lock().unwrap().retain(|a| !(a.tenant_id == tenant_id && a.id == id));
        Ok(())
    }
}

/// Clock pinned to a settable instant.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
