//! Reconciliation engine: Pull (remote → local) and Push (local → remote).
//!
//! Pull decisions use revision timestamps. A remote event only overwrites a
//! linked row when its `updated` is strictly newer than the recorded
//! `remote_updated_at`, and a dirty local row that was edited at or after the
//! remote revision keeps its fields for push to send. Push decisions use the
//! row's [`SyncState`].
//!
//! Individual item failures are logged and counted; they never abort the
//! phase.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lexsync_domain::{
    Appointment, EventDetails, EventDraft, LexSyncError, ProviderKind, RemoteEvent,
    RemoteEventState, Result, SyncState, SyncSummary, SyncWindow,
};
use tracing::{debug, instrument, warn};

use super::ports::{AppointmentRepository, CalendarProvider};

/// What pull did with one remote event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    Created,
    Updated,
    Cancelled,
    Skipped,
}

/// What push did with one local appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed,
    Deleted,
    Skipped,
}

/// Remote calendar a push writes to.
#[derive(Debug, Clone, Copy)]
pub struct RemoteTarget<'a> {
    pub calendar_id: &'a str,
    pub access_token: &'a str,
}

pub struct Reconciler {
    provider: Arc<dyn CalendarProvider>,
    appointments: Arc<dyn AppointmentRepository>,
}

impl Reconciler {
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        appointments: Arc<dyn AppointmentRepository>,
    ) -> Self {
        Self { provider, appointments }
    }

    fn provider_kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    /// Apply every fetched event to the tenant's local store.
    #[instrument(skip(self, events, summary), fields(events = events.len()))]
    pub async fn pull(
        &self,
        tenant_id: &str,
        events: &[RemoteEvent],
        now: DateTime<Utc>,
        summary: &mut SyncSummary,
    ) {
        for event in events {
            match self.pull_event(tenant_id, event, now).await {
                Ok(PullOutcome::Created) => summary.created += 1,
                Ok(PullOutcome::Updated) => summary.updated += 1,
                Ok(PullOutcome::Cancelled) => summary.cancelled += 1,
                Ok(PullOutcome::Skipped) => {}
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "pull failed for event; skipping");
                    summary.failed += 1;
                }
            }
        }

        summary.pulled = summary.created + summary.updated + summary.cancelled;
    }

    /// Reconcile one remote event against its local match, if any.
    pub async fn pull_event(
        &self,
        tenant_id: &str,
        event: &RemoteEvent,
        now: DateTime<Utc>,
    ) -> Result<PullOutcome> {
        let existing = self
            .appointments
            .find_by_external_id(tenant_id, self.provider_kind(), &event.id)
            .await?;

        match (&event.state, existing) {
            (RemoteEventState::Cancelled, None) => Ok(PullOutcome::Skipped),

            (RemoteEventState::Cancelled, Some(mut appointment)) => {
                if appointment.is_cancelled() && appointment.sync.remote_known_cancelled() {
                    return Ok(PullOutcome::Skipped);
                }
                appointment.apply_remote_cancellation(event.updated, now);
                self.appointments.update(&appointment).await?;
                debug!(appointment_id = %appointment.id, "tombstoned after remote cancellation");
                Ok(PullOutcome::Cancelled)
            }

            (RemoteEventState::Confirmed(details), None) => {
                if let Some(orphan) = self.find_orphan(tenant_id, details).await? {
                    return self.adopt(orphan, event, details, now).await;
                }

                let appointment = Appointment::from_remote(
                    tenant_id,
                    self.provider_kind(),
                    &event.id,
                    event.updated,
                    details,
                    now,
                );
                self.appointments.insert(&appointment).await?;
                debug!(appointment_id = %appointment.id, "created from remote event");
                Ok(PullOutcome::Created)
            }

            (RemoteEventState::Confirmed(details), Some(mut appointment)) => {
                if !appointment.sync.is_remote_newer(event.updated) {
                    return Ok(PullOutcome::Skipped);
                }
                if appointment.is_dirty() && appointment.updated_at >= event.updated {
                    debug!(
                        appointment_id = %appointment.id,
                        "local edit is newer; leaving for push"
                    );
                    return Ok(PullOutcome::Skipped);
                }
                appointment.apply_remote(event.updated, details, now);
                self.appointments.update(&appointment).await?;
                Ok(PullOutcome::Updated)
            }
        }
    }

    /// Local row that created this event in an earlier push whose link was
    /// never written back.
    async fn find_orphan(
        &self,
        tenant_id: &str,
        details: &EventDetails,
    ) -> Result<Option<Appointment>> {
        let Some(origin_id) = details.origin_appointment_id.as_deref() else {
            return Ok(None);
        };

        Ok(self
            .appointments
            .find_by_id(tenant_id, origin_id)
            .await?
            .filter(|appointment| !appointment.is_linked()))
    }

    async fn adopt(
        &self,
        mut orphan: Appointment,
        event: &RemoteEvent,
        details: &EventDetails,
        now: DateTime<Utc>,
    ) -> Result<PullOutcome> {
        if orphan.is_cancelled() {
            // Keep the local cancellation; push deletes the remote event.
            let html_link = details.html_link.clone();
            orphan.link_remote(self.provider_kind(), &event.id, event.updated, html_link);
        } else {
            orphan.external_provider = Some(self.provider_kind());
            orphan.external_id = Some(event.id.clone());
            orphan.apply_remote(event.updated, details, now);
        }

        self.appointments.update(&orphan).await?;
        debug!(appointment_id = %orphan.id, event_id = %event.id, "adopted unlinked remote event");
        Ok(PullOutcome::Updated)
    }

    /// Send local changes for every appointment in the window.
    ///
    /// Fails only when the local rows cannot be listed.
    #[instrument(skip(self, target, summary))]
    pub async fn push(
        &self,
        tenant_id: &str,
        target: RemoteTarget<'_>,
        window: &SyncWindow,
        summary: &mut SyncSummary,
    ) -> Result<()> {
        let appointments = self.appointments.list_in_window(tenant_id, window).await?;
        summary.local_count = u32::try_from(appointments.len()).unwrap_or(u32::MAX);

        for appointment in appointments {
            let appointment_id = appointment.id.clone();
            match self.push_appointment(target, appointment).await {
                Ok(PushOutcome::Pushed) => summary.pushed += 1,
                Ok(PushOutcome::Deleted) => summary.deleted += 1,
                Ok(PushOutcome::Skipped) => {}
                Err(e) => {
                    warn!(%appointment_id, error = %e, "push failed for appointment; skipping");
                    summary.failed += 1;
                }
            }
        }

        Ok(())
    }

    /// Propagate one appointment according to its sync state.
    pub async fn push_appointment(
        &self,
        target: RemoteTarget<'_>,
        mut appointment: Appointment,
    ) -> Result<PushOutcome> {
        match appointment.sync_state() {
            SyncState::Linked | SyncState::Discarded => Ok(PushOutcome::Skipped),

            SyncState::LocalOnly => {
                let draft = EventDraft::from(&appointment);
                let created = self
                    .provider
                    .create_event(target.access_token, target.calendar_id, &draft)
                    .await?;

                appointment.link_remote(
                    self.provider_kind(),
                    &created.id,
                    created.updated,
                    created.details().and_then(|d| d.html_link.clone()),
                );
                self.appointments.update(&appointment).await?;
                debug!(
                    appointment_id = %appointment.id,
                    event_id = %created.id,
                    "created remote event"
                );
                Ok(PushOutcome::Pushed)
            }

            SyncState::LinkedDirty => {
                let event_id = linked_event_id(&appointment)?;
                let draft = EventDraft::from(&appointment);
                let updated = self
                    .provider
                    .update_event(target.access_token, target.calendar_id, &event_id, &draft)
                    .await?;

                appointment.link_remote(
                    self.provider_kind(),
                    event_id,
                    updated.updated,
                    updated.details().and_then(|d| d.html_link.clone()),
                );
                self.appointments.update(&appointment).await?;
                Ok(PushOutcome::Pushed)
            }

            // A tombstone's remote event is already cancelled; the delete
            // confirms it (404/410 count as success) before the row goes.
            SyncState::PendingRemoteDelete | SyncState::Tombstoned => {
                let event_id = linked_event_id(&appointment)?;
                self.provider
                    .delete_event(target.access_token, target.calendar_id, &event_id)
                    .await?;
                self.appointments.delete(&appointment.tenant_id, &appointment.id).await?;
                debug!(
                    appointment_id = %appointment.id,
                    %event_id,
                    "deleted remote event and local row"
                );
                Ok(PushOutcome::Deleted)
            }
        }
    }
}

fn linked_event_id(appointment: &Appointment) -> Result<String> {
    appointment.external_id.clone().ok_or_else(|| {
        LexSyncError::Internal(format!("appointment {} is not linked", appointment.id))
    })
}
