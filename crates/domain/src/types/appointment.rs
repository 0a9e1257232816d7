//! Local appointment model and its sync bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::integration::ProviderKind;
use super::remote_event::EventDetails;
use crate::impl_domain_status_conversions;

/// Lifecycle status of a local appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Active,
    /// Tombstone: kept until the remote counterpart is gone.
    Cancelled,
}

impl_domain_status_conversions!(AppointmentStatus {
    Active => "active",
    Cancelled => "cancelled",
});

/// Status last reported by the calendar provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    Confirmed,
    Cancelled,
}

impl_domain_status_conversions!(RemoteStatus {
    Confirmed => "confirmed",
    Cancelled => "cancelled",
});

/// Sync bookkeeping stored alongside each appointment.
///
/// Merge rules:
/// - `remote_updated_at` and `remote_status` are overwritten by whatever the
///   provider last reported, either while pulling or in a push response.
/// - `remote_link` is overwritten only by a known value; a provider response
///   without a link keeps the previous one.
/// - `local_updated_at` is the appointment's `updated_at` at the moment it
///   was last reconciled with the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetadata {
    pub remote_updated_at: Option<DateTime<Utc>>,
    pub remote_status: Option<RemoteStatus>,
    pub remote_link: Option<String>,
    pub local_updated_at: Option<DateTime<Utc>>,
}

impl SyncMetadata {
    /// Merge what the provider reported about the linked event.
    pub fn record_remote(
        &mut self,
        updated: DateTime<Utc>,
        status: RemoteStatus,
        link: Option<String>,
    ) {
        self.remote_updated_at = Some(updated);
        self.remote_status = Some(status);
        if link.is_some() {
            self.remote_link = link;
        }
    }

    /// Record that the local revision `local_revision` is in sync.
    pub fn mark_reconciled(&mut self, local_revision: DateTime<Utc>) {
        self.local_updated_at = Some(local_revision);
    }

    /// Strictly-newer check. Equal timestamps are *not* newer, so two sides
    /// that agree on a revision never trade authority back and forth.
    pub fn is_remote_newer(&self, remote_updated: DateTime<Utc>) -> bool {
        match self.remote_updated_at {
            Some(known) => remote_updated > known,
            None => true,
        }
    }

    pub fn remote_known_cancelled(&self) -> bool {
        self.remote_status == Some(RemoteStatus::Cancelled)
    }
}

/// Position of an appointment in the sync state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Created locally, never pushed.
    LocalOnly,
    /// Cancelled before it ever reached the provider.
    Discarded,
    Linked,
    /// Linked and edited locally since the last reconcile.
    LinkedDirty,
    /// Cancelled locally; the remote event still has to be deleted.
    PendingRemoteDelete,
    /// Cancelled and the provider already reports the event cancelled. Push
    /// confirms the remote delete and removes the row.
    Tombstoned,
}

/// A tenant's appointment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub tenant_id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    pub location: Option<String>,
    pub description: Option<String>,
    pub external_provider: Option<ProviderKind>,
    pub external_id: Option<String>,
    #[serde(default)]
    pub sync: SyncMetadata,
    pub status: AppointmentStatus,
    /// Local revision timestamp; bumped on every local write.
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// A user-created appointment that has not reached the provider yet.
    pub fn new_local(
        tenant_id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            tenant_id: tenant_id.into(),
            title: title.into(),
            start,
            end,
            all_day: false,
            location: None,
            description: None,
            external_provider: None,
            external_id: None,
            sync: SyncMetadata::default(),
            status: AppointmentStatus::Active,
            updated_at: now,
        }
    }

    /// Build a linked appointment from a confirmed remote event.
    pub fn from_remote(
        tenant_id: impl Into<String>,
        provider: ProviderKind,
        external_id: impl Into<String>,
        remote_updated: DateTime<Utc>,
        details: &EventDetails,
        now: DateTime<Utc>,
    ) -> Self {
        let mut appointment = Self::new_local(tenant_id, "", details.start, details.end, now);
        appointment.external_provider = Some(provider);
        appointment.external_id = Some(external_id.into());
        appointment.apply_remote(remote_updated, details, now);
        appointment
    }

    /// Overwrite local fields with the remote event's and mark the row clean.
    pub fn apply_remote(
        &mut self,
        remote_updated: DateTime<Utc>,
        details: &EventDetails,
        now: DateTime<Utc>,
    ) {
        self.title = details.title();
        self.start = details.start;
        self.end = details.end;
        self.all_day = details.all_day;
        self.location = details.location.clone();
        self.description = details.description.clone();
        self.status = AppointmentStatus::Active;
        self.updated_at = now;
        self.sync.record_remote(remote_updated, RemoteStatus::Confirmed, details.html_link.clone());
        self.sync.mark_reconciled(now);
    }

    /// Tombstone the row because the provider reports the event cancelled.
    pub fn apply_remote_cancellation(&mut self, remote_updated: DateTime<Utc>, now: DateTime<Utc>) {
        self.status = AppointmentStatus::Cancelled;
        self.updated_at = now;
        self.sync.record_remote(remote_updated, RemoteStatus::Cancelled, None);
        self.sync.mark_reconciled(now);
    }

    /// Link the row to a remote event created or updated by the push phase.
    pub fn link_remote(
        &mut self,
        provider: ProviderKind,
        external_id: impl Into<String>,
        remote_updated: DateTime<Utc>,
        link: Option<String>,
    ) {
        self.external_provider = Some(provider);
        self.external_id = Some(external_id.into());
        self.sync.record_remote(remote_updated, RemoteStatus::Confirmed, link);
        self.sync.mark_reconciled(self.updated_at);
    }

    pub fn is_linked(&self) -> bool {
        self.external_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == AppointmentStatus::Cancelled
    }

    /// Edited locally since the last reconcile.
    pub fn is_dirty(&self) -> bool {
        match self.sync.local_updated_at {
            Some(reconciled) => self.updated_at > reconciled,
            None => true,
        }
    }

    pub fn sync_state(&self) -> SyncState {
        match (self.is_linked(), self.status) {
            (false, AppointmentStatus::Active) => SyncState::LocalOnly,
            (false, AppointmentStatus::Cancelled) => SyncState::Discarded,
            (true, AppointmentStatus::Cancelled) if self.sync.remote_known_cancelled() => {
                SyncState::Tombstoned
            }
            (true, AppointmentStatus::Cancelled) => SyncState::PendingRemoteDelete,
            (true, AppointmentStatus::Active) if self.is_dirty() => SyncState::LinkedDirty,
            (true, AppointmentStatus::Active) => SyncState::Linked,
        }
    }
}
