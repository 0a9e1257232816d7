//! Typed view of calendar provider events.
//!
//! Provider payloads are validated and defaulted at the fetcher boundary;
//! nothing past that boundary sees raw JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::appointment::{Appointment, RemoteStatus};

const UNTITLED: &str = "(sem título)";

/// Fields of a confirmed remote event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub organizer: Option<String>,
    pub html_link: Option<String>,
    /// Local appointment id written by the push phase on create.
    pub origin_appointment_id: Option<String>,
}

impl EventDetails {
    /// Summary to use as the appointment title.
    pub fn title(&self) -> String {
        self.summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNTITLED)
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RemoteEventState {
    Confirmed(EventDetails),
    /// Deleted on the provider side; only id and revision are meaningful.
    Cancelled,
}

/// An event as reported by the calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEvent {
    pub id: String,
    /// Provider revision timestamp.
    pub updated: DateTime<Utc>,
    pub state: RemoteEventState,
}

impl RemoteEvent {
    pub fn confirmed(id: impl Into<String>, updated: DateTime<Utc>, details: EventDetails) -> Self {
        Self { id: id.into(), updated, state: RemoteEventState::Confirmed(details) }
    }

    pub fn cancelled(id: impl Into<String>, updated: DateTime<Utc>) -> Self {
        Self { id: id.into(), updated, state: RemoteEventState::Cancelled }
    }

    pub fn status(&self) -> RemoteStatus {
        match self.state {
            RemoteEventState::Confirmed(_) => RemoteStatus::Confirmed,
            RemoteEventState::Cancelled => RemoteStatus::Cancelled,
        }
    }

    pub fn details(&self) -> Option<&EventDetails> {
        match &self.state {
            RemoteEventState::Confirmed(details) => Some(details),
            RemoteEventState::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.state, RemoteEventState::Cancelled)
    }
}

/// One page of a list request.
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    pub events: Vec<RemoteEvent>,
    pub next_page_token: Option<String>,
}

/// Outgoing create/update payload built from a local appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub origin_appointment_id: String,
}

impl From<&Appointment> for EventDraft {
    fn from(appointment: &Appointment) -> Self {
        Self {
            summary: appointment.title.clone(),
            description: appointment.description.clone(),
            location: appointment.location.clone(),
            start: appointment.start,
            end: appointment.end,
            all_day: appointment.all_day,
            origin_appointment_id: appointment.id.clone(),
        }
    }
}
