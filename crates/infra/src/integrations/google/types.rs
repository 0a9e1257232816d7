//! Google Calendar wire types.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use lexsync_domain::constants::ORIGIN_MARKER_KEY;
use lexsync_domain::{EventDetails, EventDraft, RemoteEvent, TokenGrant};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleEventsResponse {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleEvent {
    pub id: String,
    pub status: Option<String>,
    pub updated: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<GoogleEventTime>,
    pub end: Option<GoogleEventTime>,
    pub html_link: Option<String>,
    pub organizer: Option<GoogleOrganizer>,
    pub extended_properties: Option<GoogleExtendedProperties>,
}

/// Both keys are always written so a PATCH that switches between all-day
/// and timed clears the other one.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleOrganizer {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub(crate) struct GoogleExtendedProperties {
    #[serde(default)]
    pub private: HashMap<String, String>,
}

/// Body of create (POST) and update (PATCH) requests.
///
/// Optional fields serialize as `null` rather than being omitted: PATCH
/// merges, so an absent key would keep a value the user cleared locally.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleEventBody {
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: GoogleEventTime,
    pub end: GoogleEventTime,
    pub extended_properties: GoogleExtendedProperties,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
    pub scope: Option<String>,
    pub refresh_token: Option<String>,
}

impl From<GoogleTokenResponse> for TokenGrant {
    fn from(value: GoogleTokenResponse) -> Self {
        Self {
            access_token: value.access_token,
            expires_in: value.expires_in,
            scope: value.scope,
            refresh_token: value.refresh_token,
        }
    }
}

impl From<&EventDraft> for GoogleEventBody {
    fn from(draft: &EventDraft) -> Self {
        let (start, end) = if draft.all_day {
            (date_only(draft.start), date_only(draft.end))
        } else {
            (date_time(draft.start), date_time(draft.end))
        };

        Self {
            summary: draft.summary.clone(),
            description: draft.description.clone(),
            location: draft.location.clone(),
            start,
            end,
            extended_properties: GoogleExtendedProperties {
                private: HashMap::from([(
                    ORIGIN_MARKER_KEY.to_string(),
                    draft.origin_appointment_id.clone(),
                )]),
            },
        }
    }
}

fn date_only(at: DateTime<Utc>) -> GoogleEventTime {
    GoogleEventTime { date_time: None, date: Some(at.date_naive().format("%Y-%m-%d").to_string()) }
}

fn date_time(at: DateTime<Utc>) -> GoogleEventTime {
    GoogleEventTime { date_time: Some(at.to_rfc3339()), date: None }
}

impl GoogleEvent {
    /// Validate into the engine's typed event.
    ///
    /// `confirmed` and `tentative` (and a missing status) are confirmed. A
    /// confirmed event without a parseable start is dropped with a warning.
    /// A missing revision timestamp is read as the epoch so that any known
    /// local revision wins.
    pub(crate) fn into_remote_event(self) -> Option<RemoteEvent> {
        let updated = self
            .updated
            .as_deref()
            .and_then(parse_rfc3339)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        if self.status.as_deref() == Some("cancelled") {
            return Some(RemoteEvent::cancelled(self.id, updated));
        }

        let Some((start, all_day)) = self.start.as_ref().and_then(GoogleEventTime::resolve) else {
            warn!(event_id = %self.id, "skipping event without a usable start time");
            return None;
        };
        let end =
            self.end.as_ref().and_then(GoogleEventTime::resolve).map_or(start, |(end, _)| end);

        let origin_appointment_id = self
            .extended_properties
            .and_then(|mut props| props.private.remove(ORIGIN_MARKER_KEY))
            .filter(|id| !id.is_empty());

        Some(RemoteEvent::confirmed(
            self.id,
            updated,
            EventDetails {
                summary: self.summary,
                description: self.description,
                location: self.location,
                start,
                end,
                all_day,
                organizer: self.organizer.and_then(|o| o.email),
                html_link: self.html_link,
                origin_appointment_id,
            },
        ))
    }
}

impl GoogleEventTime {
    /// Instant and all-day flag. Date-only values are midnight UTC.
    fn resolve(&self) -> Option<(DateTime<Utc>, bool)> {
        if let Some(at) = self.date_time.as_deref().and_then(parse_rfc3339) {
            return Some((at, false));
        }

        let date = NaiveDate::parse_from_str(self.date.as_deref()?, "%Y-%m-%d").ok()?;
        Some((date.and_hms_opt(0, 0, 0)?.and_utc(), true))
    }
}

fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|at| at.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use lexsync_domain::RemoteEventState;
    use serde_json::json;

    use super::*;

    fn event(value: serde_json::Value) -> GoogleEvent {
        serde_json::from_value(value).expect("valid event json")
    }

    #[test]
    fn timed_event_converts_to_utc_with_marker() {
        let remote = event(json!({
            "id": "evt1",
            "status": "confirmed",
            "updated": "2025-03-10T09:00:00.000Z",
            "summary": "Audiência",
            "start": { "dateTime": "2025-03-10T14:00:00-03:00" },
            "end": { "dateTime": "2025-03-10T15:00:00-03:00" },
            "organizer": { "email": "ana@escritorio.example" },
            "extendedProperties": { "private": { "lexsyncAppointmentId": "appt-1" } }
        }))
        .into_remote_event()
        .expect("event converts");

        let details = remote.details().expect("confirmed");
        assert_eq!(details.start, Utc.with_ymd_and_hms(2025, 3, 10, 17, 0, 0).unwrap());
        assert!(!details.all_day);
        assert_eq!(details.organizer.as_deref(), Some("ana@escritorio.example"));
        assert_eq!(details.origin_appointment_id.as_deref(), Some("appt-1"));
        assert_eq!(remote.updated, Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap());
    }

    #[test]
    fn all_day_event_starts_at_midnight_utc() {
        let remote = event(json!({
            "id": "evt2",
            "status": "tentative",
            "start": { "date": "2025-03-12" },
            "end": { "date": "2025-03-13" }
        }))
        .into_remote_event()
        .expect("event converts");

        let details = remote.details().expect("tentative counts as confirmed");
        assert!(details.all_day);
        assert_eq!(details.start, Utc.with_ymd_and_hms(2025, 3, 12, 0, 0, 0).unwrap());
        assert_eq!(remote.updated, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn cancelled_event_needs_no_times() {
        let remote = event(json!({ "id": "evt3", "status": "cancelled" }))
            .into_remote_event()
            .expect("event converts");

        assert_eq!(remote.state, RemoteEventState::Cancelled);
    }

    #[test]
    fn confirmed_event_without_start_is_dropped() {
        let remote = event(json!({ "id": "evt4", "status": "confirmed" }));
        assert!(remote.into_remote_event().is_none());
    }

    #[test]
    fn all_day_draft_serializes_dates() {
        let start = Utc.with_ymd_and_hms(2025, 3, 12, 0, 0, 0).unwrap();
        let draft = EventDraft {
            summary: "Recesso".into(),
            description: None,
            location: None,
            start,
            end: start + chrono::Duration::days(1),
            all_day: true,
            origin_appointment_id: "appt-9".into(),
        };

        let body = serde_json::to_value(GoogleEventBody::from(&draft)).expect("serializes");
        assert_eq!(body["start"], json!({ "date": "2025-03-12", "dateTime": null }));
        assert_eq!(body["end"], json!({ "date": "2025-03-13", "dateTime": null }));
        assert_eq!(body["extendedProperties"]["private"]["lexsyncAppointmentId"], "appt-9");
        assert_eq!(body.get("description"), Some(&serde_json::Value::Null));
        assert_eq!(body.get("location"), Some(&serde_json::Value::Null));
    }
}
