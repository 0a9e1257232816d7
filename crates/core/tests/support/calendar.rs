use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use lexsync_core::CalendarProvider;
use lexsync_domain::{
    EventDetails, EventDraft, EventPage, LexSyncError, ProviderKind, RemoteEvent,
    RemoteEventState, Result as DomainResult, SyncWindow, TokenGrant,
};

#[derive(Default)]
struct CalendarState {
    events: Vec<RemoteEvent>,
    revision: Option<DateTime<Utc>>,
    next_id: u32,
    calls: Vec<String>,
    page_tokens: Vec<Option<String>>,
    calendar_ids: Vec<String>,
    failing_titles: HashSet<String>,
    fail_page: Option<usize>,
    repeat_page_token: bool,
    refresh_grant: Option<TokenGrant>,
    refresh_error: Option<LexSyncError>,
}

/// In-memory calendar that behaves like the provider's list/create/patch/
/// delete endpoints.
///
/// Every mutation stamps the event with a strictly increasing revision,
/// starting one second after the `base` passed to [`MockCalendarProvider::new`].
/// Deleted events stay listed as cancelled, the way `showDeleted=true` does.
pub struct MockCalendarProvider {
    base: DateTime<Utc>,
    state: Mutex<CalendarState>,
}

impl MockCalendarProvider {
    pub fn new(base: DateTime<Utc>) -> Self {
        Self { base, state: Mutex::new(CalendarState::default()) }
    }

    /// Seed an event as if another client had written it.
    pub fn seed(&self, event: RemoteEvent) {
        self.state.lock().unwrap().events.push(event);
    }

    /// Seed a confirmed event and return its revision.
    pub fn seed_confirmed(&self, id: &str, title: &str, start: DateTime<Utc>) -> DateTime<Utc> {
        let revision = self.next_revision();
        self.seed(RemoteEvent::confirmed(id, revision, details(title, start)));
        revision
    }

    /// Simulate an edit made in the provider's own UI.
    pub fn edit_remotely(&self, id: &str, title: &str, updated: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap();
        let event = state.events.iter_mut().find(|e| e.id == id).expect("event to edit");
        if let RemoteEventState::Confirmed(details) = &mut event.state {
            details.summary = Some(title.to_string());
        }
        event.updated = updated;
    }

    pub fn events(&self) -> Vec<RemoteEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn event(&self, id: &str) -> Option<RemoteEvent> {
        self.events().into_iter().find(|e| e.id == id)
    }

    /// Mutating calls in order, e.g. `create:Reunião`, `update:evt-1`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Page tokens passed to each list request.
    pub fn page_tokens(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().page_tokens.clone()
    }

    /// Calendar id passed to each list request.
    pub fn listed_calendars(&self) -> Vec<String> {
        self.state.lock().unwrap().calendar_ids.clone()
    }

    /// Make create/update calls for drafts with this summary fail.
    pub fn fail_writes_for(&self, title: &str) {
        self.state.lock().unwrap().failing_titles.insert(title.to_string());
    }

    /// Fail the list request for the page at this zero-based index.
    pub fn fail_page(&self, index: usize) {
        self.state.lock().unwrap().fail_page = Some(index);
    }

    /// Always answer with the same continuation token.
    pub fn repeat_page_token(&self) {
        self.state.lock().unwrap().repeat_page_token = true;
    }

    pub fn set_refresh_grant(&self, grant: TokenGrant) {
        self.state.lock().unwrap().refresh_grant = Some(grant);
    }

    pub fn set_refresh_error(&self, error: LexSyncError) {
        self.state.lock().unwrap().refresh_error = Some(error);
    }

    pub fn refresh_calls(&self) -> usize {
        self.calls().iter().filter(|c| c.starts_with("refresh")).count()
    }

    fn next_revision(&self) -> DateTime<Utc> {
        let mut state = self.state.lock().unwrap();
        let revision = state.revision.unwrap_or(self.base) + Duration::seconds(1);
        state.revision = Some(revision);
        revision
    }

    fn details_from_draft(id: &str, draft: &EventDraft) -> EventDetails {
        EventDetails {
            summary: Some(draft.summary.clone()),
            description: draft.description.clone(),
            location: draft.location.clone(),
            start: draft.start,
            end: draft.end,
            all_day: draft.all_day,
            organizer: Some("agenda@escritorio.example".to_string()),
            html_link: Some(format!("https://calendar.test/event?eid={id}")),
            origin_appointment_id: Some(draft.origin_appointment_id.clone()),
        }
    }
}

/// Details for a seeded one-hour event.
pub fn details(title: &str, start: DateTime<Utc>) -> EventDetails {
    EventDetails {
        summary: Some(title.to_string()),
        description: None,
        location: None,
        start,
        end: start + Duration::hours(1),
        all_day: false,
        organizer: None,
        html_link: None,
        origin_appointment_id: None,
    }
}

#[async_trait]
impl CalendarProvider for MockCalendarProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn list_events_page(
        &self,
        _access_token: &str,
        calendar_id: &str,
        window: &SyncWindow,
        page_size: u32,
        page_token: Option<&str>,
    ) -> DomainResult<EventPage> {
        let mut state = self.state.lock().unwrap();
        state.page_tokens.push(page_token.map(str::to_string));
        state.calendar_ids.push(calendar_id.to_string());

        let page_index = state.page_tokens.len() - 1;
        if state.fail_page == Some(page_index) {
            return Err(LexSyncError::RemoteApi("list failed with status 500".to_string()));
        }

        let visible: Vec<RemoteEvent> = state
            .events
            .iter()
            .filter(|event| match &event.state {
                RemoteEventState::Confirmed(d) => window.overlaps(d.start, d.end),
                RemoteEventState::Cancelled => true,
            })
            .cloned()
            .collect();

        let offset = page_token
            .and_then(|t| t.strip_prefix("offset-"))
            .and_then(|o| o.parse::<usize>().ok())
            .unwrap_or(0);
        let size = page_size as usize;
        let events: Vec<RemoteEvent> = visible.iter().skip(offset).take(size).cloned().collect();

        let next_page_token = if state.repeat_page_token {
            Some("offset-0".to_string())
        } else if offset + size < visible.len() {
            Some(format!("offset-{}", offset + size))
        } else {
            None
        };

        Ok(EventPage { events, next_page_token })
    }

    async fn create_event(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        draft: &EventDraft,
    ) -> DomainResult<RemoteEvent> {
        let revision = self.next_revision();
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create:{}", draft.summary));
        if state.failing_titles.contains(&draft.summary) {
            return Err(LexSyncError::RemoteApi("create failed with status 503".to_string()));
        }

        state.next_id += 1;
        let id = format!("evt-{}", state.next_id);
        let event = RemoteEvent::confirmed(&id, revision, Self::details_from_draft(&id, draft));
        state.events.push(event.clone());
        Ok(event)
    }

    async fn update_event(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        event_id: &str,
        draft: &EventDraft,
    ) -> DomainResult<RemoteEvent> {
        let revision = self.next_revision();
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("update:{event_id}"));
        if state.failing_titles.contains(&draft.summary) {
            return Err(LexSyncError::RemoteApi("patch failed with status 503".to_string()));
        }

        let event = state
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| LexSyncError::RemoteApi(format!("event {event_id} not found")))?;
        event.updated = revision;
        event.state = RemoteEventState::Confirmed(Self::details_from_draft(event_id, draft));
        Ok(event.clone())
    }

    async fn delete_event(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        event_id: &str,
    ) -> DomainResult<()> {
        let revision = self.next_revision();
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete:{event_id}"));
        if let Some(event) = state.events.iter_mut().find(|e| e.id == event_id) {
            event.updated = revision;
            event.state = RemoteEventState::Cancelled;
        }
        Ok(())
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> DomainResult<TokenGrant> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("refresh:{refresh_token}"));
        if let Some(error) = state.refresh_error.clone() {
            return Err(error);
        }
        Ok(state.refresh_grant.clone().unwrap_or(TokenGrant {
            access_token: "refreshed-access".to_string(),
            expires_in: 3600,
            scope: None,
            refresh_token: None,
        }))
    }
}
