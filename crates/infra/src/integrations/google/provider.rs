//! Google Calendar provider implementation

use std::time::Duration;

use async_trait::async_trait;
use lexsync_core::CalendarProvider;
use lexsync_domain::{
    EventDraft, EventPage, GoogleConfig, LexSyncError, ProviderKind, RemoteEvent, Result,
    SyncWindow, TokenGrant,
};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::types::{GoogleEvent, GoogleEventBody, GoogleEventsResponse, GoogleTokenResponse};
use crate::errors::InfraError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoints and OAuth client credentials.
#[derive(Debug, Clone)]
pub struct GoogleCalendarSettings {
    pub api_base: String,
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
}

impl From<&GoogleConfig> for GoogleCalendarSettings {
    fn from(config: &GoogleConfig) -> Self {
        Self {
            api_base: config.api_base.clone(),
            token_endpoint: config.token_endpoint.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }
}

/// Google Calendar provider
pub struct GoogleCalendarProvider {
    client: Client,
    settings: GoogleCalendarSettings,
}

impl GoogleCalendarProvider {
    pub fn new(settings: GoogleCalendarSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LexSyncError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, settings })
    }

    /// `{api_base}/calendars/{calendar_id}/events[/{event_id}]` with each
    /// segment percent-encoded.
    fn events_url(&self, calendar_id: &str, event_id: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.settings.api_base).map_err(|e| {
            LexSyncError::Config(format!("invalid Google API base {}: {e}", self.settings.api_base))
        })?;
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                LexSyncError::Config(format!(
                    "Google API base cannot be a base URL: {}",
                    self.settings.api_base
                ))
            })?;
            segments.pop_if_empty().extend(["calendars", calendar_id, "events"]);
            if let Some(event_id) = event_id {
                segments.push(event_id);
            }
        }
        Ok(url)
    }

    async fn send_event_write(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<RemoteEvent> {
        let response = request.send().await.map_err(InfraError::from)?;
        let event: GoogleEvent = read_json(check_status(response, context).await?, context).await?;
        let id = event.id.clone();
        event.into_remote_event().ok_or_else(|| {
            LexSyncError::RemoteApi(format!("{context}: response for event {id} has no start time"))
        })
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    #[instrument(skip(self, access_token, window))]
    async fn list_events_page(
        &self,
        access_token: &str,
        calendar_id: &str,
        window: &SyncWindow,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<EventPage> {
        let mut query: Vec<(&str, String)> = vec![
            ("timeMin", window.time_min.to_rfc3339()),
            ("timeMax", window.time_max.to_rfc3339()),
            ("singleEvents", "true".to_string()),
            ("showDeleted", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", page_size.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let response = self
            .client
            .get(self.events_url(calendar_id, None)?)
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await
            .map_err(InfraError::from)?;

        let page: GoogleEventsResponse =
            read_json(check_status(response, "list events").await?, "list events").await?;

        let received = page.items.len();
        let events: Vec<RemoteEvent> =
            page.items.into_iter().filter_map(GoogleEvent::into_remote_event).collect();
        debug!(
            received,
            kept = events.len(),
            has_next = page.next_page_token.is_some(),
            "event page fetched"
        );

        Ok(EventPage { events, next_page_token: page.next_page_token })
    }

    #[instrument(
        skip(self, access_token, draft),
        fields(appointment_id = %draft.origin_appointment_id)
    )]
    async fn create_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        draft: &EventDraft,
    ) -> Result<RemoteEvent> {
        let request = self
            .client
            .post(self.events_url(calendar_id, None)?)
            .bearer_auth(access_token)
            .json(&GoogleEventBody::from(draft));
        self.send_event_write(request, "create event").await
    }

    #[instrument(skip(self, access_token, draft))]
    async fn update_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
        draft: &EventDraft,
    ) -> Result<RemoteEvent> {
        let request = self
            .client
            .patch(self.events_url(calendar_id, Some(event_id))?)
            .bearer_auth(access_token)
            .json(&GoogleEventBody::from(draft));
        self.send_event_write(request, "update event").await
    }

    #[instrument(skip(self, access_token))]
    async fn delete_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<()> {
        let response = self
            .client
            .delete(self.events_url(calendar_id, Some(event_id))?)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(InfraError::from)?;

        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::GONE) {
            debug!(event_id, status = response.status().as_u16(), "event already gone");
            return Ok(());
        }

        check_status(response, "delete event").await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant> {
        let response = self
            .client
            .post(&self.settings.token_endpoint)
            .form(&[
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = status.as_u16(), "token refresh rejected");
            return Err(LexSyncError::Auth(format!("token refresh failed ({status}): {body}")));
        }

        let grant: GoogleTokenResponse = read_json(response, "token refresh").await?;
        Ok(grant.into())
    }
}

/// Map a non-success status to a domain error, keeping the response body.
async fn check_status(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
    let message = format!("{context} failed ({status}): {body}");
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LexSyncError::Auth(message),
        StatusCode::NOT_FOUND => LexSyncError::NotFound(message),
        _ => LexSyncError::RemoteApi(message),
    })
}

async fn read_json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| LexSyncError::RemoteApi(format!("{context}: malformed response: {e}")))
}
