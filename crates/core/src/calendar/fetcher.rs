//! Windowed, paginated read of remote events.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, Stream, TryStreamExt};
use lexsync_domain::{LexSyncError, RemoteEvent, Result, SyncWindow};
use tracing::{debug, instrument};

use super::ports::CalendarProvider;

#[derive(Default)]
struct PageCursor {
    next: Option<String>,
    seen: HashSet<String>,
    exhausted: bool,
}

/// Follows continuation tokens until the provider reports no next page.
pub struct EventFetcher {
    provider: Arc<dyn CalendarProvider>,
    page_size: u32,
}

impl EventFetcher {
    pub fn new(provider: Arc<dyn CalendarProvider>, page_size: u32) -> Self {
        Self { provider, page_size: page_size.max(1) }
    }

    /// Lazy stream of every event in the window, in provider order.
    ///
    /// The stream is not restartable: a failed page ends it with the error
    /// and a new fetch starts again from the first page.
    pub fn stream<'a>(
        &'a self,
        calendar_id: &'a str,
        access_token: &'a str,
        window: SyncWindow,
    ) -> impl Stream<Item = Result<RemoteEvent>> + Send + 'a {
        stream::try_unfold(PageCursor::default(), move |mut cursor| async move {
            if cursor.exhausted {
                return Ok::<_, LexSyncError>(None);
            }

            let page = self
                .provider
                .list_events_page(
                    access_token,
                    calendar_id,
                    &window,
                    self.page_size,
                    cursor.next.as_deref(),
                )
                .await?;

            debug!(calendar_id, events = page.events.len(), "fetched event page");

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => {
                    if !cursor.seen.insert(token.clone()) {
                        return Err(LexSyncError::RemoteApi(format!(
                            "provider repeated page token {token}"
                        )));
                    }
                    cursor.next = Some(token);
                }
                None => cursor.exhausted = true,
            }

            Ok(Some((page.events, cursor)))
        })
        .map_ok(|events| stream::iter(events.into_iter().map(Ok::<_, LexSyncError>)))
        .try_flatten()
    }

    /// Collect the whole window. Any page failure fails the fetch.
    #[instrument(skip(self, access_token))]
    pub async fn list_events(
        &self,
        calendar_id: &str,
        access_token: &str,
        window: SyncWindow,
    ) -> Result<Vec<RemoteEvent>> {
        self.stream(calendar_id, access_token, window).try_collect().await
    }
}
