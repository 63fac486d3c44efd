use crate::state::AppState;
use axum::{
    extract::State,
    http::Uri,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use genie::LookupEvent;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    kind: Vec<String>,
    event_type: Vec<String>,
}

impl EventFilter {
    /// Parse query string with CSV support for multiple values
    /// Examples: ?kind=search,detail&type=cache_miss,storage_write_failed
    fn from_query_string(query: &str) -> Self {
        let mut kind = Vec::new();
        let mut event_type = Vec::new();

        for pair in query.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                match key {
                    "kind" => {
                        kind.extend(value.split(',').map(|s| s.trim().to_string()));
                    }
                    "type" => {
                        event_type.extend(value.split(',').map(|s| s.trim().to_string()));
                    }
                    _ => {}
                }
            }
        }

        Self { kind, event_type }
    }

    /// Empty filter lists match everything
    fn matches(&self, event: &LookupEvent) -> bool {
        if !self.kind.is_empty() && !self.kind.iter().any(|k| k == event.kind().as_str()) {
            return false;
        }
        if !self.event_type.is_empty() && !self.event_type.iter().any(|t| t == event.event_type())
        {
            return false;
        }
        true
    }
}

/// GET /events
///
/// Streams cache hits/misses, generations and failures as SSE.
pub async fn stream_events(
    State(state): State<AppState>,
    uri: Uri,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let filter = uri
        .query()
        .map(EventFilter::from_query_string)
        .unwrap_or_default();

    tracing::info!(
        "New SSE client connected. Filters: kind={:?}, type={:?}",
        filter.kind,
        filter.event_type
    );

    let rx = state.event_channel.subscribe();
    let stream = BroadcastStream::new(rx);

    let filtered_stream = stream.filter_map(move |result| {
        let filter = filter.clone();
        async move {
            match result {
                Ok(event) if filter.matches(&event) => to_sse_event(&event).map(Ok),
                Ok(_) => None,
                Err(BroadcastStreamRecvError::Lagged(n)) => Some(Ok(Event::default()
                    .event("error")
                    .data(format!("Lagged by {} events", n)))),
            }
        }
    });

    Sse::new(filtered_stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_sse_event(event: &LookupEvent) -> Option<Event> {
    match Event::default().event(event.event_type()).json_data(event) {
        Ok(sse_event) => Some(sse_event),
        Err(e) => {
            tracing::warn!("Failed to encode {} event: {}", event.event_type(), e);
            None
        }
    }
}
