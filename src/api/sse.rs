//! Server-Sent Events broadcaster
//!
//! Streams party events to connected screens. Every new connection gets a
//! full queue snapshot as its first frame, then live events as they
//! happen; a client that lags far enough to drop frames resynchronizes
//! from the snapshot on its next reconnect.

use crate::api::server::AppContext;
use crate::events::PartyEvent;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

/// GET /events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("new SSE client connected");

    // Subscribe before snapshotting so nothing falls in the gap
    let rx = ctx.events.subscribe();
    let initial = PartyEvent::QueueUpdated(ctx.party.lock().await.snapshot());

    let stream = async_stream::stream! {
        if let Some(event) = to_sse_event(&initial) {
            yield Ok(event);
        }

        let mut live = BroadcastStream::new(rx);
        while let Some(result) = live.next().await {
            match result {
                Ok(event) => {
                    if let Some(event) = to_sse_event(&event) {
                        yield Ok(event);
                    }
                }
                Err(BroadcastStreamRecvError::Lagged(missed)) => {
                    warn!(missed, "SSE client lagged, events dropped");
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Serialize a party event into an SSE frame; the serde tag doubles as
/// the `event:` name
fn to_sse_event(event: &PartyEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Event::default().event(event.event_name()).data(json)),
        Err(e) => {
            warn!(error = %e, "failed to serialize event");
            None
        }
    }
}
