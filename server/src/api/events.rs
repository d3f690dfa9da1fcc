//! Live order event stream (SSE)

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::state::AppState;

/// GET /api/restaurants/{id}/events
///
/// Pushes order creation and status changes for one restaurant. Lagged
/// receivers skip dropped events and keep going; the dashboard re-reads
/// full state on each event anyway.
pub async fn order_events(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events.subscribe();
    let stream = futures::stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) if event.restaurant_id == restaurant_id => {
                    let sse = Event::default()
                        .event("order")
                        .json_data(&event)
                        .unwrap_or_default();
                    return Some((Ok(sse), rx));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "SSE subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
