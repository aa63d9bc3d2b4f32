//! Server-Sent Events stream of list changes.

use std::{convert::Infallible, time::Duration};

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{Stream, stream};
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tracing::{debug, warn};

use super::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    parse_list_id,
    require_access,
    state::AppState,
};
use crate::{
    access::ListCapabilities,
    relay::{ListEvent, channel_name},
};

const KEEP_ALIVE: Duration = Duration::from_secs(15);

fn to_sse(event: &ListEvent) -> Event {
    Event::default()
        .event(event.name())
        .data(event.payload().to_string())
}

/// Turn the relay subscription of `subscriber` into an SSE stream.
///
/// Lagged receivers skip the missed events and continue. The stream ends once
/// the channel closes, or right after delivering an event that removes the
/// subscriber's access (list deletion or their own revocation).
pub fn event_stream(
    rx: Receiver<ListEvent>,
    subscriber: i32,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(Some(rx), move |state| async move {
        let mut rx = state?;
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let sse = to_sse(&event);
                    if event.closes_stream_for(subscriber) {
                        debug!(user_id = subscriber, event = event.name(), "closing event stream");
                        return Some((Ok(sse), None));
                    }
                    return Some((Ok(sse), Some(rx)));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

/// `GET /api/lists/{id}/events`
///
/// # Errors
/// Returns `404` when the caller cannot view the list and `503` when no relay
/// is running.
pub async fn subscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(raw_id): Path<String>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let list_id = parse_list_id(&raw_id)?;
    {
        let mut conn = state.conn().await?;
        require_access(&mut conn, list_id, auth.user.id, ListCapabilities::VIEW).await?;
    }
    let channel = channel_name(list_id);
    let rx = state
        .relay
        .subscribe(&channel)
        .await
        .map_err(|_| ApiError::Unavailable("Real-time updates are unavailable"))?;
    debug!(channel, user_id = auth.user.id, "opened event stream");
    Ok(Sse::new(event_stream(rx, auth.user.id)).keep_alive(KeepAlive::new().interval(KEEP_ALIVE)))
}
