use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use tokio::sync::broadcast::error::RecvError;

use crate::AppState;
use crate::extract::AuthUser;

/// The caller's realtime feed. Other users' events are filtered out.
pub async fn sse_events(
    State(state): State<Arc<AppState>>,
    AuthUser(profile): AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.event_tx.subscribe();
    let user_id = profile.id;
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) if event.user_id() == user_id => {
                    match Event::default().event(event.name()).json_data(&event) {
                        Ok(sse) => yield Ok(sse),
                        Err(e) => tracing::warn!(error = %e, "failed to encode realtime event"),
                    }
                },
                Ok(_) => {},
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(%user_id, skipped = n, "SSE client lagged");
                },
                Err(RecvError::Closed) => break,
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}
