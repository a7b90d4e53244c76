//! Server-Sent Events (SSE) Streaming
//!
//! Streams one task's events (`working`, then `completed` or `failed`) and
//! closes after the terminal event. Delivery is best-effort: a subscriber that
//! falls behind gets a `warning` event in place of the skipped updates.

use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures_util::stream::{self, Stream};
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use super::{AgentState, ApiError};
use crate::agent::TaskEvent;

/// Type alias for boxed SSE stream
type BoxedSseStream = Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;

fn to_sse(event: &TaskEvent) -> Event {
    Event::default()
        .event(event.kind())
        .data(serde_json::to_string(event).unwrap_or_default())
}

/// GET /tasks/{id}/events
pub async fn stream_task_events(
    State(state): State<Arc<AgentState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    // Subscribe before reading the snapshot so the terminal event cannot slip between
    let events = BroadcastStream::new(state.executor.store().subscribe());
    let task = state.executor.get(&id).await?;

    let stream: BoxedSseStream = if task.is_terminal() {
        let event = to_sse(&TaskEvent::terminal(&task));
        Box::pin(stream::once(async move { Ok::<_, Infallible>(event) }))
    } else {
        let initial = to_sse(&TaskEvent::working(&task, "Subscribed"));
        let updates = stream::unfold((events, false), move |(mut events, done)| {
            let id = id.clone();
            async move {
                if done {
                    return None;
                }
                loop {
                    match events.next().await? {
                        Ok(event) if event.task_id == id => {
                            let last = event.is_final;
                            return Some((Ok::<_, Infallible>(to_sse(&event)), (events, last)));
                        }
                        Ok(_) => continue,
                        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                            let warning = Event::default().event("warning").data(format!(
                                r#"{{"message":"{} task events were skipped"}}"#,
                                skipped
                            ));
                            return Some((Ok(warning), (events, false)));
                        }
                    }
                }
            }
        });
        Box::pin(stream::once(async move { Ok::<_, Infallible>(initial) }).chain(updates))
    };

    Ok(Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("heartbeat"),
        )
        .into_response())
}
