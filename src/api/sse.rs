//! Server-Sent Events support

use crate::conversation::StoreEvent;
use crate::state_machine::ConversationState;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Stream the session: an `init` snapshot, then every store mutation
pub fn sse_stream(
    session_id: String,
    snapshot: ConversationState,
    broadcast_rx: broadcast::Receiver<StoreEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move {
        Ok(to_axum(
            "init",
            json!({
                "type": "init",
                "session_id": session_id,
                "state": snapshot,
            }),
        ))
    });

    let updates = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => {
            let (event_type, data) = store_event_json(event);
            Some(Ok(to_axum(event_type, data)))
        }
        Err(e) => {
            // Lagged; the client can refetch the snapshot
            tracing::warn!(error = %e, "SSE subscriber fell behind");
            None
        }
    });

    Sse::new(init.chain(updates)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn store_event_json(event: StoreEvent) -> (&'static str, Value) {
    match event {
        StoreEvent::Message { message } => (
            "message",
            json!({
                "type": "message",
                "message": message,
            }),
        ),
        StoreEvent::StageChanged { stage } => (
            "stage_change",
            json!({
                "type": "stage_change",
                "stage": stage,
            }),
        ),
        StoreEvent::Typing { is_typing } => (
            "typing",
            json!({
                "type": "typing",
                "is_typing": is_typing,
            }),
        ),
        StoreEvent::TrendSelected { id, message } => (
            "selection",
            json!({
                "type": "selection",
                "kind": "trend",
                "id": id,
                "message": message,
            }),
        ),
        StoreEvent::IdeaSelected { id, message } => (
            "selection",
            json!({
                "type": "selection",
                "kind": "idea",
                "id": id,
                "message": message,
            }),
        ),
        StoreEvent::Reset => ("reset", json!({ "type": "reset" })),
        StoreEvent::Error { message } => (
            "error",
            json!({
                "type": "error",
                "message": message,
            }),
        ),
    }
}

fn to_axum(event_type: &str, data: Value) -> Event {
    Event::default().event(event_type).data(data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{ConversationStore, MessageRole};
    use crate::state_machine::Stage;

    #[test]
    fn test_selection_carries_id_and_message() {
        let store = ConversationStore::new();
        let mut rx = store.subscribe();
        store.select_idea(2);

        let (event_type, data) = store_event_json(rx.try_recv().unwrap());
        assert_eq!(event_type, "selection");
        assert_eq!(data["kind"], "idea");
        assert_eq!(data["id"], 2);
        assert_eq!(data["message"]["role"], "user");
        assert_eq!(data["message"]["content"], "I want to build this idea");
    }

    #[test]
    fn test_event_names() {
        let store = ConversationStore::new();
        let mut rx = store.subscribe();
        store.append_message(MessageRole::System, "hi", None);
        store.set_stage(Stage::Trends);
        store.set_typing(true);
        store.reset();
        store.report_error("down");

        let names: Vec<&str> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| store_event_json(e).0)
            .collect();
        assert_eq!(names, vec!["message", "stage_change", "typing", "reset", "error"]);
    }
}
