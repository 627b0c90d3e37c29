use tokio::sync::broadcast;
use tracing::warn;

use crate::{
    dto::sse::{LiveStateEvent, ServerEvent},
    services::broadcast::{BroadcastSink, StateUpdate},
};

/// SSE event name used for session changes.
pub const STATE_UPDATE_EVENT: &str = "state_update";

/// Broadcast hub feeding the spectator SSE stream.
pub struct LiveHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl LiveHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl BroadcastSink for LiveHub {
    fn deliver(&self, update: &StateUpdate) {
        if self.subscriber_count() == 0 {
            return;
        }

        let payload = LiveStateEvent {
            player_id: update.player_id.clone(),
            data: update.document.clone(),
        };
        match ServerEvent::json(Some(STATE_UPDATE_EVENT.to_string()), &payload) {
            Ok(event) => self.broadcast(event),
            Err(err) => {
                warn!(player_id = %update.player_id, error = %err, "failed to serialize live state update")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::session::SessionDocument;

    #[test]
    fn delivers_state_update_events_to_subscribers() {
        let hub = LiveHub::new(4);
        let mut rx = hub.subscribe();

        let mut document = SessionDocument::new();
        document.insert("hp", json!(2));
        hub.deliver(&StateUpdate {
            player_id: "alice".into(),
            document,
        });

        let event = rx.try_recv().unwrap();
        assert_eq!(event.event.as_deref(), Some(STATE_UPDATE_EVENT));
        let data: serde_json::Value = serde_json::from_str(&event.data).unwrap();
        assert_eq!(data, json!({"player_id": "alice", "data": {"hp": 2}}));
    }

    #[test]
    fn no_subscribers_is_fine() {
        let hub = LiveHub::new(4);
        hub.deliver(&StateUpdate {
            player_id: "alice".into(),
            document: SessionDocument::new(),
        });
        assert_eq!(hub.subscriber_count(), 0);
    }
}
