use axum::extract::ws::Message;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::ws::PlayerOutboundMessage,
    services::broadcast::{BroadcastSink, StateUpdate},
};

#[derive(Clone)]
/// Handle used to push messages to one connected player socket.
pub struct PlayerConnection {
    pub id: Uuid,
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Registry of live player WebSockets keyed by player identifier.
///
/// A player may have several sockets open (multiple tabs or devices); each receives every
/// update for that player.
#[derive(Default)]
pub struct PlayerSockets {
    connections: DashMap<String, Vec<PlayerConnection>>,
}

impl PlayerSockets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new socket for `player_id`, returning its connection id.
    pub fn register(&self, player_id: &str, tx: mpsc::UnboundedSender<Message>) -> Uuid {
        let id = Uuid::new_v4();
        self.connections
            .entry(player_id.to_owned())
            .or_default()
            .push(PlayerConnection { id, tx });
        id
    }

    /// Forget a socket. The player's entry disappears with its last socket.
    pub fn unregister(&self, player_id: &str, connection_id: Uuid) {
        if let Some(mut entry) = self.connections.get_mut(player_id) {
            entry.retain(|connection| connection.id != connection_id);
        }
        self.connections
            .remove_if(player_id, |_, connections| connections.is_empty());
    }

    /// Number of sockets currently open for `player_id`.
    pub fn connection_count(&self, player_id: &str) -> usize {
        self.connections
            .get(player_id)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    /// Serialize `message` once and push it to every socket of `player_id`.
    ///
    /// Sockets whose writer has gone away are dropped. Returns how many sockets accepted it.
    pub fn send_to_player<T>(&self, player_id: &str, message: &T) -> usize
    where
        T: Serialize + ?Sized,
    {
        let payload = match serde_json::to_string(message) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(player_id = %player_id, error = %err, "failed to serialize player message");
                return 0;
            }
        };

        let delivered = {
            let Some(mut entry) = self.connections.get_mut(player_id) else {
                return 0;
            };
            entry.retain(|connection| {
                connection
                    .tx
                    .send(Message::Text(payload.clone().into()))
                    .is_ok()
            });
            entry.len()
        };

        if delivered == 0 {
            self.connections
                .remove_if(player_id, |_, connections| connections.is_empty());
        }
        delivered
    }
}

impl BroadcastSink for PlayerSockets {
    fn deliver(&self, update: &StateUpdate) {
        self.send_to_player(
            &update.player_id,
            &PlayerOutboundMessage::FullState {
                data: update.document.clone(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::session::SessionDocument;

    fn text(message: Message) -> serde_json::Value {
        match message {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn full_state_reaches_every_socket_of_the_player_only() {
        let sockets = PlayerSockets::new();
        let (tx_a1, mut rx_a1) = mpsc::unbounded_channel();
        let (tx_a2, mut rx_a2) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        sockets.register("alice", tx_a1);
        sockets.register("alice", tx_a2);
        sockets.register("bob", tx_b);

        let mut document = SessionDocument::new();
        document.insert("hp", json!(9));
        sockets.deliver(&StateUpdate {
            player_id: "alice".into(),
            document,
        });

        let expected = json!({"type": "full_state", "data": {"hp": 9}});
        assert_eq!(text(rx_a1.try_recv().unwrap()), expected);
        assert_eq!(text(rx_a2.try_recv().unwrap()), expected);
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn closed_sockets_are_pruned() {
        let sockets = PlayerSockets::new();
        let (tx, rx) = mpsc::unbounded_channel();
        sockets.register("alice", tx);
        drop(rx);

        assert_eq!(sockets.send_to_player("alice", &json!({"x": 1})), 0);
        assert_eq!(sockets.connection_count("alice"), 0);
    }

    #[test]
    fn unregister_removes_only_that_connection() {
        let sockets = PlayerSockets::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let first = sockets.register("alice", tx1);
        sockets.register("alice", tx2);

        sockets.unregister("alice", first);
        assert_eq!(sockets.connection_count("alice"), 1);
        assert_eq!(sockets.send_to_player("nobody", &json!({})), 0);
    }
}
