use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    dto::ws::{PlayerInboundMessage, PlayerOutboundMessage},
    state::SharedState,
};

const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle the full lifecycle of one player's WebSocket connection.
///
/// The socket is registered as a broadcast target for `player_id`, receives the current session
/// (if any) right away, and then every `full_state` pushed after a save until it closes.
pub async fn handle_socket(state: SharedState, player_id: String, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let connection_id = state.sockets().register(&player_id, outbound_tx.clone());
    info!(player_id = %player_id, %connection_id, "player connected");

    push_initial_snapshot(&state, &player_id, &outbound_tx).await;

    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => match PlayerInboundMessage::from_json_str(text.as_str()) {
                Ok(PlayerInboundMessage::Ping) => {
                    send_message_to_websocket(&outbound_tx, &PlayerOutboundMessage::Pong);
                }
                Ok(PlayerInboundMessage::Unknown) => {
                    debug!(player_id = %player_id, "ignoring unknown player message");
                }
                Err(err) => {
                    warn!(player_id = %player_id, error = %err, "failed to parse player message");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(player_id = %player_id, error = %err, "websocket receive error");
                break;
            }
        }
    }

    state.sockets().unregister(&player_id, connection_id);
    info!(player_id = %player_id, %connection_id, "player disconnected");
    finalize(writer_task, outbound_tx).await;
}

async fn push_initial_snapshot(
    state: &SharedState,
    player_id: &str,
    tx: &mpsc::UnboundedSender<Message>,
) {
    let lookup = tokio::time::timeout(SNAPSHOT_TIMEOUT, state.sessions().get_session(player_id));
    match lookup.await {
        Ok(Ok(Some(data))) => {
            send_message_to_websocket(tx, &PlayerOutboundMessage::FullState { data });
        }
        Ok(Ok(None)) => debug!(player_id = %player_id, "no stored session to push on connect"),
        Ok(Err(err)) => warn!(player_id = %player_id, error = %err, "failed to load session for new socket"),
        Err(_) => warn!(player_id = %player_id, "timed out loading session for new socket"),
    }
}

/// Serialize `value` and queue it on the socket writer. Returns `false` when the writer is gone.
pub fn send_message_to_websocket<T>(tx: &mpsc::UnboundedSender<Message>, value: &T) -> bool
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{value:?}`");
            return false;
        }
    };

    tx.send(Message::Text(payload.into())).is_ok()
}

async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
