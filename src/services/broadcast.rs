//! Post-commit fan-out of session changes to live subscribers.
//!
//! Saves hand a [`StateUpdate`] to the [`Broadcaster`] after the write is committed. The queue
//! is bounded and drained by a single dispatcher task, so a slow or broken subscriber can neither
//! delay nor undo a save.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::state::session::SessionDocument;

/// Queue capacity used when nothing else is configured.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Snapshot of a player's session right after a successful save.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StateUpdate {
    pub player_id: String,
    pub document: SessionDocument,
}

/// A real-time delivery channel notified after each successful save.
///
/// `deliver` runs on the dispatcher task and must not block.
pub trait BroadcastSink: Send + Sync {
    fn deliver(&self, update: &StateUpdate);
}

/// Producer side of the broadcast queue. Cheap to clone.
#[derive(Clone)]
pub struct Broadcaster {
    sender: mpsc::Sender<StateUpdate>,
}

/// Consumer side of the broadcast queue, forwarding every update to the registered sinks.
pub struct BroadcastQueue {
    receiver: mpsc::Receiver<StateUpdate>,
}

impl Broadcaster {
    /// Create the queue without starting a dispatcher.
    pub fn channel(capacity: usize) -> (Self, BroadcastQueue) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, BroadcastQueue { receiver })
    }

    /// Create the queue and spawn its dispatcher on the current Tokio runtime.
    pub fn spawn(capacity: usize, sinks: Vec<Arc<dyn BroadcastSink>>) -> Self {
        let (broadcaster, queue) = Self::channel(capacity);
        tokio::spawn(queue.run(sinks));
        broadcaster
    }

    /// Queue an update without waiting. Returns `false` when the update had to be dropped.
    pub fn enqueue(&self, update: StateUpdate) -> bool {
        match self.sender.try_send(update) {
            Ok(()) => true,
            Err(TrySendError::Full(update)) => {
                warn!(player_id = %update.player_id, "broadcast queue full; dropping state update");
                false
            }
            Err(TrySendError::Closed(update)) => {
                warn!(player_id = %update.player_id, "broadcast dispatcher stopped; dropping state update");
                false
            }
        }
    }
}

impl BroadcastQueue {
    /// Deliver queued updates until every [`Broadcaster`] handle is dropped.
    pub async fn run(mut self, sinks: Vec<Arc<dyn BroadcastSink>>) {
        while let Some(update) = self.receiver.recv().await {
            for sink in &sinks {
                sink.deliver(&update);
            }
        }
        debug!("broadcast dispatcher stopped");
    }
}
