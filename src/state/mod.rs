pub mod live;
pub mod session;
pub mod sockets;

use std::sync::Arc;

use crate::{
    dao::session_backend::SessionBackend,
    services::{
        broadcast::{BroadcastSink, Broadcaster},
        obfuscation::Obfuscator,
        session_service::SessionStore,
    },
};

pub use self::live::LiveHub;
pub use self::sockets::PlayerSockets;

pub type SharedState = Arc<AppState>;

const LIVE_HUB_CAPACITY: usize = 64;

/// Central application state: the session store and the live subscribers it notifies.
pub struct AppState {
    sessions: SessionStore,
    sockets: Arc<PlayerSockets>,
    live: Arc<LiveHub>,
}

impl AppState {
    /// Wire the session store to the player socket registry and the live hub.
    ///
    /// Spawns the broadcast dispatcher, so this must run inside a Tokio runtime.
    pub fn new(
        backend: Arc<dyn SessionBackend>,
        obfuscator: Arc<dyn Obfuscator>,
        queue_capacity: usize,
    ) -> SharedState {
        let sockets = Arc::new(PlayerSockets::new());
        let live = Arc::new(LiveHub::new(LIVE_HUB_CAPACITY));

        let sinks: Vec<Arc<dyn BroadcastSink>> = vec![sockets.clone(), live.clone()];
        let broadcaster = Broadcaster::spawn(queue_capacity, sinks);

        Arc::new(Self {
            sessions: SessionStore::new(backend, broadcaster, obfuscator),
            sockets,
            live,
        })
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Registry of active player sockets keyed by player id.
    pub fn sockets(&self) -> &PlayerSockets {
        &self.sockets
    }

    /// Broadcast hub used for the spectator SSE stream.
    pub fn live(&self) -> &LiveHub {
        &self.live
    }
}
