use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::session::SessionDocument;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
/// Messages accepted from player WebSocket clients.
#[serde(tag = "type")]
pub enum PlayerInboundMessage {
    #[serde(rename = "ping")]
    Ping,
    #[serde(other)]
    Unknown,
}

impl PlayerInboundMessage {
    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Messages pushed to a player's WebSocket.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerOutboundMessage {
    /// Complete session snapshot, sent on connect and after every save.
    FullState { data: SessionDocument },
    Pong,
}
