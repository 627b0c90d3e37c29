use axum::{
    Router,
    extract::{Path, State, WebSocketUpgrade},
    response::{IntoResponse, Response},
    routing::get,
};

use super::checked_player_id;
use crate::{error::AppError, services::websocket_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/ws/{player_id}",
    tag = "live",
    params(("player_id" = String, Path, description = "Identifier of the player")),
    responses((status = 101, description = "Switching protocols to WebSocket"))
)]
/// Upgrade the HTTP connection into a player WebSocket receiving `full_state` pushes.
pub async fn ws_handler(
    State(state): State<SharedState>,
    Path(player_id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let player_id = checked_player_id(player_id)?;
    Ok(ws
        .on_upgrade(move |socket| websocket_service::handle_socket(state, player_id, socket))
        .into_response())
}

/// Configure the WebSocket endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/ws/{player_id}", get(ws_handler))
}
