use axum::Router;

use crate::{
    dto::validation::validate_player_id,
    error::{AppError, ServiceError},
    state::SharedState,
};

pub mod admin;
pub mod docs;
pub mod health;
pub mod live;
pub mod sessions;
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sessions::router())
        .merge(admin::router())
        .merge(live::router())
        .merge(websocket::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

/// Reject malformed player identifiers taken from the request path.
pub(crate) fn checked_player_id(player_id: String) -> Result<String, AppError> {
    validate_player_id(&player_id).map_err(|err| {
        ServiceError::InvalidInput(
            err.message
                .map(|message| message.into_owned())
                .unwrap_or_else(|| "invalid player id".to_string()),
        )
    })?;
    Ok(player_id)
}
