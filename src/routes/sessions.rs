use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use validator::Validate;

use super::checked_player_id;
use crate::{
    dto::session::{InputsQuery, InputsResponse},
    error::{AppError, ServiceError},
    state::{SharedState, session::SessionDocument},
};

/// Player-facing session persistence endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/sessions/{player_id}",
            get(get_session)
                .put(save_session)
                .post(create_or_get_session)
                .delete(clear_session),
        )
        .route("/sessions/{player_id}/inputs", get(last_inputs))
}

#[utoipa::path(
    get,
    path = "/sessions/{player_id}",
    tag = "sessions",
    params(("player_id" = String, Path, description = "Identifier of the player")),
    responses(
        (status = 200, description = "Stored session", body = SessionDocument),
        (status = 404, description = "No session stored for this player"),
        (status = 503, description = "Session store unavailable")
    )
)]
/// Load the stored session of a player.
pub async fn get_session(
    State(state): State<SharedState>,
    Path(player_id): Path<String>,
) -> Result<Json<SessionDocument>, AppError> {
    let player_id = checked_player_id(player_id)?;
    state
        .sessions()
        .get_session(&player_id)
        .await?
        .map(Json)
        .ok_or_else(|| ServiceError::NotFound(format!("no session for player `{player_id}`")).into())
}

#[utoipa::path(
    put,
    path = "/sessions/{player_id}",
    tag = "sessions",
    params(("player_id" = String, Path, description = "Identifier of the player")),
    request_body = SessionDocument,
    responses(
        (status = 200, description = "Session saved; `last_modified` holds the save time", body = SessionDocument),
        (status = 503, description = "Session store unavailable")
    )
)]
/// Replace the whole session of a player and push it to live subscribers.
pub async fn save_session(
    State(state): State<SharedState>,
    Path(player_id): Path<String>,
    Json(document): Json<SessionDocument>,
) -> Result<Json<SessionDocument>, AppError> {
    let player_id = checked_player_id(player_id)?;
    let saved = state.sessions().save_session(&player_id, document).await?;
    Ok(Json(saved))
}

#[utoipa::path(
    post,
    path = "/sessions/{player_id}",
    tag = "sessions",
    params(("player_id" = String, Path, description = "Identifier of the player")),
    responses((status = 200, description = "Existing session, or a freshly created empty one", body = SessionDocument))
)]
/// Return the session of a player, creating an empty one when missing.
pub async fn create_or_get_session(
    State(state): State<SharedState>,
    Path(player_id): Path<String>,
) -> Result<Json<SessionDocument>, AppError> {
    let player_id = checked_player_id(player_id)?;
    let document = state.sessions().create_or_get_session(&player_id).await?;
    Ok(Json(document))
}

#[utoipa::path(
    delete,
    path = "/sessions/{player_id}",
    tag = "sessions",
    params(("player_id" = String, Path, description = "Identifier of the player")),
    responses((status = 200, description = "Session reset to an empty document", body = SessionDocument))
)]
/// Reset the session of a player to an empty document.
pub async fn clear_session(
    State(state): State<SharedState>,
    Path(player_id): Path<String>,
) -> Result<Json<SessionDocument>, AppError> {
    let player_id = checked_player_id(player_id)?;
    let document = state.sessions().clear_session(&player_id).await?;
    Ok(Json(document))
}

#[utoipa::path(
    get,
    path = "/sessions/{player_id}/inputs",
    tag = "sessions",
    params(("player_id" = String, Path, description = "Identifier of the player"), InputsQuery),
    responses((status = 200, description = "Most recent player inputs, oldest first", body = InputsResponse))
)]
/// Return the last `n` messages the player typed.
pub async fn last_inputs(
    State(state): State<SharedState>,
    Path(player_id): Path<String>,
    Query(query): Query<InputsQuery>,
) -> Result<Json<InputsResponse>, AppError> {
    let player_id = checked_player_id(player_id)?;
    query.validate()?;
    let inputs = state.sessions().last_n_inputs(&player_id, query.n).await?;
    Ok(Json(InputsResponse { inputs }))
}
