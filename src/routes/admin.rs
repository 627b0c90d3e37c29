use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use validator::Validate;

use super::checked_player_id;
use crate::{
    dto::session::{PunishmentRequest, RecentSessionsQuery, SessionSummary},
    error::{AppError, ServiceError},
    state::SharedState,
};

/// Moderation and overview endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/admin/sessions/recent", get(recent_sessions))
        .route(
            "/admin/sessions/{player_id}/punishment",
            post(flag_for_punishment),
        )
}

#[utoipa::path(
    get,
    path = "/admin/sessions/recent",
    tag = "admin",
    params(RecentSessionsQuery),
    responses((status = 200, description = "Most recently saved sessions, newest first", body = [SessionSummary]))
)]
/// List the most recently active sessions with anonymised player identifiers.
pub async fn recent_sessions(
    State(state): State<SharedState>,
    Query(query): Query<RecentSessionsQuery>,
) -> Result<Json<Vec<SessionSummary>>, AppError> {
    query.validate()?;
    Ok(Json(state.sessions().list_recent_sessions(query.limit).await?))
}

#[utoipa::path(
    post,
    path = "/admin/sessions/{player_id}/punishment",
    tag = "admin",
    params(("player_id" = String, Path, description = "Identifier of the player to flag")),
    request_body = PunishmentRequest,
    responses(
        (status = 204, description = "Punishment recorded on the session"),
        (status = 404, description = "Player has no session")
    )
)]
/// Attach a pending punishment to the player's session.
pub async fn flag_for_punishment(
    State(state): State<SharedState>,
    Path(player_id): Path<String>,
    Json(payload): Json<PunishmentRequest>,
) -> Result<StatusCode, AppError> {
    let player_id = checked_player_id(player_id)?;
    payload.validate()?;

    let flagged = state
        .sessions()
        .flag_for_punishment(&player_id, &payload.level, &payload.reason)
        .await?;
    if flagged {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServiceError::NotFound(format!("no session for player `{player_id}`")).into())
    }
}
