use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the game sessions backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sessions::get_session,
        crate::routes::sessions::save_session,
        crate::routes::sessions::create_or_get_session,
        crate::routes::sessions::clear_session,
        crate::routes::sessions::last_inputs,
        crate::routes::admin::recent_sessions,
        crate::routes::admin::flag_for_punishment,
        crate::routes::live::live_stream,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::session::SessionSummary,
            crate::dto::session::InputsResponse,
            crate::dto::session::PunishmentRequest,
            crate::dto::sse::Handshake,
            crate::dto::sse::LiveStateEvent,
            crate::dto::ws::PlayerInboundMessage,
            crate::dto::ws::PlayerOutboundMessage,
            crate::state::session::SessionDocument,
            crate::state::session::PendingPunishment,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sessions", description = "Player session persistence"),
        (name = "admin", description = "Moderation and overview endpoints"),
        (name = "live", description = "Real-time session updates"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_session_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/sessions/{player_id}"));
        assert!(doc.paths.paths.contains_key("/admin/sessions/recent"));
    }
}
