use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::live_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/live",
    tag = "live",
    responses((status = 200, description = "Stream of `state_update` events, one per saved session", content_type = "text/event-stream", body = String))
)]
/// Stream every committed session update to spectators.
pub async fn live_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = live_service::subscribe_live(&state);
    info!("New live SSE connection");
    live_service::to_sse_stream(receiver, live_service::handshake_event())
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/live", get(live_stream))
}
