use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Active session backend (`sqlite`, `mysql`, ...).
    pub backend: String,
}

impl HealthResponse {
    /// The session backend answered its health probe.
    pub fn ok(backend: &str) -> Self {
        Self {
            status: "ok".to_string(),
            backend: backend.to_string(),
        }
    }

    /// The session backend is unreachable or was never initialised.
    pub fn degraded(backend: &str) -> Self {
        Self {
            status: "degraded".to_string(),
            backend: backend.to_string(),
        }
    }
}
