use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the session backend and report whether it answered.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let backend = state.sessions().backend();
    match backend.health_check().await {
        Ok(()) => HealthResponse::ok(backend.name()),
        Err(err) => {
            warn!(backend = backend.name(), error = %err, "storage health check failed");
            HealthResponse::degraded(backend.name())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::session_backend::memory::MemoryBackend, services::obfuscation::HmacObfuscator,
        state::AppState,
    };

    #[tokio::test]
    async fn reports_backend_status() {
        let backend = MemoryBackend::new();
        let state = AppState::new(
            Arc::new(backend.clone()),
            Arc::new(HmacObfuscator::new(b"k")),
            8,
        );

        let healthy = health_status(&state).await;
        assert_eq!(healthy.status, "ok");
        assert_eq!(healthy.backend, "memory");

        backend.set_offline(true);
        assert_eq!(health_status(&state).await.status, "degraded");
    }
}
