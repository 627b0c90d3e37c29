//! Game sessions backend entrypoint wiring REST, WebSocket, SSE, and the SQL session store.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use game_sessions_back::{
    config::AppConfig,
    dao::{
        bootstrap::ensure_schema,
        connection::{Dialect, PoolSettings, open_backend},
    },
    routes,
    services::obfuscation::HmacObfuscator,
    state::{AppState, SharedState},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("loading configuration")?;
    let dialect = Dialect::from_url(&config.database_url).context("parsing DATABASE_URL")?;

    // File databases have no separate provisioning step.
    if dialect == Dialect::Sqlite {
        ensure_schema(&config.database_url)
            .await
            .context("creating the sessions table")?;
    }

    let backend = open_backend(
        &config.database_url,
        PoolSettings {
            size: config.db_pool_size,
        },
    )
    .await
    .context("opening the session backend")?;
    info!(backend = backend.name(), "session backend ready");

    let obfuscator = Arc::new(HmacObfuscator::new(config.player_id_secret.as_bytes()));
    let app_state = AppState::new(backend, obfuscator, config.broadcast_queue_capacity);

    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
