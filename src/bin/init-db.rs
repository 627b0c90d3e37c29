//! Create the `game_sessions` table for the backend named by `DATABASE_URL`.
//!
//! Run once before starting the server against a MySQL database. Safe to run again.

use std::env;

use anyhow::Context;
use game_sessions_back::dao::bootstrap::ensure_schema;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    ensure_schema(&url)
        .await
        .context("failed to initialize the database")?;
    info!("database initialized successfully");
    Ok(())
}
