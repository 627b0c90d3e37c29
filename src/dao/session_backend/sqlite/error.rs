//! Error types shared by the SQLite storage implementation.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias returning [`SqliteDaoError`] failures.
pub type SqliteResult<T> = Result<T, SqliteDaoError>;

/// Failures that can occur while interacting with the SQLite database file.
#[derive(Debug, Error)]
pub enum SqliteDaoError {
    /// The URL does not follow the `sqlite:///<path>` form.
    #[error("invalid SQLite database url `{url}`: expected `sqlite:///<path>`")]
    InvalidUrl { url: String },
    /// Opening the database file failed.
    #[error("failed to open SQLite database `{}`", path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },
    /// Creating the sessions table failed.
    #[error("failed to ensure the SQLite session schema")]
    Schema {
        #[source]
        source: sqlx::Error,
    },
    /// Writing a session row failed.
    #[error("failed to save session for player `{player_id}`")]
    Upsert {
        player_id: String,
        #[source]
        source: sqlx::Error,
    },
    /// Reading a session row failed.
    #[error("failed to load session for player `{player_id}`")]
    LoadSession {
        player_id: String,
        #[source]
        source: sqlx::Error,
    },
    /// Listing recent sessions failed.
    #[error("failed to list recent sessions")]
    ListRecent {
        #[source]
        source: sqlx::Error,
    },
    /// Health probe failed.
    #[error("SQLite health check failed")]
    HealthPing {
        #[source]
        source: sqlx::Error,
    },
}
