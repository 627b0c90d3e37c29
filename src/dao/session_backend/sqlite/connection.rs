use sqlx::{Connection, SqliteConnection, sqlite::SqliteConnectOptions};
use tracing::debug;

use super::{
    config::SqliteConfig,
    error::{SqliteDaoError, SqliteResult},
};

/// Hands out direct SQLite connections.
///
/// Opening a file-backed connection is cheap, so every operation gets its own handle instead of
/// borrowing from a pool.
#[derive(Debug, Clone)]
pub struct SqliteProvider {
    config: SqliteConfig,
    options: SqliteConnectOptions,
}

impl SqliteProvider {
    pub fn new(config: SqliteConfig) -> Self {
        let options = config.connect_options();
        Self { config, options }
    }

    /// Open a fresh connection to the database file.
    pub async fn acquire(&self) -> SqliteResult<SqliteConnection> {
        SqliteConnection::connect_with(&self.options)
            .await
            .map_err(|source| SqliteDaoError::Connect {
                path: self.config.path.clone(),
                source,
            })
    }

    /// Close a handle obtained from [`Self::acquire`].
    pub async fn release(&self, conn: SqliteConnection) {
        if let Err(err) = conn.close().await {
            debug!(error = %err, path = %self.config.path.display(), "failed to close SQLite connection cleanly");
        }
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }
}
