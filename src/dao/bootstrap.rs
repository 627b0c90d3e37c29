//! One-shot schema bootstrap for the `game_sessions` table.
//!
//! Safe to run repeatedly: the table is only created when missing. Runtime operations never
//! retry, only this step waits for a networked server to come up.

use tracing::info;

use crate::dao::{
    connection::Dialect,
    storage::{StorageError, StorageResult},
};

/// Ensure the sessions table exists for the backend `url` points at.
pub async fn ensure_schema(url: &str) -> StorageResult<()> {
    let dialect = Dialect::from_url(url)?;
    info!(%dialect, "attempting to initialize the database");

    match dialect {
        #[cfg(feature = "sqlite-store")]
        Dialect::Sqlite => {
            use crate::dao::session_backend::sqlite::{SqliteConfig, SqliteSessionBackend};

            let backend = SqliteSessionBackend::new(SqliteConfig::from_url(url)?);
            backend.ensure_schema().await.map_err(Into::into)
        }
        #[cfg(feature = "mysql-store")]
        Dialect::MySql => {
            use crate::dao::{
                connection::PoolSettings,
                session_backend::mysql::{self, MySqlConfig},
            };

            let config = MySqlConfig::from_url(url, PoolSettings::default())?;
            mysql::ensure_schema(&config).await.map_err(Into::into)
        }
        #[allow(unreachable_patterns)]
        other => Err(StorageError::UnsupportedBackend {
            scheme: other.as_str().to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "sqlite-store")]
    #[tokio::test]
    async fn creates_sqlite_table_twice_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:///{}", dir.path().join("boot.db").display());
        ensure_schema(&url).await.unwrap();
        ensure_schema(&url).await.unwrap();
    }

    #[tokio::test]
    async fn unsupported_scheme_is_rejected_before_connecting() {
        let err = ensure_schema("postgres://localhost/game").await.unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedBackend { .. }));
    }
}
