use futures::future::BoxFuture;
use sqlx::Connection;
use tracing::info;

use super::{
    config::SqliteConfig,
    connection::SqliteProvider,
    error::{SqliteDaoError, SqliteResult},
};
use crate::dao::{models::SessionRow, session_backend::SessionBackend, storage::StorageResult};

// SQLite has no `ON UPDATE` column clause, so every write stamps `last_modified` itself.
// Millisecond text timestamps keep recency ordering stable for quick successive saves.
const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS game_sessions (
        player_id TEXT PRIMARY KEY,
        session_data TEXT,
        last_modified TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
    )
"#;

const UPSERT_SESSION: &str = r#"
    INSERT INTO game_sessions (player_id, session_data, last_modified)
    VALUES (?, ?, strftime('%Y-%m-%d %H:%M:%f', 'now'))
    ON CONFLICT(player_id) DO UPDATE SET
        session_data = excluded.session_data,
        last_modified = excluded.last_modified
"#;

const SELECT_SESSION: &str =
    "SELECT player_id, session_data FROM game_sessions WHERE player_id = ?";

const SELECT_RECENT: &str = r#"
    SELECT player_id, session_data
    FROM game_sessions
    ORDER BY last_modified DESC
    LIMIT ?
"#;

/// Session backend writing to an embedded SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteSessionBackend {
    provider: SqliteProvider,
}

impl SqliteSessionBackend {
    pub fn new(config: SqliteConfig) -> Self {
        Self {
            provider: SqliteProvider::new(config),
        }
    }

    /// Create the sessions table when it does not exist yet.
    pub async fn ensure_schema(&self) -> SqliteResult<()> {
        let mut conn = self.provider.acquire().await?;
        let result = sqlx::query(CREATE_TABLE)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|source| SqliteDaoError::Schema { source });
        self.provider.release(conn).await;

        if result.is_ok() {
            info!(path = %self.provider.config().path.display(), "table 'game_sessions' created or already exists");
        }
        result
    }

    async fn upsert(&self, player_id: &str, payload: &str) -> SqliteResult<()> {
        let mut conn = self.provider.acquire().await?;
        let result = async {
            let mut tx = conn.begin().await?;
            sqlx::query(UPSERT_SESSION)
                .bind(player_id)
                .bind(payload)
                .execute(&mut *tx)
                .await?;
            tx.commit().await
        }
        .await
        .map_err(|source| SqliteDaoError::Upsert {
            player_id: player_id.to_owned(),
            source,
        });
        self.provider.release(conn).await;
        result
    }

    async fn find(&self, player_id: &str) -> SqliteResult<Option<SessionRow>> {
        let mut conn = self.provider.acquire().await?;
        let result = sqlx::query_as::<_, SessionRow>(SELECT_SESSION)
            .bind(player_id)
            .fetch_optional(&mut conn)
            .await
            .map_err(|source| SqliteDaoError::LoadSession {
                player_id: player_id.to_owned(),
                source,
            });
        self.provider.release(conn).await;
        result
    }

    async fn recent(&self, limit: u32) -> SqliteResult<Vec<SessionRow>> {
        let mut conn = self.provider.acquire().await?;
        let result = sqlx::query_as::<_, SessionRow>(SELECT_RECENT)
            .bind(i64::from(limit))
            .fetch_all(&mut conn)
            .await
            .map_err(|source| SqliteDaoError::ListRecent { source });
        self.provider.release(conn).await;
        result
    }

    async fn ping(&self) -> SqliteResult<()> {
        let mut conn = self.provider.acquire().await?;
        let result = conn
            .ping()
            .await
            .map_err(|source| SqliteDaoError::HealthPing { source });
        self.provider.release(conn).await;
        result
    }
}

impl SessionBackend for SqliteSessionBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn upsert(&self, player_id: String, payload: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert(&player_id, &payload)
                .await
                .map_err(Into::into)
        })
    }

    fn query_by_key(
        &self,
        player_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<SessionRow>>> {
        let store = self.clone();
        Box::pin(async move { store.find(&player_id).await.map_err(Into::into) })
    }

    fn query_recent(&self, limit: u32) -> BoxFuture<'static, StorageResult<Vec<SessionRow>>> {
        let store = self.clone();
        Box::pin(async move { store.recent(limit).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
