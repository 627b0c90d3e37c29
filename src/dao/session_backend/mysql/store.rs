use futures::future::BoxFuture;
use sqlx::Connection;
use tracing::{debug, info};

use super::{
    config::MySqlConfig,
    connection::{MySqlProvider, establish_connection},
    error::{MySqlDaoError, MySqlResult},
};
use crate::dao::{models::SessionRow, session_backend::SessionBackend, storage::StorageResult};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS game_sessions (
        player_id VARCHAR(255) PRIMARY KEY,
        session_data TEXT,
        last_modified TIMESTAMP(6) NOT NULL
            DEFAULT CURRENT_TIMESTAMP(6) ON UPDATE CURRENT_TIMESTAMP(6)
    )
"#;

const UPSERT_SESSION: &str = r#"
    INSERT INTO game_sessions (player_id, session_data)
    VALUES (?, ?)
    ON DUPLICATE KEY UPDATE session_data = VALUES(session_data)
"#;

const SELECT_SESSION: &str =
    "SELECT player_id, session_data FROM game_sessions WHERE player_id = ?";

const SELECT_RECENT: &str = r#"
    SELECT player_id, session_data
    FROM game_sessions
    ORDER BY last_modified DESC
    LIMIT ?
"#;

/// Session backend talking to a MySQL server through the shared pool.
#[derive(Debug, Clone)]
pub struct MySqlSessionBackend {
    provider: MySqlProvider,
}

impl MySqlSessionBackend {
    /// Create the pool and wrap it. See [`MySqlProvider::initialize`] for failure handling.
    pub async fn initialize(config: MySqlConfig) -> Self {
        Self {
            provider: MySqlProvider::initialize(&config).await,
        }
    }

    async fn upsert(&self, player_id: &str, payload: &str) -> MySqlResult<()> {
        let mut conn = self.provider.acquire().await?;
        async {
            let mut tx = conn.begin().await?;
            sqlx::query(UPSERT_SESSION)
                .bind(player_id)
                .bind(payload)
                .execute(&mut *tx)
                .await?;
            tx.commit().await
        }
        .await
        .map_err(|source| MySqlDaoError::Upsert {
            player_id: player_id.to_owned(),
            source,
        })
    }

    async fn find(&self, player_id: &str) -> MySqlResult<Option<SessionRow>> {
        let mut conn = self.provider.acquire().await?;
        sqlx::query_as::<_, SessionRow>(SELECT_SESSION)
            .bind(player_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|source| MySqlDaoError::LoadSession {
                player_id: player_id.to_owned(),
                source,
            })
    }

    async fn recent(&self, limit: u32) -> MySqlResult<Vec<SessionRow>> {
        let mut conn = self.provider.acquire().await?;
        sqlx::query_as::<_, SessionRow>(SELECT_RECENT)
            .bind(i64::from(limit))
            .fetch_all(&mut *conn)
            .await
            .map_err(|source| MySqlDaoError::ListRecent { source })
    }

    async fn ping(&self) -> MySqlResult<()> {
        let mut conn = self.provider.acquire().await?;
        conn.ping()
            .await
            .map_err(|source| MySqlDaoError::HealthPing { source })
    }
}

/// Create the sessions table, waiting for the server with bounded retries.
pub async fn ensure_schema(config: &MySqlConfig) -> MySqlResult<()> {
    let mut conn = establish_connection(&config.options).await?;

    info!("executing CREATE TABLE statement for game_sessions");
    let result = sqlx::query(CREATE_TABLE)
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(|source| MySqlDaoError::Schema { source });

    if let Err(err) = conn.close().await {
        debug!(error = %err, "failed to close MySQL bootstrap connection cleanly");
    } else {
        info!("database connection closed");
    }

    if result.is_ok() {
        info!("table 'game_sessions' created or already exists");
    }
    result
}

impl SessionBackend for MySqlSessionBackend {
    fn name(&self) -> &'static str {
        "mysql"
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
