use thiserror::Error;

pub type MySqlResult<T> = Result<T, MySqlDaoError>;

#[derive(Debug, Error)]
pub enum MySqlDaoError {
    #[error("failed to parse MySQL connection url")]
    InvalidUrl {
        #[source]
        source: sqlx::Error,
    },
    #[error("MySQL connection pool is not initialized")]
    PoolUnavailable,
    #[error("failed to borrow a connection from the MySQL pool")]
    Acquire {
        #[source]
        source: sqlx::Error,
    },
    #[error("MySQL connection failed after {attempts} attempt(s)")]
    Connect {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to ensure the MySQL session schema")]
    Schema {
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to save session for player `{player_id}`")]
    Upsert {
        player_id: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to load session for player `{player_id}`")]
    LoadSession {
        player_id: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to list recent sessions")]
    ListRecent {
        #[source]
        source: sqlx::Error,
    },
    #[error("MySQL health check failed")]
    HealthPing {
        #[source]
        source: sqlx::Error,
    },
}
