mod config;
mod connection;
mod error;
mod store;

pub use config::MySqlConfig;
pub use connection::{MySqlProvider, establish_connection};
pub use error::MySqlDaoError;
pub use store::{MySqlSessionBackend, ensure_schema};

use crate::dao::{connection::POOL_NAME, storage::StorageError};

impl From<MySqlDaoError> for StorageError {
    fn from(err: MySqlDaoError) -> Self {
        match err {
            MySqlDaoError::InvalidUrl { .. } => StorageError::Configuration {
                message: err.to_string(),
            },
            MySqlDaoError::PoolUnavailable => StorageError::PoolUnavailable { pool: POOL_NAME },
            MySqlDaoError::Acquire { .. }
            | MySqlDaoError::Connect { .. }
            | MySqlDaoError::HealthPing { .. } => StorageError::connection(err.to_string(), err),
            _ => StorageError::query(err.to_string(), err),
        }
    }
}
