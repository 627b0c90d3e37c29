mod config;
mod connection;
mod error;
mod store;

pub use config::SqliteConfig;
pub use connection::SqliteProvider;
pub use error::SqliteDaoError;
pub use store::SqliteSessionBackend;

use crate::dao::storage::StorageError;

impl From<SqliteDaoError> for StorageError {
    fn from(err: SqliteDaoError) -> Self {
        match err {
            SqliteDaoError::InvalidUrl { .. } => StorageError::Configuration {
                message: err.to_string(),
            },
            SqliteDaoError::Connect { .. } | SqliteDaoError::HealthPing { .. } => {
                StorageError::connection(err.to_string(), err)
            }
            _ => StorageError::query(err.to_string(), err),
        }
    }
}
