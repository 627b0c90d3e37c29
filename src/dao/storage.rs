use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database URL or backend settings could not be understood.
    #[error("invalid database configuration: {message}")]
    Configuration { message: String },
    /// The URL names a backend this build cannot talk to.
    #[error("unsupported database backend `{scheme}`")]
    UnsupportedBackend { scheme: String },
    /// The pooled backend was never initialised successfully.
    #[error("connection pool `{pool}` is not initialized")]
    PoolUnavailable { pool: &'static str },
    /// The backend could not be reached or refused a connection.
    #[error("database connection failed: {message}")]
    Connection {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A statement was rejected by the backend.
    #[error("database query failed: {message}")]
    Query {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct a connection error from any backend failure.
    pub fn connection(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Connection {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a query error from any backend failure.
    pub fn query(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Query {
            message,
            source: Box::new(source),
        }
    }

    /// Whether the failure is about reaching the backend rather than a bad request or setup.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StorageError::PoolUnavailable { .. } | StorageError::Connection { .. }
        )
    }
}
