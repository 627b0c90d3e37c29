use std::time::Duration;

use sqlx::{
    Connection, MySql, MySqlConnection, MySqlPool,
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    pool::PoolConnection,
};
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::{
    config::MySqlConfig,
    error::{MySqlDaoError, MySqlResult},
};
use crate::dao::connection::POOL_NAME;

/// Fixed-delay retry used while waiting for the server to accept connections.
struct RetryPolicy;

impl RetryPolicy {
    const MAX_ATTEMPTS: u32 = 10;
    const DELAY: Duration = Duration::from_secs(5);
}

/// Lends connections from the process-wide MySQL pool.
#[derive(Debug, Clone)]
pub struct MySqlProvider {
    pool: Option<MySqlPool>,
}

impl MySqlProvider {
    /// Build the pool once. A failure is logged and leaves the provider without a pool.
    pub async fn initialize(config: &MySqlConfig) -> Self {
        let result = MySqlPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.options.clone())
            .await;

        match result {
            Ok(pool) => {
                info!(
                    pool = POOL_NAME,
                    size = config.pool_size,
                    "MySQL connection pool initialized"
                );
                Self { pool: Some(pool) }
            }
            Err(err) => {
                error!(pool = POOL_NAME, error = %err, "failed to initialize MySQL connection pool");
                Self { pool: None }
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.is_some()
    }

    /// Borrow a pooled connection. Dropping it hands it back to the pool.
    pub async fn acquire(&self) -> MySqlResult<PoolConnection<MySql>> {
        let Some(pool) = &self.pool else {
            error!(pool = POOL_NAME, "MySQL pool is not initialized; cannot get connection");
            return Err(MySqlDaoError::PoolUnavailable);
        };

        pool.acquire()
            .await
            .map_err(|source| MySqlDaoError::Acquire { source })
    }
}

/// Open a standalone connection, retrying while the server is still coming up.
pub async fn establish_connection(options: &MySqlConnectOptions) -> MySqlResult<MySqlConnection> {
    let mut attempts = 0;

    loop {
        match MySqlConnection::connect_with(options).await {
            Ok(conn) => {
                info!("successfully connected to the database");
                return Ok(conn);
            }
            Err(err) => {
                attempts += 1;
                if attempts >= RetryPolicy::MAX_ATTEMPTS {
                    return Err(MySqlDaoError::Connect {
                        attempts,
                        source: err,
                    });
                }
                warn!(
                    attempt = attempts,
                    max_attempts = RetryPolicy::MAX_ATTEMPTS,
                    error = %err,
                    "database connection attempt failed; retrying in {}s",
                    RetryPolicy::DELAY.as_secs()
                );
                sleep(RetryPolicy::DELAY).await;
            }
        }
    }
}
