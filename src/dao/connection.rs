//! Connection provider: turns a `DATABASE_URL` into the one session backend the process uses.
//!
//! The dialect is decided here, once, from the URL scheme. Everything above this module talks to
//! [`SessionBackend`] and never inspects which engine sits underneath.

use std::{fmt, sync::Arc};

use url::Url;

use crate::dao::{
    session_backend::SessionBackend,
    storage::{StorageError, StorageResult},
};

/// Name reported for the networked backend's connection pool.
pub const POOL_NAME: &str = "game_pool";
/// Number of pooled connections used when nothing else is configured.
pub const DEFAULT_POOL_SIZE: u32 = 5;

/// SQL dialect selected from the connection string scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Embedded file-based engine, one lightweight connection per operation.
    Sqlite,
    /// Networked server engine, connections lent from a fixed-size pool.
    MySql,
}

impl Dialect {
    /// Resolve the dialect from a database URL.
    pub fn from_url(url: &str) -> StorageResult<Self> {
        let parsed = Url::parse(url).map_err(|err| StorageError::Configuration {
            message: format!("malformed database url: {err}"),
        })?;

        match parsed.scheme() {
            "sqlite" => Ok(Self::Sqlite),
            "mysql" => Ok(Self::MySql),
            other => Err(StorageError::UnsupportedBackend {
                scheme: other.to_owned(),
            }),
        }
    }

    /// URL scheme of the dialect.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::MySql => "mysql",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sizing for the pooled backend. Ignored by the embedded backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub size: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            size: DEFAULT_POOL_SIZE,
        }
    }
}

/// Build the session backend matching `url`.
///
/// For MySQL this creates the process-wide pool. A pool that fails to come up is logged and the
/// backend is still returned: every later operation on it fails with
/// [`StorageError::PoolUnavailable`] until the process restarts.
#[cfg_attr(not(feature = "mysql-store"), allow(unused_variables))]
pub async fn open_backend(
    url: &str,
    settings: PoolSettings,
) -> StorageResult<Arc<dyn SessionBackend>> {
    match Dialect::from_url(url)? {
        #[cfg(feature = "sqlite-store")]
        Dialect::Sqlite => {
            use crate::dao::session_backend::sqlite::{SqliteConfig, SqliteSessionBackend};

            let config = SqliteConfig::from_url(url)?;
            Ok(Arc::new(SqliteSessionBackend::new(config)))
        }
        #[cfg(feature = "mysql-store")]
        Dialect::MySql => {
            use crate::dao::session_backend::mysql::{MySqlConfig, MySqlSessionBackend};

            let config = MySqlConfig::from_url(url, settings)?;
            Ok(Arc::new(MySqlSessionBackend::initialize(config).await))
        }
        #[allow(unreachable_patterns)]
        dialect => Err(StorageError::UnsupportedBackend {
            scheme: dialect.as_str().to_owned(),
        }),
    }
}
