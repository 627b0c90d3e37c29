use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};

use super::error::{SqliteDaoError, SqliteResult};

const URL_PREFIX: &str = "sqlite:///";

/// Runtime configuration describing where the SQLite database lives.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    pub path: PathBuf,
}

impl SqliteConfig {
    /// Construct a configuration for an explicit database file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse `sqlite:///<path>`. Everything after the third slash is the file path, so
    /// `sqlite:///game.db` is relative and `sqlite:////var/lib/game.db` is absolute.
    pub fn from_url(url: &str) -> SqliteResult<Self> {
        let path = url
            .strip_prefix(URL_PREFIX)
            .filter(|path| !path.is_empty())
            .ok_or_else(|| SqliteDaoError::InvalidUrl {
                url: url.to_owned(),
            })?;
        Ok(Self::new(path))
    }

    /// Database file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_after_prefix() {
        let config = SqliteConfig::from_url("sqlite:///game.db").unwrap();
        assert_eq!(config.path(), Path::new("game.db"));
    }

    #[test]
    fn absolute_path_keeps_leading_slash() {
        let config = SqliteConfig::from_url("sqlite:////var/lib/game.db").unwrap();
        assert_eq!(config.path(), Path::new("/var/lib/game.db"));
    }

    #[test]
    fn rejects_other_forms() {
        assert!(SqliteConfig::from_url("sqlite:///").is_err());
        assert!(SqliteConfig::from_url("sqlite:game.db").is_err());
        assert!(SqliteConfig::from_url("mysql://localhost/game").is_err());
    }
}
