pub mod memory;
#[cfg(feature = "mysql-store")]
pub mod mysql;
#[cfg(feature = "sqlite-store")]
pub mod sqlite;

use crate::dao::{models::SessionRow, storage::StorageResult};
use futures::future::BoxFuture;

/// Abstraction over the persistence layer for player sessions.
///
/// Each implementation owns its connection handling: every call acquires a handle, runs its
/// statement and releases the handle before the future resolves, on success and on failure.
pub trait SessionBackend: Send + Sync {
    /// Short name of the engine, used in logs and health output.
    fn name(&self) -> &'static str;
    /// Insert the row, or overwrite `session_data` when `player_id` already exists.
    /// Resolves only after the write is committed.
    fn upsert(&self, player_id: String, payload: String) -> BoxFuture<'static, StorageResult<()>>;
    fn query_by_key(&self, player_id: String)
    -> BoxFuture<'static, StorageResult<Option<SessionRow>>>;
    /// Most recently written rows first, at most `limit` of them.
    fn query_recent(&self, limit: u32) -> BoxFuture<'static, StorageResult<Vec<SessionRow>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
