//! In-process session backend used by tests and local tooling.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use dashmap::DashMap;
use futures::future::BoxFuture;

use super::SessionBackend;
use crate::dao::{
    models::SessionRow,
    storage::{StorageError, StorageResult},
};

#[derive(Debug, Clone)]
struct StoredRow {
    session_data: Option<String>,
    // Stand-in for the backend-maintained `last_modified` column.
    revision: u64,
}

/// Session backend keeping rows in a concurrent map.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    rows: DashMap<String, StoredRow>,
    clock: AtomicU64,
    offline: AtomicBool,
}

/// Error surfaced while the memory backend is switched offline.
#[derive(Debug, thiserror::Error)]
#[error("memory backend is offline")]
pub struct Offline;

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable backend: every call fails until switched back on.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Write a raw blob, bypassing serialization, to model rows written by other tools.
    pub fn insert_raw(&self, player_id: &str, session_data: Option<&str>) {
        self.write(player_id.to_owned(), session_data.map(str::to_owned));
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.inner.rows.len()
    }

    /// Whether no row has been written yet.
    pub fn is_empty(&self) -> bool {
        self.inner.rows.is_empty()
    }

    fn write(&self, player_id: String, session_data: Option<String>) {
        let revision = self.inner.clock.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.rows.insert(
            player_id,
            StoredRow {
                session_data,
                revision,
            },
        );
    }

    fn ensure_online(&self) -> StorageResult<()> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(StorageError::connection(
                "memory backend offline".into(),
                Offline,
            ));
        }
        Ok(())
    }

    fn find(&self, player_id: &str) -> Option<SessionRow> {
        self.inner.rows.get(player_id).map(|entry| SessionRow {
            player_id: entry.key().clone(),
            session_data: entry.session_data.clone(),
        })
    }

    fn recent(&self, limit: u32) -> Vec<SessionRow> {
        let mut rows: Vec<(u64, SessionRow)> = self
            .inner
            .rows
            .iter()
            .map(|entry| {
                (
                    entry.revision,
                    SessionRow {
                        player_id: entry.key().clone(),
                        session_data: entry.session_data.clone(),
                    },
                )
            })
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        rows.into_iter()
            .take(limit as usize)
            .map(|(_, row)| row)
            .collect()
    }
}

impl SessionBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn upsert(&self, player_id: String, payload: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            store.write(player_id, Some(payload));
            Ok(())
        })
    }

    fn query_by_key(
        &self,
        player_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<SessionRow>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store.find(&player_id))
        })
    }

    fn query_recent(&self, limit: u32) -> BoxFuture<'static, StorageResult<Vec<SessionRow>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store.recent(limit))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_overwrites_in_place() {
        let backend = MemoryBackend::new();
        backend.upsert("p1".into(), "{\"a\":1}".into()).await.unwrap();
        backend.upsert("p1".into(), "{\"a\":2}".into()).await.unwrap();

        assert_eq!(backend.len(), 1);
        let row = backend.query_by_key("p1".into()).await.unwrap().unwrap();
        assert_eq!(row.session_data.as_deref(), Some("{\"a\":2}"));
    }

    #[tokio::test]
    async fn recent_orders_by_last_write() {
        let backend = MemoryBackend::new();
        for id in ["a", "b", "c"] {
            backend.upsert(id.into(), "{}".into()).await.unwrap();
        }
        backend.upsert("a".into(), "{}".into()).await.unwrap();

        let ids: Vec<String> = backend
            .query_recent(2)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.player_id)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn offline_backend_reports_connection_errors() {
        let backend = MemoryBackend::new();
        backend.set_offline(true);
        let err = backend.health_check().await.unwrap_err();
        assert!(err.is_unavailable());
        assert!(backend.upsert("p".into(), "{}".into()).await.is_err());
        assert!(backend.is_empty());
    }
}
