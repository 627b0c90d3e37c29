//! Session store: read-modify-write access to player sessions on top of the active backend.
//!
//! Every operation acquires a backend handle for the duration of one statement, so the store
//! itself holds no locks. Concurrent writers to the same player are not ordered here; the
//! read-modify-write helpers (`create_or_get_session`, `flag_for_punishment`) can lose a
//! concurrent update made between their read and their write. Callers needing strict ordering
//! must serialize writes per player themselves.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    dao::session_backend::SessionBackend,
    dto::session::SessionSummary,
    error::ServiceError,
    services::{
        broadcast::{Broadcaster, StateUpdate},
        obfuscation::Obfuscator,
    },
    state::session::{PendingPunishment, SessionDocument, display_name, now_epoch_seconds},
};

/// Player session persistence with post-commit broadcast.
pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    broadcaster: Broadcaster,
    obfuscator: Arc<dyn Obfuscator>,
}

impl SessionStore {
    pub fn new(
        backend: Arc<dyn SessionBackend>,
        broadcaster: Broadcaster,
        obfuscator: Arc<dyn Obfuscator>,
    ) -> Self {
        Self {
            backend,
            broadcaster,
            obfuscator,
        }
    }

    /// Backend the store writes to.
    pub fn backend(&self) -> &Arc<dyn SessionBackend> {
        &self.backend
    }

    /// Load a player's session.
    ///
    /// `Ok(None)` when no row exists or the stored blob is empty. A blob that is not a JSON
    /// object is an error, never an absence.
    pub async fn get_session(
        &self,
        player_id: &str,
    ) -> Result<Option<SessionDocument>, ServiceError> {
        let row = self
            .backend
            .query_by_key(player_id.to_owned())
            .await
            .inspect_err(|err| {
                error!(player_id = %player_id, operation = "get_session", error = %err, "failed to get session");
            })?;

        let Some(raw) = row.as_ref().and_then(|row| row.payload()) else {
            return Ok(None);
        };

        SessionDocument::from_json(raw).map(Some).map_err(|source| {
            error!(player_id = %player_id, operation = "get_session", error = %source, "stored session is not valid JSON");
            ServiceError::Decode {
                player_id: player_id.to_owned(),
                source,
            }
        })
    }

    /// Persist the whole document and notify live subscribers once the write is committed.
    ///
    /// `last_modified` is overwritten with the save time. Returns the document as stored.
    pub async fn save_session(
        &self,
        player_id: &str,
        mut document: SessionDocument,
    ) -> Result<SessionDocument, ServiceError> {
        document.stamp_last_modified(now_epoch_seconds());

        let payload = document.to_json().map_err(|source| {
            error!(player_id = %player_id, operation = "save_session", error = %source, "failed to encode session");
            ServiceError::Encode {
                player_id: player_id.to_owned(),
                source,
            }
        })?;

        self.backend
            .upsert(player_id.to_owned(), payload)
            .await
            .inspect_err(|err| {
                error!(player_id = %player_id, operation = "save_session", error = %err, "failed to save session");
            })?;

        self.broadcaster.enqueue(StateUpdate {
            player_id: player_id.to_owned(),
            document: document.clone(),
        });

        Ok(document)
    }

    /// Return the stored session, persisting an empty one first when none exists.
    pub async fn create_or_get_session(
        &self,
        player_id: &str,
    ) -> Result<SessionDocument, ServiceError> {
        match self.get_session(player_id).await? {
            Some(document) => Ok(document),
            None => self.save_session(player_id, SessionDocument::new()).await,
        }
    }

    /// The last `n` inputs the player typed, oldest first.
    pub async fn last_n_inputs(
        &self,
        player_id: &str,
        n: usize,
    ) -> Result<Vec<String>, ServiceError> {
        Ok(self
            .get_session(player_id)
            .await?
            .map(|document| document.last_user_inputs(n))
            .unwrap_or_default())
    }

    /// Most recently saved sessions, newest first, for the admin overview.
    ///
    /// Rows whose blob cannot be decoded are logged and skipped.
    pub async fn list_recent_sessions(
        &self,
        limit: u32,
    ) -> Result<Vec<SessionSummary>, ServiceError> {
        let rows = self.backend.query_recent(limit).await.inspect_err(|err| {
            error!(operation = "list_recent_sessions", error = %err, "failed to get most recent sessions");
        })?;

        let summaries = rows
            .into_iter()
            .filter_map(|row| {
                let document = match row.payload().map(SessionDocument::from_json) {
                    Some(Ok(document)) => document,
                    None => SessionDocument::new(),
                    Some(Err(err)) => {
                        warn!(player_id = %row.player_id, operation = "list_recent_sessions", error = %err, "skipping undecodable session");
                        return None;
                    }
                };

                Some(SessionSummary {
                    player_id: self.obfuscator.obfuscate(&row.player_id),
                    display_name: display_name(&row.player_id),
                    last_modified: document.last_modified(),
                })
            })
            .collect();

        Ok(summaries)
    }

    /// Replace the session with an empty document. The row itself is kept.
    pub async fn clear_session(&self, player_id: &str) -> Result<SessionDocument, ServiceError> {
        let document = self.save_session(player_id, SessionDocument::new()).await?;
        info!(player_id = %player_id, "session has been cleared");
        Ok(document)
    }

    /// Attach a pending punishment to an existing session.
    ///
    /// Returns `false` without writing anything when the player has no session.
    pub async fn flag_for_punishment(
        &self,
        player_id: &str,
        level: &str,
        reason: &str,
    ) -> Result<bool, ServiceError> {
        let Some(mut document) = self.get_session(player_id).await? else {
            warn!(player_id = %player_id, "attempted to flag non-existent session");
            return Ok(false);
        };

        document.set_pending_punishment(PendingPunishment {
            level: level.to_owned(),
            reason: reason.to_owned(),
        });
        self.save_session(player_id, document).await?;
        info!(player_id = %player_id, level = %level, reason = %reason, "player flagged for punishment");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::{
        dao::{session_backend::memory::MemoryBackend, storage::StorageError},
        services::{
            broadcast::{BroadcastSink, tests::ChannelSink},
            obfuscation::HmacObfuscator,
        },
        state::session::{LAST_MODIFIED_KEY, PENDING_PUNISHMENT_KEY},
    };

    struct Harness {
        store: SessionStore,
        backend: MemoryBackend,
        updates: UnboundedReceiver<StateUpdate>,
    }

    fn harness() -> Harness {
        let backend = MemoryBackend::new();
        let (sink, updates) = ChannelSink::new();
        let sinks: Vec<Arc<dyn BroadcastSink>> = vec![sink];
        let store = SessionStore::new(
            Arc::new(backend.clone()),
            Broadcaster::spawn(16, sinks),
            Arc::new(HmacObfuscator::new(b"test-secret")),
        );
        Harness {
            store,
            backend,
            updates,
        }
    }

    fn doc(value: serde_json::Value) -> SessionDocument {
        serde_json::from_value(value).unwrap()
    }

    fn without_timestamp(mut document: SessionDocument) -> SessionDocument {
        document.remove(LAST_MODIFIED_KEY);
        document
    }

    async fn next_update(rx: &mut UnboundedReceiver<StateUpdate>) -> StateUpdate {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("update should be broadcast")
            .expect("dispatcher alive")
    }

    async fn assert_no_update(rx: &mut UnboundedReceiver<StateUpdate>) {
        let outcome = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(outcome.is_err(), "unexpected broadcast: {outcome:?}");
    }

    #[tokio::test]
    async fn save_then_get_returns_document_with_timestamp() {
        let mut h = harness();
        let original = doc(json!({"hp": 10, "inventory": ["sword"], "last_modified": 1}));

        let saved = h.store.save_session("alice", original.clone()).await.unwrap();
        let loaded = h.store.get_session("alice").await.unwrap().unwrap();

        assert_eq!(loaded, saved);
        assert_eq!(without_timestamp(loaded.clone()), without_timestamp(original));
        assert!(loaded.last_modified() > 1.0);

        let update = next_update(&mut h.updates).await;
        assert_eq!(update.player_id, "alice");
        assert_eq!(update.document, saved);
    }

    #[tokio::test]
    async fn unknown_player_is_absent_not_error() {
        let h = harness();
        assert!(h.store.get_session("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_blob_is_absent_but_garbage_is_an_error() {
        let h = harness();
        h.backend.insert_raw("blank", Some(""));
        h.backend.insert_raw("null", None);
        h.backend.insert_raw("broken", Some("{oops"));

        assert!(h.store.get_session("blank").await.unwrap().is_none());
        assert!(h.store.get_session("null").await.unwrap().is_none());
        assert!(matches!(
            h.store.get_session("broken").await,
            Err(ServiceError::Decode { ref player_id, .. }) if player_id == "broken"
        ));
    }

    #[tokio::test]
    async fn create_or_get_persists_empty_session_once() {
        let mut h = harness();

        let created = h.store.create_or_get_session("bob").await.unwrap();
        assert_eq!(created.len(), 1);
        assert!(created.get(LAST_MODIFIED_KEY).is_some());
        assert_eq!(next_update(&mut h.updates).await.player_id, "bob");

        let again = h.store.create_or_get_session("bob").await.unwrap();
        assert_eq!(again, created);
        assert_no_update(&mut h.updates).await;
        assert_eq!(h.backend.len(), 1);
    }

    #[tokio::test]
    async fn clear_keeps_row_with_empty_document() {
        let h = harness();
        h.store
            .save_session("carol", doc(json!({"level": 4})))
            .await
            .unwrap();

        h.store.clear_session("carol").await.unwrap();

        let cleared = h.store.get_session("carol").await.unwrap().unwrap();
        assert!(without_timestamp(cleared).is_empty());
        assert_eq!(h.backend.len(), 1);
    }

    #[tokio::test]
    async fn last_inputs_only_include_user_turns() {
        let h = harness();
        h.store
            .save_session(
                "dave",
                doc(json!({"internal_history": [
                    {"role": "user", "content": "a"},
                    {"role": "bot", "content": "b"},
                    {"role": "user", "content": "c"}
                ]})),
            )
            .await
            .unwrap();

        assert_eq!(h.store.last_n_inputs("dave", 1).await.unwrap(), vec!["c"]);
        assert_eq!(
            h.store.last_n_inputs("dave", 5).await.unwrap(),
            vec!["a", "c"]
        );
        assert!(h.store.last_n_inputs("nobody", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn flagging_missing_session_writes_nothing() {
        let mut h = harness();
        let flagged = h
            .store
            .flag_for_punishment("ghost", "ban", "cheating")
            .await
            .unwrap();

        assert!(!flagged);
        assert!(h.store.get_session("ghost").await.unwrap().is_none());
        assert!(h.backend.is_empty());
        assert_no_update(&mut h.updates).await;
    }

    #[tokio::test]
    async fn flagging_merges_and_rebroadcasts() {
        let mut h = harness();
        h.store
            .save_session("erin", doc(json!({"gold": 7})))
            .await
            .unwrap();
        next_update(&mut h.updates).await;

        assert!(
            h.store
                .flag_for_punishment("erin", "mute", "spam")
                .await
                .unwrap()
        );

        let stored = h.store.get_session("erin").await.unwrap().unwrap();
        assert_eq!(stored.get("gold"), Some(&json!(7)));
        assert_eq!(
            stored.get(PENDING_PUNISHMENT_KEY),
            Some(&json!({"level": "mute", "reason": "spam"}))
        );
        let update = next_update(&mut h.updates).await;
        assert_eq!(update.document, stored);
    }

    #[tokio::test]
    async fn failed_save_is_reported_and_not_broadcast() {
        let mut h = harness();
        h.backend.set_offline(true);

        let result = h.store.save_session("frank", SessionDocument::new()).await;
        assert!(matches!(result, Err(ServiceError::Storage(ref err)) if err.is_unavailable()));
        assert_no_update(&mut h.updates).await;
    }

    #[tokio::test]
    async fn recent_sessions_newest_first_and_obfuscated() {
        let h = harness();
        for id in ["player-one", "player-two", "player-three"] {
            h.store
                .save_session(id, doc(json!({"id": id})))
                .await
                .unwrap();
        }

        let recent = h.store.list_recent_sessions(2).await.unwrap();
        let names: Vec<&str> = recent.iter().map(|s| s.display_name.as_str()).collect();
        assert_eq!(names, vec!["p...e", "p...o"]);

        let obfuscator = HmacObfuscator::new(b"test-secret");
        assert_eq!(recent[0].player_id, obfuscator.obfuscate("player-three"));
        assert_eq!(recent[1].player_id, obfuscator.obfuscate("player-two"));
        assert!(recent[0].last_modified >= recent[1].last_modified);
    }

    #[tokio::test]
    async fn recent_sessions_skip_undecodable_rows() {
        let h = harness();
        h.store
            .save_session("good", doc(json!({"last_modified": 5})))
            .await
            .unwrap();
        h.backend.insert_raw("bad", Some("not json"));
        h.backend.insert_raw("ab", None);

        let recent = h.store.list_recent_sessions(10).await.unwrap();
        let names: Vec<&str> = recent.iter().map(|s| s.display_name.as_str()).collect();
        assert_eq!(names, vec!["ab", "g...d"]);
        assert_eq!(recent[0].last_modified, 0.0);
    }

    #[tokio::test]
    async fn recent_sessions_surface_query_failures() {
        let h = harness();
        h.backend.set_offline(true);
        assert!(matches!(
            h.store.list_recent_sessions(5).await,
            Err(ServiceError::Storage(StorageError::Connection { .. }))
        ));
    }

    #[tokio::test]
    async fn concurrent_writers_to_distinct_players_do_not_interfere() {
        let h = harness();
        let store = Arc::new(h.store);

        let mut tasks = Vec::new();
        for player in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let id = format!("player-{player}");
                for round in 0..10 {
                    store
                        .save_session(&id, doc(json!({"owner": id, "round": round})))
                        .await
                        .unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        for player in 0..8 {
            let id = format!("player-{player}");
            let stored = store.get_session(&id).await.unwrap().unwrap();
            assert_eq!(stored.get("owner"), Some(&json!(id)));
            assert_eq!(stored.get("round"), Some(&json!(9)));
        }
    }
}
