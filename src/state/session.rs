//! The per-player session document and the keys the store gives meaning to.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Epoch seconds of the last save, stamped by the store.
pub const LAST_MODIFIED_KEY: &str = "last_modified";
/// Ordered `{role, content}` entries recording the conversation with the player.
pub const HISTORY_KEY: &str = "internal_history";
/// Punishment queued by moderation, applied by the game loop.
pub const PENDING_PUNISHMENT_KEY: &str = "pending_punishment";

const USER_ROLE: &str = "user";

/// A player's full game state: a JSON object whose keys are opaque to the store except for the
/// reserved ones above.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct SessionDocument(Map<String, Value>);

/// Moderation flag stored under [`PENDING_PUNISHMENT_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PendingPunishment {
    pub level: String,
    pub reason: String,
}

impl SessionDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a stored blob. Anything other than a JSON object is rejected.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Embedded save timestamp, `0` when absent or not a number.
    ///
    /// This is the caller-writable copy inside the document, not the row timestamp kept by the
    /// database.
    pub fn last_modified(&self) -> f64 {
        self.get(LAST_MODIFIED_KEY)
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    /// Overwrite the embedded save timestamp.
    pub fn stamp_last_modified(&mut self, epoch_seconds: f64) {
        let value = serde_json::Number::from_f64(epoch_seconds)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(0));
        self.insert(LAST_MODIFIED_KEY, value);
    }

    /// Contents of every history entry authored by the player, oldest first.
    ///
    /// Entries without a `content` field are skipped; non-string content is rendered as JSON.
    pub fn user_inputs(&self) -> Vec<String> {
        let Some(Value::Array(history)) = self.get(HISTORY_KEY) else {
            return Vec::new();
        };

        history
            .iter()
            .filter(|entry| entry.get("role").and_then(Value::as_str) == Some(USER_ROLE))
            .filter_map(|entry| entry.get("content"))
            .map(|content| match content {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect()
    }

    /// The newest `n` player inputs, still in chronological order.
    pub fn last_user_inputs(&self, n: usize) -> Vec<String> {
        let mut inputs = self.user_inputs();
        let skip = inputs.len().saturating_sub(n);
        inputs.drain(..skip);
        inputs
    }

    pub fn pending_punishment(&self) -> Option<PendingPunishment> {
        self.get(PENDING_PUNISHMENT_KEY)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn set_pending_punishment(&mut self, punishment: PendingPunishment) {
        let value = serde_json::json!({
            "level": punishment.level,
            "reason": punishment.reason,
        });
        self.insert(PENDING_PUNISHMENT_KEY, value);
    }
}

impl From<Map<String, Value>> for SessionDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Current wall-clock time as fractional epoch seconds.
pub fn now_epoch_seconds() -> f64 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 / 1_000_000_000.0
}

/// Short label for admin listings: first and last character joined by an ellipsis.
/// Identifiers of two characters or fewer are shown as-is.
pub fn display_name(player_id: &str) -> String {
    let mut chars = player_id.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if chars.next().is_some() => format!("{first}...{last}"),
        _ => player_id.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn document(value: Value) -> SessionDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn rejects_non_object_blobs() {
        assert!(SessionDocument::from_json("[1, 2]").is_err());
        assert!(SessionDocument::from_json("\"text\"").is_err());
        assert!(SessionDocument::from_json("{not json").is_err());
        assert!(SessionDocument::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn stamp_overwrites_caller_value() {
        let mut doc = document(json!({"last_modified": "yesterday", "gold": 3}));
        doc.stamp_last_modified(1_700_000_000.5);
        assert_eq!(doc.last_modified(), 1_700_000_000.5);
        assert_eq!(doc.get("gold"), Some(&json!(3)));
    }

    #[test]
    fn last_modified_defaults_to_zero() {
        assert_eq!(SessionDocument::new().last_modified(), 0.0);
        assert_eq!(document(json!({"last_modified": "x"})).last_modified(), 0.0);
    }

    #[test]
    fn user_inputs_keep_order_and_skip_other_roles() {
        let doc = document(json!({
            "internal_history": [
                {"role": "user", "content": "a"},
                {"role": "bot", "content": "b"},
                {"role": "user", "content": "c"},
                {"role": "user"},
                {"role": "user", "content": 42}
            ]
        }));
        assert_eq!(doc.user_inputs(), vec!["a", "c", "42"]);
        assert_eq!(doc.last_user_inputs(1), vec!["42"]);
        assert_eq!(doc.last_user_inputs(2), vec!["c", "42"]);
        assert_eq!(doc.last_user_inputs(10), vec!["a", "c", "42"]);
        assert!(doc.last_user_inputs(0).is_empty());
    }

    #[test]
    fn missing_or_malformed_history_yields_nothing() {
        assert!(SessionDocument::new().user_inputs().is_empty());
        assert!(
            document(json!({"internal_history": "oops"}))
                .user_inputs()
                .is_empty()
        );
    }

    #[test]
    fn punishment_round_trips_through_document() {
        let mut doc = SessionDocument::new();
        assert!(doc.pending_punishment().is_none());
        doc.set_pending_punishment(PendingPunishment {
            level: "mute".into(),
            reason: "spam".into(),
        });
        assert_eq!(
            doc.get(PENDING_PUNISHMENT_KEY),
            Some(&json!({"level": "mute", "reason": "spam"}))
        );
        assert_eq!(doc.pending_punishment().unwrap().level, "mute");
    }

    #[test]
    fn display_name_truncates_long_ids() {
        assert_eq!(display_name("player42"), "p...2");
        assert_eq!(display_name("abc"), "a...c");
        assert_eq!(display_name("ab"), "ab");
        assert_eq!(display_name("a"), "a");
        assert_eq!(display_name(""), "");
        assert_eq!(display_name("éàü"), "é...ü");
    }
}
