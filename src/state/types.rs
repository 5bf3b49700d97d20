//! State types for tracking sync progress
//!
//! Serialized in the Singer SDK layout so state written by other Singer taps
//! and orchestrators round-trips unchanged:
//!
//! ```json
//! {"bookmarks": {"calls": {"replication_key": "started_at",
//!                          "replication_key_value": "2024-01-02T00:00:00Z"}}}
//! ```

use crate::types::{ContextMap, JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Complete state for a tap run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream bookmarks
    #[serde(default)]
    pub bookmarks: BTreeMap<String, StreamState>,

    /// Keys written by other tools, kept as-is
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.bookmarks.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.bookmarks.entry(stream.to_string()).or_default()
    }

    /// Bookmark value for a stream, or for one context of it
    pub fn get_bookmark(&self, stream: &str, context: Option<&ContextMap>) -> Option<&JsonValue> {
        let stream_state = self.get_stream(stream)?;
        match context {
            None => stream_state.replication_key_value.as_ref(),
            Some(context) => stream_state
                .get_partition(context)?
                .replication_key_value
                .as_ref(),
        }
    }

    /// Move a bookmark forward.
    ///
    /// Returns `false` and leaves the state alone when `value` is not later
    /// than the stored bookmark.
    pub fn advance_bookmark(
        &mut self,
        stream: &str,
        context: Option<&ContextMap>,
        replication_key: &str,
        value: JsonValue,
    ) -> bool {
        let stream_state = self.get_stream_mut(stream);
        let (key_slot, value_slot) = match context {
            None => (
                &mut stream_state.replication_key,
                &mut stream_state.replication_key_value,
            ),
            Some(context) => {
                let partition = stream_state.get_partition_mut(context);
                (
                    &mut partition.replication_key,
                    &mut partition.replication_key_value,
                )
            }
        };

        if let Some(current) = value_slot.as_ref() {
            if !is_later(&value, current) {
                return false;
            }
        }
        *key_slot = Some(replication_key.to_string());
        *value_slot = Some(value);
        true
    }
}

/// Bookmarks of a single stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamState {
    /// Name of the replication key the bookmark tracks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,

    /// Last replication key value synced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<JsonValue>,

    /// Per-context bookmarks for streams partitioned by context
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<PartitionState>,
}

impl StreamState {
    /// Create a new empty stream state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get partition state
    pub fn get_partition(&self, context: &ContextMap) -> Option<&PartitionState> {
        self.partitions.iter().find(|p| &p.context == context)
    }

    /// Get mutable partition state, creating if needed
    pub fn get_partition_mut(&mut self, context: &ContextMap) -> &mut PartitionState {
        let index = match self.partitions.iter().position(|p| &p.context == context) {
            Some(index) => index,
            None => {
                self.partitions.push(PartitionState::new(context.clone()));
                self.partitions.len() - 1
            }
        };
        &mut self.partitions[index]
    }
}

/// Bookmark of one context of a partitioned stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionState {
    /// Context the bookmark belongs to
    pub context: ContextMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<JsonValue>,
}

impl PartitionState {
    /// Create an empty partition for a context
    pub fn new(context: ContextMap) -> Self {
        Self {
            context,
            ..Default::default()
        }
    }
}

/// Read a bookmark value as a point in time.
///
/// Accepts RFC 3339 strings and numeric Unix epochs (seconds).
pub fn bookmark_timestamp(value: &JsonValue) -> Option<DateTime<Utc>> {
    match value {
        JsonValue::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| s.parse::<i64>().ok().and_then(|secs| DateTime::from_timestamp(secs, 0))),
        JsonValue::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

/// Whether `candidate` is strictly later than `current`
fn is_later(candidate: &JsonValue, current: &JsonValue) -> bool {
    match (bookmark_timestamp(candidate), bookmark_timestamp(current)) {
        (Some(a), Some(b)) => a > b,
        // An unreadable stored value is replaced by a readable one
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Order two bookmark values by time, unreadable values first
pub fn compare_bookmarks(a: &JsonValue, b: &JsonValue) -> Ordering {
    bookmark_timestamp(a).cmp(&bookmark_timestamp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn context(key: &str, id: i64) -> ContextMap {
        ContextMap::from([(key.to_string(), json!(id))])
    }

    #[test]
    fn test_state_default() {
        let state = State::new();
        assert!(state.bookmarks.is_empty());
        assert_eq!(serde_json::to_value(&state).unwrap(), json!({"bookmarks": {}}));
    }

    #[test]
    fn test_advance_bookmark_is_monotonic() {
        let mut state = State::new();
        assert!(state.get_bookmark("calls", None).is_none());

        assert!(state.advance_bookmark("calls", None, "started_at", json!("2024-01-02T00:00:00Z")));
        assert!(!state.advance_bookmark("calls", None, "started_at", json!("2024-01-01T00:00:00Z")));
        assert!(!state.advance_bookmark("calls", None, "started_at", json!("2024-01-02T00:00:00Z")));
        assert_eq!(
            state.get_bookmark("calls", None),
            Some(&json!("2024-01-02T00:00:00Z"))
        );

        assert!(state.advance_bookmark("calls", None, "started_at", json!("2024-01-03T00:00:00+00:00")));
        assert_eq!(
            state.get_bookmark("calls", None),
            Some(&json!("2024-01-03T00:00:00+00:00"))
        );
    }

    #[test]
    fn test_bookmarks_compare_as_timestamps() {
        // Lexically smaller, chronologically later
        let mut state = State::new();
        state.advance_bookmark("users", None, "created_at", json!("2024-01-01T10:00:00+02:00"));
        assert!(state.advance_bookmark("users", None, "created_at", json!("2024-01-01T09:00:00Z")));

        assert_eq!(
            compare_bookmarks(&json!(1704067200), &json!("2024-01-01T00:00:00Z")),
            Ordering::Equal
        );
    }

    #[test]
    fn test_partition_bookmarks_are_independent() {
        let mut state = State::new();
        let first = context("user_id", 1);
        let second = context("user_id", 2);

        state.advance_bookmark("user", Some(&first), "created_at", json!("2024-01-01T00:00:00Z"));
        assert!(state.get_bookmark("user", Some(&second)).is_none());
        assert!(state.get_bookmark("user", None).is_none());

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            json!({"bookmarks": {"user": {"partitions": [{
                "context": {"user_id": 1},
                "replication_key": "created_at",
                "replication_key_value": "2024-01-01T00:00:00Z"
            }]}}})
        );
    }

    #[test]
    fn test_state_round_trip_keeps_unknown_keys() {
        let raw = json!({
            "bookmarks": {"calls": {"replication_key": "started_at", "replication_key_value": "2024-01-01T00:00:00Z"}},
            "currently_syncing": null
        });
        let state: State = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&state).unwrap(), raw);
    }
}
