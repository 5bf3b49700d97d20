//! State manager implementation
//!
//! Holds the bookmarks of a run behind a shared lock. Prior state is read
//! once at startup; progress leaves the process only as Singer STATE
//! messages, which the orchestrator persists.

use super::types::State;
use crate::error::{Error, Result};
use crate::types::{ContextMap, JsonValue};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// State manager for loading and updating bookmarks
#[derive(Debug, Clone, Default)]
pub struct StateManager {
    /// Current state (shared between clones)
    state: Arc<RwLock<State>>,
}

impl StateManager {
    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self::with_state(State::new())
    }

    /// Create an in-memory state manager seeded with `state`
    pub fn with_state(state: State) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Read prior state from a file.
    ///
    /// A missing file means a first run. The file is never written back.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No state file, starting fresh");
            return Ok(Self::in_memory());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| Error::State {
            message: format!("Failed to read state file {}: {e}", path.display()),
        })?;
        Self::from_json(&contents)
    }

    /// Create a state manager from inline JSON string.
    ///
    /// Accepts both a bare state document and one wrapped in a
    /// `{"value": {...}}` envelope. Blank input is an empty state.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::in_memory());
        }
        let raw: JsonValue = serde_json::from_str(json).map_err(|e| Error::State {
            message: format!("Failed to parse state JSON: {e}"),
        })?;
        Ok(Self::with_state(parse_state(raw)?))
    }

    /// Get a read lock on the current state
    pub async fn state(&self) -> tokio::sync::RwLockReadGuard<'_, State> {
        self.state.read().await
    }

    /// Snapshot of the current state
    pub async fn snapshot(&self) -> State {
        self.state.read().await.clone()
    }

    /// Current state as a JSON value, the payload of a STATE message
    pub async fn to_value(&self) -> Result<JsonValue> {
        let state = self.state.read().await;
        serde_json::to_value(&*state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })
    }

    /// Bookmark for a stream, or for one context of a partitioned stream
    pub async fn get_bookmark(&self, stream: &str, context: Option<&ContextMap>) -> Option<JsonValue> {
        let state = self.state.read().await;
        state.get_bookmark(stream, context).cloned()
    }

    /// Commit a bookmark, ignoring values that would move it backwards.
    ///
    /// Returns whether the stored bookmark changed.
    pub async fn commit_bookmark(
        &self,
        stream: &str,
        context: Option<&ContextMap>,
        replication_key: &str,
        value: JsonValue,
    ) -> bool {
        let mut state = self.state.write().await;
        state.advance_bookmark(stream, context, replication_key, value)
    }
}

/// Unwrap an optional `{"value": ...}` envelope and parse the state inside
fn parse_state(raw: JsonValue) -> Result<State> {
    let inner = match raw {
        JsonValue::Object(mut map) if map.len() == 1 && map.contains_key("value") => {
            map.remove("value").unwrap_or_default()
        }
        other => other,
    };
    if inner.is_null() {
        return Ok(State::new());
    }
    serde_json::from_value(inner).map_err(|e| Error::State {
        message: format!("State does not match the Singer bookmark layout: {e}"),
    })
}
