//! Singer protocol messages
//!
//! One JSON object per line, discriminated by `type`:
//!
//! ```json
//! {"type": "SCHEMA", "stream": "calls", "schema": {...}, "key_properties": ["id"], "bookmark_properties": ["started_at"]}
//! {"type": "RECORD", "stream": "calls", "record": {...}, "time_extracted": "2024-01-01T00:00:00Z"}
//! {"type": "STATE", "value": {"bookmarks": {...}}}
//! ```

use crate::error::{Error, Result};
use crate::streams::StreamDefinition;
use crate::types::{JsonValue, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A message on the tap's output stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SingerMessage {
    /// Describes the records of a stream; precedes them
    Schema {
        stream: String,
        schema: JsonValue,
        key_properties: Vec<String>,
        #[serde(default)]
        bookmark_properties: Vec<String>,
    },
    /// One extracted record
    Record {
        stream: String,
        record: Record,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_extracted: Option<DateTime<Utc>>,
    },
    /// Bookmark checkpoint
    State { value: JsonValue },
}

impl SingerMessage {
    /// SCHEMA message for a stream
    pub fn schema(stream: &StreamDefinition) -> Self {
        Self::schema_excluding(stream, &BTreeSet::new())
    }

    /// SCHEMA message for a stream whose records omit `fields`
    pub fn schema_excluding(stream: &StreamDefinition, fields: &BTreeSet<String>) -> Self {
        let mut schema = stream.schema().clone();
        schema.properties.retain(|name, _| !fields.contains(name));
        schema.required.retain(|name| !fields.contains(name));

        Self::Schema {
            stream: stream.name().to_string(),
            schema: schema.to_json(),
            key_properties: stream.primary_key().to_vec(),
            bookmark_properties: stream.replication_key().map(ToString::to_string).into_iter().collect(),
        }
    }

    /// RECORD message
    pub fn record(stream: impl Into<String>, record: Record, time_extracted: DateTime<Utc>) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
            time_extracted: Some(time_extracted),
        }
    }

    /// STATE message
    pub fn state(value: JsonValue) -> Self {
        Self::State { value }
    }

    /// Stream the message belongs to, if any
    pub fn stream(&self) -> Option<&str> {
        match self {
            Self::Schema { stream, .. } | Self::Record { stream, .. } => Some(stream),
            Self::State { .. } => None,
        }
    }

    /// Serialize as one output line, without the trailing newline
    pub fn to_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::output(format!("Failed to serialize message: {e}")))
    }
}
