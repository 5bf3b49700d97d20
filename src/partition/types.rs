//! Partition types and traits

use crate::error::{Error, Result};
use crate::types::{ContextMap, Record};
use serde_json::Value;
use std::fmt::Debug;

/// How a stream's bookmarks are keyed in the state document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatePartitioning {
    /// One bookmark for the whole stream
    #[default]
    Stream,
    /// One bookmark per parent context
    Context,
    /// Never bookmarked; re-fetched on every parent visit
    Disabled,
}

impl StatePartitioning {
    /// Whether the stream writes bookmarks at all
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// The partition key for a bookmark under this policy.
    ///
    /// `None` means the stream-level bookmark. Disabled streams never reach
    /// the state store, so the answer for them is irrelevant.
    pub fn partition_key<'a>(&self, context: Option<&'a ContextMap>) -> Option<&'a ContextMap> {
        match self {
            Self::Context => context,
            Self::Stream | Self::Disabled => None,
        }
    }
}

/// Maps a parent record to the context of one child fetch
pub trait ContextMapper: Send + Sync + Debug {
    /// Build the child context, failing if the parent lacks a needed field
    fn child_context(&self, parent_stream: &str, record: &Record) -> Result<ContextMap>;
}

/// Copies one field of the parent record into the child context.
///
/// `ParentKeyMapper::new("id", "user_id")` maps `{"id": 42, ...}` to
/// `{"user_id": 42}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentKeyMapper {
    /// Field read from the parent record
    parent_key: String,
    /// Name the value is stored under in the context
    context_key: String,
}

impl ParentKeyMapper {
    /// Create a new mapper
    pub fn new(parent_key: impl Into<String>, context_key: impl Into<String>) -> Self {
        Self {
            parent_key: parent_key.into(),
            context_key: context_key.into(),
        }
    }

    /// Map the parent's `id` to `<entity>_id`
    pub fn id_as(context_key: impl Into<String>) -> Self {
        Self::new("id", context_key)
    }

    /// Field read from the parent record
    pub fn parent_key(&self) -> &str {
        &self.parent_key
    }

    /// Name of the context entry
    pub fn context_key(&self) -> &str {
        &self.context_key
    }
}

impl ContextMapper for ParentKeyMapper {
    fn child_context(&self, parent_stream: &str, record: &Record) -> Result<ContextMap> {
        match record.get(&self.parent_key) {
            Some(value) if !value.is_null() => Ok(ContextMap::from([(
                self.context_key.clone(),
                value.clone(),
            )])),
            _ => Err(Error::partition(
                parent_stream,
                format!(
                    "record has no '{}' to build the '{}' context",
                    self.parent_key, self.context_key
                ),
            )),
        }
    }
}

/// Render a context for log lines, `user_id=42`
pub(crate) fn describe_context(context: &ContextMap) -> String {
    context
        .iter()
        .map(|(k, v)| match v {
            Value::String(s) => format!("{k}={s}"),
            other => format!("{k}={other}"),
        })
        .collect::<Vec<_>>()
        .join(",")
}
