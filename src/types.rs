//! Common types used throughout tap-aircall
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single extracted row, keyed by field name
pub type Record = JsonObject;

/// Values handed from a parent record to a child stream.
///
/// Ordered so that serialized state partitions compare equal across runs.
pub type ContextMap = BTreeMap<String, JsonValue>;

// ============================================================================
// Replication Method
// ============================================================================

/// How a stream is replicated, as advertised in the discovery catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicationMethod {
    /// Fetch everything on every run
    #[default]
    FullTable,
    /// Only fetch records past the stored bookmark
    Incremental,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replication_method_serde() {
        let json = serde_json::to_string(&ReplicationMethod::Incremental).unwrap();
        assert_eq!(json, "\"INCREMENTAL\"");

        let method: ReplicationMethod = serde_json::from_str("\"FULL_TABLE\"").unwrap();
        assert_eq!(method, ReplicationMethod::FullTable);
    }

    #[test]
    fn test_option_string_none_if_empty() {
        assert_eq!(
            Some("test".to_string()).none_if_empty(),
            Some("test".to_string())
        );
        assert_eq!(Some(String::new()).none_if_empty(), None);
        assert_eq!(None::<String>.none_if_empty(), None);
        assert_eq!(String::new().none_if_empty(), None);
    }
}
