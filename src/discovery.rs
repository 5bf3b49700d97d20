//! Singer catalog documents
//!
//! `--discover` prints a [`Catalog`] describing every stream; `--catalog`
//! reads one back and uses its `selected` flags to decide which streams, and
//! which fields of them, to sync.

use crate::error::{Error, Result, ResultExt};
use crate::streams::{StreamCatalog, StreamDefinition};
use crate::types::{JsonValue, ReplicationMethod};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, warn};

// ============================================================================
// Catalog Types
// ============================================================================

/// Fields left out of each stream's records, keyed by stream name
pub type DeselectedFields = HashMap<String, BTreeSet<String>>;

/// Catalog document (`{"streams": [...]}`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Stream entries
    #[serde(default)]
    pub streams: Vec<CatalogEntry>,
}

/// One stream of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stream identifier
    pub tap_stream_id: String,

    /// Stream name
    pub stream: String,

    /// JSON schema of the records
    #[serde(default)]
    pub schema: JsonValue,

    /// Primary key fields
    #[serde(default)]
    pub key_properties: Vec<String>,

    /// Field used as bookmark
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,

    /// How the stream is replicated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_method: Option<ReplicationMethod>,

    /// Breadcrumb metadata
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
}

/// Metadata attached to a breadcrumb (`[]` for the stream itself)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Path to the node, e.g. `["properties", "id"]`
    #[serde(default)]
    pub breadcrumb: Vec<String>,

    /// Key/value metadata
    #[serde(default)]
    pub metadata: BTreeMap<String, JsonValue>,
}

impl MetadataEntry {
    /// Whether this entry describes the stream rather than a property
    pub fn is_root(&self) -> bool {
        self.breadcrumb.is_empty()
    }

    fn flag(&self, key: &str) -> Option<bool> {
        self.metadata.get(key).and_then(JsonValue::as_bool)
    }
}

impl CatalogEntry {
    /// Describe a stream
    pub fn from_definition(stream: &StreamDefinition) -> Self {
        let key_properties = stream.primary_key().to_vec();
        let replication_key = stream.replication_key().map(ToString::to_string);

        let mut root = BTreeMap::new();
        root.insert("inclusion".to_string(), JsonValue::from("available"));
        root.insert(
            "selected-by-default".to_string(),
            JsonValue::from(stream.selected_by_default()),
        );
        root.insert(
            "selected".to_string(),
            JsonValue::from(stream.selected_by_default()),
        );
        root.insert(
            "table-key-properties".to_string(),
            JsonValue::from(key_properties.clone()),
        );
        root.insert(
            "forced-replication-method".to_string(),
            serde_json::to_value(stream.replication_method()).unwrap_or_default(),
        );
        if let Some(key) = &replication_key {
            root.insert(
                "valid-replication-keys".to_string(),
                JsonValue::from(vec![key.clone()]),
            );
        }
        if let Some(parent) = stream.parent() {
            root.insert(
                "parent-tap-stream-id".to_string(),
                JsonValue::from(parent.stream.clone()),
            );
        }

        let mut metadata = vec![MetadataEntry {
            breadcrumb: Vec::new(),
            metadata: root,
        }];

        for name in stream.schema().properties.keys() {
            let automatic = key_properties.contains(name) || replication_key.as_ref() == Some(name);
            let inclusion = if automatic { "automatic" } else { "available" };
            metadata.push(MetadataEntry {
                breadcrumb: vec!["properties".to_string(), name.clone()],
                metadata: BTreeMap::from([(
                    "inclusion".to_string(),
                    JsonValue::from(inclusion),
                )]),
            });
        }

        Self {
            tap_stream_id: stream.name().to_string(),
            stream: stream.name().to_string(),
            schema: stream.schema().to_json(),
            key_properties,
            replication_key,
            replication_method: Some(stream.replication_method()),
            metadata,
        }
    }

    /// Root metadata entry, if present
    pub fn root_metadata(&self) -> Option<&MetadataEntry> {
        self.metadata.iter().find(|m| m.is_root())
    }

    /// The selection recorded in this entry, if any.
    ///
    /// `selected` wins over `selected-by-default`.
    pub fn selection(&self) -> Option<bool> {
        let root = self.root_metadata()?;
        root.flag("selected").or_else(|| root.flag("selected-by-default"))
    }

    /// Properties this entry deselects.
    ///
    /// `automatic` properties are always synced and never listed.
    pub fn deselected_properties(&self) -> BTreeSet<String> {
        self.metadata
            .iter()
            .filter_map(|entry| {
                let [kind, name] = entry.breadcrumb.as_slice() else {
                    return None;
                };
                if kind.as_str() != "properties" {
                    return None;
                }
                let automatic = entry.metadata.get("inclusion").and_then(JsonValue::as_str)
                    == Some("automatic");
                let selected = entry
                    .flag("selected")
                    .or_else(|| entry.flag("selected-by-default"))
                    .unwrap_or(true);
                (!automatic && !selected).then(|| name.clone())
            })
            .collect()
    }
}

impl Catalog {
    /// Catalog describing every stream
    pub fn discover(streams: &StreamCatalog) -> Self {
        Self {
            streams: streams.iter().map(CatalogEntry::from_definition).collect(),
        }
    }

    /// Read a catalog file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        Self::from_json(&contents)
    }

    /// Parse a catalog document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(format!("Invalid catalog: {e}")))
    }

    /// Entry for a stream
    pub fn get(&self, stream: &str) -> Option<&CatalogEntry> {
        self.streams.iter().find(|e| e.tap_stream_id == stream)
    }

    /// Names of the streams to sync.
    ///
    /// A stream absent from this catalog, or present without a selection
    /// flag, keeps its default. Entries naming unknown streams are ignored.
    pub fn selected_streams(&self, streams: &StreamCatalog) -> Vec<String> {
        for entry in &self.streams {
            if streams.get(&entry.tap_stream_id).is_none() {
                warn!(stream = %entry.tap_stream_id, "Catalog names an unknown stream, ignoring");
            }
        }

        streams
            .iter()
            .filter(|stream| {
                let selected = self
                    .get(stream.name())
                    .and_then(CatalogEntry::selection)
                    .unwrap_or_else(|| stream.selected_by_default());
                if !selected {
                    debug!(stream = stream.name(), "Stream not selected");
                }
                selected
            })
            .map(|stream| stream.name().to_string())
            .collect()
    }

    /// Fields to drop from the records of each known stream.
    ///
    /// Primary key and replication key fields are kept even when the
    /// catalog deselects them. Streams with nothing to drop are left out.
    pub fn deselected_fields(&self, streams: &StreamCatalog) -> DeselectedFields {
        streams
            .iter()
            .filter_map(|stream| {
                let entry = self.get(stream.name())?;
                let mut fields = entry.deselected_properties();
                fields.retain(|field| {
                    !stream.primary_key().contains(field)
                        && stream.replication_key() != Some(field.as_str())
                });
                if fields.is_empty() {
                    return None;
                }
                debug!(stream = stream.name(), ?fields, "Fields not selected");
                Some((stream.name().to_string(), fields))
            })
            .collect()
    }

    /// Serialize as pretty JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
