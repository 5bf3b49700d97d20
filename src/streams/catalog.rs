//! The fixed set of Aircall streams

use super::definition::StreamDefinition;
use super::schemas::{call_schema, contact_schema, number_schema, tag_schema, team_schema, user_schema};
use crate::error::{Error, Result};
use crate::partition::StatePartitioning;
use crate::partition::StreamGraph;
use std::collections::HashMap;

/// Base URL of the Aircall public API
pub const API_BASE_URL: &str = "https://api.aircall.io/";

/// Call fields reported as Unix epochs
const CALL_DATETIME_FIELDS: [&str; 3] = ["started_at", "answered_at", "ended_at"];

/// Stream definitions together with their validated dependency graph
#[derive(Debug, Clone)]
pub struct StreamCatalog {
    streams: Vec<StreamDefinition>,
    index: HashMap<String, usize>,
    graph: StreamGraph,
}

impl StreamCatalog {
    /// Build a catalog, validating the parent/child wiring
    pub fn new(streams: Vec<StreamDefinition>) -> Result<Self> {
        let graph = StreamGraph::new(
            streams
                .iter()
                .map(|s| (s.name(), s.parent().map(|p| p.stream.as_str()))),
        )?;
        let index = streams
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name().to_string(), i))
            .collect();
        Ok(Self {
            streams,
            index,
            graph,
        })
    }

    /// All Aircall streams
    pub fn aircall() -> Result<Self> {
        Self::new(aircall_streams()?)
    }

    /// Look up a stream
    pub fn get(&self, name: &str) -> Option<&StreamDefinition> {
        self.index.get(name).map(|&i| &self.streams[i])
    }

    /// Look up a stream that must exist
    pub fn require(&self, name: &str) -> Result<&StreamDefinition> {
        self.get(name).ok_or_else(|| Error::StreamNotFound {
            stream: name.to_string(),
        })
    }

    /// Streams in definition order
    pub fn iter(&self) -> impl Iterator<Item = &StreamDefinition> {
        self.streams.iter()
    }

    /// Stream names in definition order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.streams.iter().map(StreamDefinition::name)
    }

    /// Streams without a parent
    pub fn roots(&self) -> impl Iterator<Item = &StreamDefinition> {
        self.graph.roots().filter_map(|name| self.get(name))
    }

    /// Direct children of a stream
    pub fn children(&self, name: &str) -> impl Iterator<Item = &StreamDefinition> {
        self.graph.children(name).filter_map(|child| self.get(child))
    }

    /// The dependency graph
    pub fn graph(&self) -> &StreamGraph {
        &self.graph
    }

    /// Number of streams
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

/// Definitions of the six collections and their detail streams.
///
/// Detail streams read a single object (`$.user`) and never bookmark. Only
/// `number` among them is synced unless a catalog selects the others.
pub fn aircall_streams() -> Result<Vec<StreamDefinition>> {
    Ok(vec![
        StreamDefinition::builder("calls", "v1/calls")
            .record_path("$.calls[*]")
            .replication_key("started_at")
            .datetime_fields(CALL_DATETIME_FIELDS)
            .schema(call_schema())
            .build()?,
        StreamDefinition::builder("call", "v1/calls/{call_id}")
            .record_path("$.call")
            .datetime_fields(CALL_DATETIME_FIELDS)
            .parent_id("calls", "call_id")
            .schema(call_schema())
            .disabled_by_default()
            .build()?,
        StreamDefinition::builder("users", "v1/users")
            .record_path("$.users[*]")
            .replication_key("created_at")
            .schema(user_schema())
            .build()?,
        StreamDefinition::builder("user", "v1/users/{user_id}")
            .record_path("$.user")
            .parent_id("users", "user_id")
            .schema(user_schema())
            .disabled_by_default()
            .build()?,
        StreamDefinition::builder("teams", "v1/teams")
            .record_path("$.teams[*]")
            .schema(team_schema())
            .build()?,
        StreamDefinition::builder("team", "v1/teams/{team_id}")
            .record_path("$.team")
            .parent_id("teams", "team_id")
            .schema(team_schema())
            .disabled_by_default()
            .build()?,
        StreamDefinition::builder("numbers", "v1/numbers")
            .record_path("$.numbers[*]")
            .replication_key("created_at")
            .schema(number_schema())
            .build()?,
        StreamDefinition::builder("number", "v1/numbers/{number_id}")
            .record_path("$.number")
            .parent_id("numbers", "number_id")
            .state_partitioning(StatePartitioning::Disabled)
            .schema(number_schema())
            .build()?,
        StreamDefinition::builder("contacts", "v1/contacts")
            .record_path("$.contacts[*]")
            .replication_key("created_at")
            .schema(contact_schema())
            .build()?,
        StreamDefinition::builder("contact", "v1/contacts/{contact_id}")
            .record_path("$.contact")
            .parent_id("contacts", "contact_id")
            .schema(contact_schema())
            .disabled_by_default()
            .build()?,
        StreamDefinition::builder("tags", "v1/tags")
            .record_path("$.tags[*]")
            .schema(tag_schema())
            .build()?,
        StreamDefinition::builder("tag", "v1/tags/{tag_id}")
            .record_path("$.tag")
            .parent_id("tags", "tag_id")
            .schema(tag_schema())
            .disabled_by_default()
            .build()?,
    ])
}
