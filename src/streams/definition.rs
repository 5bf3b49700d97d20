//! Stream definitions

use crate::decode::JsonDecoder;
use crate::error::{Error, Result};
use crate::partition::{ContextMapper, ParentKeyMapper, StatePartitioning};
use crate::schema::JsonSchema;
use crate::template;
use crate::types::ReplicationMethod;
use std::sync::Arc;

/// Link from a child stream to the stream whose records drive it
#[derive(Debug, Clone)]
pub struct ParentLink {
    /// Parent stream name
    pub stream: String,
    /// Builds the child context from one parent record
    pub mapper: Arc<dyn ContextMapper>,
}

/// Immutable description of one stream
#[derive(Debug, Clone)]
pub struct StreamDefinition {
    name: String,
    path: String,
    primary_key: Vec<String>,
    replication_key: Option<String>,
    decoder: JsonDecoder,
    datetime_fields: Vec<String>,
    parent: Option<ParentLink>,
    state_partitioning: StatePartitioning,
    schema: JsonSchema,
    selected_by_default: bool,
}

impl StreamDefinition {
    /// Start building a stream fetched from `path`
    pub fn builder(name: impl Into<String>, path: impl Into<String>) -> StreamDefinitionBuilder {
        StreamDefinitionBuilder {
            name: name.into(),
            path: path.into(),
            primary_key: vec!["id".to_string()],
            replication_key: None,
            record_path: None,
            datetime_fields: Vec::new(),
            parent: None,
            state_partitioning: None,
            schema: JsonSchema::new(),
            selected_by_default: true,
        }
    }

    /// Stream name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Request path, possibly with `{placeholder}`s filled from the context
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Primary key fields
    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// Field used for incremental bookmarks
    pub fn replication_key(&self) -> Option<&str> {
        self.replication_key.as_deref()
    }

    /// How the stream is replicated
    pub fn replication_method(&self) -> ReplicationMethod {
        if self.replication_key.is_some() {
            ReplicationMethod::Incremental
        } else {
            ReplicationMethod::FullTable
        }
    }

    /// Record decoder for this stream's responses
    pub fn decoder(&self) -> &JsonDecoder {
        &self.decoder
    }

    /// Fields holding Unix epochs to rewrite as timestamps
    pub fn datetime_fields(&self) -> &[String] {
        &self.datetime_fields
    }

    /// Parent link, for child streams
    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    /// Bookmark keying policy
    pub fn state_partitioning(&self) -> StatePartitioning {
        self.state_partitioning
    }

    /// Whether this stream reads and writes bookmarks
    pub fn is_bookmarked(&self) -> bool {
        self.replication_key.is_some() && self.state_partitioning.is_enabled()
    }

    /// JSON schema of the records
    pub fn schema(&self) -> &JsonSchema {
        &self.schema
    }

    /// Whether the stream runs when no catalog selects streams explicitly
    pub fn selected_by_default(&self) -> bool {
        self.selected_by_default
    }
}

/// Builder for [`StreamDefinition`]
#[derive(Debug)]
pub struct StreamDefinitionBuilder {
    name: String,
    path: String,
    primary_key: Vec<String>,
    replication_key: Option<String>,
    record_path: Option<String>,
    datetime_fields: Vec<String>,
    parent: Option<ParentLink>,
    state_partitioning: Option<StatePartitioning>,
    schema: JsonSchema,
    selected_by_default: bool,
}

impl StreamDefinitionBuilder {
    /// Path to the records in the response body (defaults to `$.<name>[*]`)
    #[must_use]
    pub fn record_path(mut self, path: impl Into<String>) -> Self {
        self.record_path = Some(path.into());
        self
    }

    /// Primary key fields (defaults to `id`)
    #[must_use]
    pub fn primary_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Field used for incremental bookmarks
    #[must_use]
    pub fn replication_key(mut self, field: impl Into<String>) -> Self {
        self.replication_key = Some(field.into());
        self
    }

    /// Fields holding Unix epochs
    #[must_use]
    pub fn datetime_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datetime_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Fetch once per record of `parent`, with the given context mapping.
    ///
    /// Child streams default to [`StatePartitioning::Disabled`].
    #[must_use]
    pub fn parent(mut self, parent: impl Into<String>, mapper: impl ContextMapper + 'static) -> Self {
        self.parent = Some(ParentLink {
            stream: parent.into(),
            mapper: Arc::new(mapper),
        });
        self
    }

    /// Fetch once per parent record, copying the parent's `id` into `context_key`
    #[must_use]
    pub fn parent_id(self, parent: impl Into<String>, context_key: &str) -> Self {
        self.parent(parent, ParentKeyMapper::id_as(context_key))
    }

    /// Bookmark keying policy
    #[must_use]
    pub fn state_partitioning(mut self, policy: StatePartitioning) -> Self {
        self.state_partitioning = Some(policy);
        self
    }

    /// JSON schema of the records
    #[must_use]
    pub fn schema(mut self, schema: JsonSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Leave the stream out unless a catalog selects it
    #[must_use]
    pub fn disabled_by_default(mut self) -> Self {
        self.selected_by_default = false;
        self
    }

    /// Validate and build the definition
    pub fn build(self) -> Result<StreamDefinition> {
        if self.name.trim().is_empty() {
            return Err(Error::config("stream name must not be empty"));
        }
        if self.primary_key.is_empty() {
            return Err(Error::invalid_value(
                format!("{}.primary_key", self.name),
                "at least one field is required",
            ));
        }
        if let Some(key) = &self.replication_key {
            if !self.schema.properties.is_empty() && self.schema.get_property(key).is_none() {
                return Err(Error::invalid_value(
                    format!("{}.replication_key", self.name),
                    format!("'{key}' is not in the stream schema"),
                ));
            }
        }

        if self.parent.is_none() && template::has_templates(&self.path) {
            return Err(Error::invalid_value(
                format!("{}.path", self.name),
                format!(
                    "placeholders {} need a parent stream to fill them",
                    template::extract_variables(&self.path).join(", ")
                ),
            ));
        }

        let record_path = self
            .record_path
            .unwrap_or_else(|| format!("$.{}[*]", self.name));
        let decoder = JsonDecoder::with_path(&record_path)?;

        let state_partitioning = self.state_partitioning.unwrap_or(if self.parent.is_some() {
            StatePartitioning::Disabled
        } else {
            StatePartitioning::Stream
        });

        Ok(StreamDefinition {
            name: self.name,
            path: self.path,
            primary_key: self.primary_key,
            replication_key: self.replication_key,
            decoder,
            datetime_fields: self.datetime_fields,
            parent: self.parent,
            state_partitioning,
            schema: self.schema,
            selected_by_default: self.selected_by_default,
        })
    }
}
