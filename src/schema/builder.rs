//! Declarative schema construction

use super::types::{JsonSchema, SchemaProperty};
use std::collections::BTreeMap;

/// Ordered list of named properties, built up one call at a time.
///
/// Optional properties accept `null`; required ones do not.
///
/// ```
/// use tap_aircall::schema::{PropertiesList, SchemaProperty};
///
/// let schema = PropertiesList::new()
///     .required("id", SchemaProperty::integer(), "Unique identifier for the Tag.")
///     .property("name", SchemaProperty::string(), "Tag's name.")
///     .build();
/// assert!(schema.is_required("id"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertiesList {
    properties: BTreeMap<String, SchemaProperty>,
    required: Vec<String>,
}

impl PropertiesList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an optional property
    #[must_use]
    pub fn property(mut self, name: &str, property: SchemaProperty, description: &str) -> Self {
        self.properties
            .insert(name.to_string(), property.with_description(description));
        self
    }

    /// Add a required, non-null property
    #[must_use]
    pub fn required(mut self, name: &str, property: SchemaProperty, description: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            property.not_null().with_description(description),
        );
        self.required.push(name.to_string());
        self
    }

    /// Add an optional property without a description
    #[must_use]
    pub fn undocumented(mut self, name: &str, property: SchemaProperty) -> Self {
        self.properties.insert(name.to_string(), property);
        self
    }

    /// Finish as a top-level schema
    pub fn build(self) -> JsonSchema {
        let mut schema = JsonSchema::new();
        schema.properties = self.properties;
        schema.required = self.required;
        schema
    }

    /// Finish as a nullable nested object
    pub fn into_object(self) -> SchemaProperty {
        SchemaProperty::object(self.properties, self.required)
    }
}
