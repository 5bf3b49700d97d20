//! Schema types
//!
//! A typed subset of JSON Schema draft 7, serialized the way Singer taps
//! publish stream schemas.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON Schema type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonType::String => write!(f, "string"),
            JsonType::Number => write!(f, "number"),
            JsonType::Integer => write!(f, "integer"),
            JsonType::Boolean => write!(f, "boolean"),
            JsonType::Object => write!(f, "object"),
            JsonType::Array => write!(f, "array"),
            JsonType::Null => write!(f, "null"),
        }
    }
}

/// JSON type can be a single type or array of types (for nullable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonTypeOrArray {
    Single(JsonType),
    Multiple(Vec<JsonType>),
}

impl JsonTypeOrArray {
    /// Create a single type
    pub fn single(t: JsonType) -> Self {
        JsonTypeOrArray::Single(t)
    }

    /// Create a nullable type
    pub fn nullable(t: JsonType) -> Self {
        if t == JsonType::Null {
            JsonTypeOrArray::Single(JsonType::Null)
        } else {
            JsonTypeOrArray::Multiple(vec![t, JsonType::Null])
        }
    }

    /// Check if this type is nullable
    pub fn is_nullable(&self) -> bool {
        match self {
            JsonTypeOrArray::Single(JsonType::Null) => true,
            JsonTypeOrArray::Multiple(types) => types.contains(&JsonType::Null),
            _ => false,
        }
    }

    /// Get the primary (non-null) type
    pub fn primary_type(&self) -> Option<JsonType> {
        match self {
            JsonTypeOrArray::Single(t) => Some(*t),
            JsonTypeOrArray::Multiple(types) => {
                types.iter().copied().find(|t| *t != JsonType::Null)
            }
        }
    }

    /// The same type without `null`
    pub fn non_null(&self) -> Self {
        match self.primary_type() {
            Some(t) => JsonTypeOrArray::Single(t),
            None => JsonTypeOrArray::Single(JsonType::Null),
        }
    }
}

/// JSON Schema property definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    /// Property type(s)
    #[serde(rename = "type")]
    pub json_type: JsonTypeOrArray,

    /// Description (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Format hint (e.g., "date-time", "email")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Nested properties (for objects)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaProperty>>,

    /// Required nested properties (for objects)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Array items schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaProperty>>,
}

impl SchemaProperty {
    /// Create a new property with the given type
    pub fn new(json_type: JsonType) -> Self {
        Self {
            json_type: JsonTypeOrArray::single(json_type),
            description: None,
            format: None,
            properties: None,
            required: Vec::new(),
            items: None,
        }
    }

    /// Create a nullable property
    pub fn nullable(json_type: JsonType) -> Self {
        Self {
            json_type: JsonTypeOrArray::nullable(json_type),
            ..Self::new(json_type)
        }
    }

    /// Nullable string
    pub fn string() -> Self {
        Self::nullable(JsonType::String)
    }

    /// Nullable integer
    pub fn integer() -> Self {
        Self::nullable(JsonType::Integer)
    }

    /// Nullable boolean
    pub fn boolean() -> Self {
        Self::nullable(JsonType::Boolean)
    }

    /// Nullable RFC 3339 timestamp string
    pub fn datetime() -> Self {
        Self::string().with_format("date-time")
    }

    /// Nullable email address string
    pub fn email() -> Self {
        Self::string().with_format("email")
    }

    /// Create a nullable object property with nested properties
    pub fn object(properties: BTreeMap<String, SchemaProperty>, required: Vec<String>) -> Self {
        Self {
            properties: Some(properties),
            required,
            ..Self::nullable(JsonType::Object)
        }
    }

    /// Create a nullable array property with item schema
    pub fn array(items: SchemaProperty) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::nullable(JsonType::Array)
        }
    }

    /// Set format hint
    #[must_use]
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Set description
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Drop `null` from the accepted types
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.json_type = self.json_type.non_null();
        self
    }

    /// Check if nullable
    pub fn is_nullable(&self) -> bool {
        self.json_type.is_nullable()
    }
}

/// Full JSON Schema document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema {
    /// Schema type (always "object" for top-level)
    #[serde(rename = "type")]
    pub json_type: JsonType,

    /// Object properties
    #[serde(default)]
    pub properties: BTreeMap<String, SchemaProperty>,

    /// Required properties
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl Default for JsonSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSchema {
    /// Create a new empty schema
    pub fn new() -> Self {
        Self {
            json_type: JsonType::Object,
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    /// Check if a property is required
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|n| n == name)
    }

    /// Get a property
    pub fn get_property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.get(name)
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Convert to pretty JSON string
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Use this schema as a nested, nullable object property
    pub fn into_property(self) -> SchemaProperty {
        SchemaProperty::object(self.properties, self.required)
    }
}
