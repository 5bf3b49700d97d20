//! Stream schemas
//!
//! Typed JSON Schema documents and a small builder used to declare the
//! schema of every stream.

mod builder;
mod types;

pub use builder::PropertiesList;
pub use types::{JsonSchema, JsonType, JsonTypeOrArray, SchemaProperty};
