//! JSON decoder
//!
//! Every Aircall listing wraps its rows in an envelope such as
//! `{"calls": [...], "meta": {...}}`; detail endpoints return a single object
//! under a singular key (`{"call": {...}}`).

use super::path::{JsonPath, Matches, Segment};
use crate::error::{Error, Result};
use crate::types::Record;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::info;

/// Path of the pagination/metadata section of a response
static META_PATH: LazyLock<JsonPath> = LazyLock::new(|| {
    JsonPath::from_segments(
        "$.meta.[*]",
        vec![Segment::Child("meta".to_string()), Segment::Wildcard],
    )
});

/// JSON decoder that extracts records at a path
#[derive(Debug, Clone)]
pub struct JsonDecoder {
    /// Where the records live in the envelope
    record_path: JsonPath,
}

impl JsonDecoder {
    /// Create a JSON decoder with a record path
    pub fn new(record_path: JsonPath) -> Self {
        Self { record_path }
    }

    /// Create a JSON decoder from a path expression
    pub fn with_path(expr: &str) -> Result<Self> {
        Ok(Self::new(JsonPath::parse(expr)?))
    }

    /// The record path
    pub fn record_path(&self) -> &JsonPath {
        &self.record_path
    }

    /// Log the values found under `meta`, if the page carries one
    fn log_meta(&self, page: &Value) {
        let meta: Vec<&Value> = META_PATH.find(page).collect();
        if !meta.is_empty() {
            info!("meta: {meta:?}");
        }
    }

    /// Records of one page
    pub fn decode_page<'a>(&'a self, page: &'a Value) -> Records<'a> {
        self.log_meta(page);
        Records {
            path: &self.record_path,
            matches: self.record_path.find(page),
        }
    }
}

/// Lazy iterator over the records of one page
pub struct Records<'a> {
    path: &'a JsonPath,
    matches: Matches<'a>,
}

impl Iterator for Records<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.matches.next()?;
        Some(match value {
            Value::Object(map) => Ok(map.clone()),
            other => Err(Error::extraction(
                self.path.as_str(),
                format!("expected an object, found {}", type_name(other)),
            )),
        })
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
