//! Typed JSON path expressions
//!
//! A deliberately small subset of JSONPath: the root `$`, named children
//! (`.calls`, `['calls']`), array indices (`[0]`) and wildcards (`[*]`,
//! `.*`, `.[*]`). Evaluation is lazy and borrows from the document; a path
//! that matches nothing yields an empty iterator.

use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Member of an object
    Child(String),
    /// Element of an array
    Index(usize),
    /// Every element of an array, or every member value of an object
    Wildcard,
}

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    raw: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Parse a path expression
    pub fn parse(expr: &str) -> Result<Self> {
        let trimmed = expr.trim();
        let body = match trimmed.strip_prefix('$') {
            Some(rest) => rest,
            None if trimmed.is_empty() => {
                return Err(Error::json_path("empty path expression"));
            }
            // Bare "calls[*]" is read as "$.calls[*]"
            None => {
                return Self::parse(&format!("$.{trimmed}"));
            }
        };

        let chars: Vec<char> = body.chars().collect();
        let mut segments = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '.' => {
                    i += 1;
                    match chars.get(i) {
                        // "$.meta.[*]" style: the dot is only a separator
                        Some('[') => {}
                        Some('*') => {
                            segments.push(Segment::Wildcard);
                            i += 1;
                        }
                        Some(_) => {
                            let start = i;
                            while i < chars.len() && chars[i] != '.' && chars[i] != '[' {
                                i += 1;
                            }
                            let name: String = chars[start..i].iter().collect();
                            segments.push(Segment::Child(name));
                        }
                        None => {
                            return Err(Error::json_path(format!(
                                "'{expr}' ends with a dangling '.'"
                            )));
                        }
                    }
                }
                '[' => {
                    let close = chars[i..]
                        .iter()
                        .position(|c| *c == ']')
                        .map(|offset| i + offset)
                        .ok_or_else(|| Error::json_path(format!("unclosed '[' in '{expr}'")))?;
                    let inner: String = chars[i + 1..close].iter().collect();
                    segments.push(parse_bracket(inner.trim(), expr)?);
                    i = close + 1;
                }
                other => {
                    return Err(Error::json_path(format!(
                        "unexpected '{other}' at position {} in '{expr}'",
                        i + 1
                    )));
                }
            }
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    /// Build a path from already-parsed segments
    pub fn from_segments(raw: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            raw: raw.into(),
            segments,
        }
    }

    /// The parsed segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The expression as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Lazily evaluate the path against a document
    pub fn find<'a>(&'a self, root: &'a Value) -> Matches<'a> {
        Matches {
            segments: &self.segments,
            stack: vec![Frame {
                depth: 0,
                candidates: Candidates::One(Some(root)),
            }],
        }
    }

    /// First match, if any
    pub fn first<'a>(&'a self, root: &'a Value) -> Option<&'a Value> {
        self.find(root).next()
    }
}

impl FromStr for JsonPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_bracket(inner: &str, expr: &str) -> Result<Segment> {
    if inner == "*" {
        return Ok(Segment::Wildcard);
    }
    if let Ok(index) = inner.parse::<usize>() {
        return Ok(Segment::Index(index));
    }
    let quoted = inner
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')));
    match quoted {
        Some(name) if !name.is_empty() => Ok(Segment::Child(name.to_string())),
        _ => Err(Error::json_path(format!(
            "unsupported selector '[{inner}]' in '{expr}'"
        ))),
    }
}

/// Values still to be visited at one depth
enum Candidates<'a> {
    One(Option<&'a Value>),
    Array(std::slice::Iter<'a, Value>),
    Object(serde_json::map::Values<'a>),
}

impl<'a> Iterator for Candidates<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Candidates::One(value) => value.take(),
            Candidates::Array(iter) => iter.next(),
            Candidates::Object(iter) => iter.next(),
        }
    }
}

struct Frame<'a> {
    depth: usize,
    candidates: Candidates<'a>,
}

/// Lazy, depth-first iterator over the values a path selects, in document order
pub struct Matches<'a> {
    segments: &'a [Segment],
    stack: Vec<Frame<'a>>,
}

impl<'a> Iterator for Matches<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let depth = frame.depth;
            let Some(value) = frame.candidates.next() else {
                self.stack.pop();
                continue;
            };

            let Some(segment) = self.segments.get(depth) else {
                return Some(value);
            };

            let candidates = match (segment, value) {
                (Segment::Child(name), Value::Object(map)) => Candidates::One(map.get(name)),
                (Segment::Index(index), Value::Array(items)) => Candidates::One(items.get(*index)),
                (Segment::Wildcard, Value::Array(items)) => Candidates::Array(items.iter()),
                (Segment::Wildcard, Value::Object(map)) => Candidates::Object(map.values()),
                _ => continue,
            };

            self.stack.push(Frame {
                depth: depth + 1,
                candidates,
            });
        }
    }
}
