//! Path template interpolation
//!
//! Child stream paths embed `{placeholder}` names (`v1/users/{user_id}`)
//! that are filled from the parent's context when the request is built.

use crate::error::{Error, Result};
use crate::types::ContextMap;
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching placeholders: {name}
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\}").unwrap());

/// Render a template string with the given context.
///
/// Every placeholder must resolve; all unresolved names are reported
/// together in one [`Error::UndefinedVariable`].
pub fn render(template: &str, ctx: &ContextMap) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = PLACEHOLDER_REGEX.replace_all(template, |cap: &Captures<'_>| {
        let name = &cap[1];
        match ctx.get(name) {
            Some(value) => value_to_string(value),
            None => {
                missing.push(name.to_string());
                cap[0].to_string()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Check if a string contains placeholders
pub fn has_templates(s: &str) -> bool {
    PLACEHOLDER_REGEX.is_match(s)
}

/// Extract all placeholder names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Convert a JSON value to a string for template substitution
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // For complex types, use JSON serialization
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(pairs: &[(&str, Value)]) -> ContextMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_numeric_substitution() {
        let result = render("v1/users/{user_id}", &ctx(&[("user_id", json!(42))])).unwrap();
        assert_eq!(result, "v1/users/42");
    }

    #[test]
    fn test_string_substitution() {
        let result = render("v1/tags/{ tag_id }", &ctx(&[("tag_id", json!("abc"))])).unwrap();
        assert_eq!(result, "v1/tags/abc");
    }

    #[test]
    fn test_undefined_variable() {
        let err = render("v1/calls/{call_id}", &ContextMap::new()).unwrap_err();
        match err {
            Error::UndefinedVariable { variable } => assert_eq!(variable, "call_id"),
            other => panic!("expected UndefinedVariable, got {other:?}"),
        }
    }

    #[test]
    fn test_all_missing_names_reported() {
        let err = render("{a}/{b}", &ContextMap::new()).unwrap_err();
        assert!(err.to_string().contains("a, b"));
    }

    #[test]
    fn test_no_templates() {
        assert_eq!(render("v1/calls", &ContextMap::new()).unwrap(), "v1/calls");
    }

    #[test]
    fn test_has_templates() {
        assert!(has_templates("v1/users/{user_id}"));
        assert!(!has_templates("v1/users"));
        assert!(!has_templates("{not valid}"));
    }

    #[test]
    fn test_extract_variables() {
        let vars = extract_variables("v1/{team_id}/users/{user_id}");
        assert_eq!(vars, vec!["team_id", "user_id"]);
    }
}
