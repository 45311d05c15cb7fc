//! Turning free-form model replies into JSON objects.

use athena_core::{PluginError, Result};
use serde_json::Value;

/// Parse a model reply that should contain one JSON object.
///
/// Accepts a bare value or one wrapped in a ```` ```json ```` fence. A literal
/// `null` or an empty reply yields `Ok(None)`.
pub fn parse_json_object(text: &str) -> Result<Option<Value>> {
    let body = strip_fence(text.trim());
    if body.is_empty() {
        return Ok(None);
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        // Models sometimes wrap the object in prose; take the outermost braces.
        Err(e) => match (body.find('{'), body.rfind('}')) {
            (Some(start), Some(end)) if start < end => serde_json::from_str(&body[start..=end])
                .map_err(|_| PluginError::Generation(format!("reply is not JSON: {e}")))?,
            _ => return Err(PluginError::Generation(format!("reply is not JSON: {e}"))),
        },
    };

    match value {
        Value::Null => Ok(None),
        Value::Object(_) => Ok(Some(value)),
        other => Err(PluginError::Generation(format!(
            "expected a JSON object, got {}",
            kind(&other)
        ))),
    }
}

fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_object() {
        let v = parse_json_object(r#"{"limit": 5}"#).unwrap();
        assert_eq!(v, Some(json!({"limit": 5})));
    }

    #[test]
    fn test_fenced_object() {
        let v = parse_json_object("```json\n{\"coinIds\": \"bitcoin\"}\n```").unwrap();
        assert_eq!(v, Some(json!({"coinIds": "bitcoin"})));
    }

    #[test]
    fn test_null_and_empty_are_none() {
        assert_eq!(parse_json_object("null").unwrap(), None);
        assert_eq!(parse_json_object("```json\nnull\n```").unwrap(), None);
        assert_eq!(parse_json_object("   ").unwrap(), None);
    }

    #[test]
    fn test_object_inside_prose() {
        let v = parse_json_object("Sure! {\"a\": 1} hope that helps").unwrap();
        assert_eq!(v, Some(json!({"a": 1})));
    }

    #[test]
    fn test_non_object_is_error() {
        assert!(parse_json_object("[1, 2]").is_err());
        assert!(parse_json_object("not json at all").is_err());
    }
}
