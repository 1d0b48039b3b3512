// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Decoding of script stdout into a rule result.

use serde_json::{Map, Value};

use crate::context::RuleOutcome;
use crate::errors::{ScriptError, ScriptResult};

/// Decode raw script output.
///
/// A JSON object is taken as-is. Anything else is read as `key: value` lines
/// split at the first colon, with blank lines ignored. Either way the rule
/// discriminator is stamped onto the result.
pub fn decode(raw: &str) -> ScriptResult<RuleOutcome> {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(raw) {
        return Ok(RuleOutcome::completed(fields));
    }

    let mut fields = Map::new();
    for (index, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (key, value) = line.split_once(':').ok_or_else(|| ScriptError::MalformedOutput {
            line_number: index + 1,
            line: line.to_string(),
        })?;
        fields.insert(key.trim().to_string(), Value::String(value.trim_start().to_string()));
    }

    Ok(RuleOutcome::completed(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(outcome: RuleOutcome) -> Value {
        match outcome {
            RuleOutcome::Completed(fields) => Value::Object(fields),
            RuleOutcome::NoResult => panic!("Expected a completed outcome"),
        }
    }

    #[test]
    fn test_key_value_fallback() {
        let outcome = decode("KEY: value\n").unwrap();
        assert_eq!(fields(outcome), json!({"KEY": "value", "type": "rule"}));
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let outcome = decode("url: http://example.com:8080\n\n  error_key : NEEDS_UPDATE\n").unwrap();
        assert_eq!(
            fields(outcome),
            json!({"url": "http://example.com:8080", "error_key": "NEEDS_UPDATE", "type": "rule"})
        );
    }

    #[test]
    fn test_json_object_is_used_directly() {
        let outcome = decode(r#"{"error_key": "IS_FEDORA", "count": 3, "type": "ignored"}"#).unwrap();
        assert_eq!(
            fields(outcome),
            json!({"error_key": "IS_FEDORA", "count": 3, "type": "rule"})
        );
    }

    #[test]
    fn test_non_object_json_falls_back_to_lines() {
        let err = decode("[1, 2, 3]\n").unwrap_err();
        assert!(matches!(err, ScriptError::MalformedOutput { line_number: 1, .. }));
    }

    #[test]
    fn test_line_without_colon_is_malformed() {
        let err = decode("a: 1\njust some text\n").unwrap_err();
        match err {
            ScriptError::MalformedOutput { line_number, line } => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "just some text");
            }
            other => panic!("Expected MalformedOutput, got {:?}", other),
        }
    }
}
