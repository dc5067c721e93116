//! Response validation — turns raw provider text into a required-shape object.
//!
//! Structural checks only: the value of a key is never rewritten, so model
//! content passes through untouched. The one repair heuristic (stripping a
//! markdown code fence) lives here and nowhere else.

use serde_json::{Map, Value};

use crate::errors::ValidationError;

/// Parses `raw_text` as a JSON object and confirms every entry of
/// `required_keys` is present and non-null.
///
/// Parse order: trim → direct parse → on parse failure, one repair pass that
/// strips a ```json / ``` fence and re-parses. Anything else fails.
pub fn validate(
    raw_text: &str,
    required_keys: &[&str],
) -> Result<Map<String, Value>, ValidationError> {
    let trimmed = raw_text.trim();

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(parse_err) => {
            let repaired = strip_json_fences(trimmed);
            if repaired == trimmed {
                return Err(ValidationError::MalformedJson(parse_err));
            }
            serde_json::from_str(repaired)?
        }
    };

    let Value::Object(object) = value else {
        return Err(ValidationError::NotAnObject);
    };

    let missing: Vec<String> = required_keys
        .iter()
        .filter(|key| object.get(**key).map_or(true, Value::is_null))
        .map(|key| key.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ValidationError::MissingKeys { keys: missing });
    }

    Ok(object)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: &[&str] = &["analysis_summary", "key_topics"];

    #[test]
    fn test_plain_json_with_all_keys_passes() {
        let raw = r#"{"analysis_summary": "a bakery", "key_topics": ["bread"]}"#;
        let object = validate(raw, KEYS).unwrap();
        assert_eq!(object["analysis_summary"], "a bakery");
    }

    #[test]
    fn test_fenced_json_is_repaired_and_extracted() {
        let raw = "```json\n{\"analysis_summary\": \"a bakery\", \"key_topics\": [\"bread\"]}\n```";
        let object = validate(raw, KEYS).unwrap();
        assert_eq!(object["key_topics"][0], "bread");
    }

    #[test]
    fn test_fence_without_language_tag_is_repaired() {
        let raw = "```\n{\"analysis_summary\": \"x\", \"key_topics\": []}\n```";
        assert!(validate(raw, KEYS).is_ok());
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let raw = "  \n{\"analysis_summary\": \"x\", \"key_topics\": []}\n  ";
        assert!(validate(raw, KEYS).is_ok());
    }

    #[test]
    fn test_missing_key_lists_exactly_what_is_absent() {
        let raw = r#"{"analysis_summary": "a bakery"}"#;
        let err = validate(raw, KEYS).unwrap_err();
        match err {
            ValidationError::MissingKeys { keys } => {
                assert_eq!(keys, vec!["key_topics".to_string()]);
            }
            other => panic!("expected MissingKeys, got {other:?}"),
        }
    }

    #[test]
    fn test_null_key_counts_as_missing() {
        let raw = r#"{"analysis_summary": null, "key_topics": []}"#;
        let err = validate(raw, KEYS).unwrap_err();
        assert!(matches!(err, ValidationError::MissingKeys { .. }));
    }

    #[test]
    fn test_extra_keys_are_tolerated() {
        let raw = r#"{"analysis_summary": "x", "key_topics": [], "confidence": 0.9}"#;
        let object = validate(raw, KEYS).unwrap();
        assert!(object.contains_key("confidence"));
    }

    #[test]
    fn test_garbage_text_is_malformed_json() {
        let err = validate("Sure! Here is the analysis you asked for.", KEYS).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedJson(_)));
    }

    #[test]
    fn test_top_level_array_is_rejected() {
        let err = validate(r#"["not", "an", "object"]"#, KEYS).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnObject));
    }

    #[test]
    fn test_fenced_garbage_still_fails_after_repair() {
        let err = validate("```json\nnot json at all\n```", KEYS).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedJson(_)));
    }

    #[test]
    fn test_values_pass_through_unmodified() {
        let raw = r#"{"analysis_summary": "  padded  ", "key_topics": ["A", "a"]}"#;
        let object = validate(raw, KEYS).unwrap();
        // structural validation only — no trimming or dedup of values
        assert_eq!(object["analysis_summary"], "  padded  ");
        assert_eq!(object["key_topics"].as_array().unwrap().len(), 2);
    }
}
