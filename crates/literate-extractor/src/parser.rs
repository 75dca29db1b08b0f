//! Parse LLM output into extracted objects
//!
//! Validation is all-or-nothing: one malformed object rejects the whole
//! response.

use crate::error::ExtractorError;
use crate::prompt::PLACEHOLDER_MARKERS;
use literate_domain::{ExtractedObject, Relationship};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Maximum characters in an object name or relationship target
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum characters in an object description
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Maximum characters in a relationship description
pub const MAX_RELATIONSHIP_DESCRIPTION_LENGTH: usize = 200;

/// Parse an LLM response of the form `{"objects": [...]}`
///
/// Later objects whose name matches an earlier one (after trim and case
/// folding) are dropped.
pub fn parse_llm_response(response: &str) -> Result<Vec<ExtractedObject>, ExtractorError> {
    let json_str = strip_code_fence(response);
    if json_str.is_empty() {
        return Err(ExtractorError::InvalidFormat("Empty response".to_string()));
    }

    if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| json_str.contains(**m)) {
        return Err(ExtractorError::InvalidFormat(format!(
            "Response echoes the prompt template ({})",
            marker
        )));
    }

    let json: Value = serde_json::from_str(json_str)?;

    let root = json
        .as_object()
        .ok_or_else(|| ExtractorError::InvalidFormat("Expected a JSON object".to_string()))?;

    let objects_array = root
        .get("objects")
        .ok_or_else(|| ExtractorError::InvalidFormat("Missing 'objects' field".to_string()))?
        .as_array()
        .ok_or_else(|| ExtractorError::InvalidFormat("'objects' must be an array".to_string()))?;

    let mut seen = HashSet::new();
    let mut objects = Vec::with_capacity(objects_array.len());
    for (idx, object_json) in objects_array.iter().enumerate() {
        let object = parse_object_json(object_json)
            .map_err(|e| ExtractorError::InvalidFormat(format!("Object {}: {}", idx, e)))?;

        if !seen.insert(object.identity().key().to_string()) {
            warn!("Dropping duplicate object '{}' at index {}", object.name, idx);
            continue;
        }
        objects.push(object);
    }

    debug!("Parsed {} objects", objects.len());
    Ok(objects)
}

/// Strip a surrounding markdown code block, with or without a language tag
fn strip_code_fence(response: &str) -> &str {
    let mut text = response.trim();

    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Parse a single object from JSON
fn parse_object_json(json: &Value) -> Result<ExtractedObject, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "must be a JSON object".to_string())?;

    let name = required_str(obj, "name")?;
    if name.trim().is_empty() {
        return Err("'name' must be a non-empty string".to_string());
    }
    check_length("name", name, MAX_NAME_LENGTH)?;

    let description = match obj.get("description") {
        None | Some(Value::Null) => "",
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err("'description' must be a string".to_string()),
    };
    check_length("description", description, MAX_DESCRIPTION_LENGTH)?;

    let relationships = match obj.get("relationships") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(j, rel)| {
                parse_relationship_json(rel).map_err(|e| format!("relationship {}: {}", j, e))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err("'relationships' must be an array".to_string()),
    };

    Ok(ExtractedObject {
        name: name.to_string(),
        description: description.to_string(),
        relationships,
    })
}

/// Parse a single `{target, description}` pair
fn parse_relationship_json(json: &Value) -> Result<Relationship, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "must be a JSON object".to_string())?;

    let target = required_str(obj, "target")?;
    if target.trim().is_empty() {
        return Err("'target' must be a non-empty string".to_string());
    }
    check_length("target", target, MAX_NAME_LENGTH)?;

    let description = required_str(obj, "description")?;
    check_length("description", description, MAX_RELATIONSHIP_DESCRIPTION_LENGTH)?;

    Ok(Relationship::new(target, description))
}

fn required_str<'v>(obj: &'v Map<String, Value>, field: &str) -> Result<&'v str, String> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing or invalid '{}'", field))
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len > max {
        return Err(format!("'{}' too long ({} chars, max {})", field, len, max));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let response = r#"{
            "objects": [
                {
                    "name": "Alice",
                    "description": "A curious girl",
                    "relationships": [{"target": "Bob", "description": "friend"}]
                },
                {"name": "Bob", "description": "A baker"}
            ]
        }"#;

        let objects = parse_llm_response(response).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name, "Alice");
        assert_eq!(objects[0].relationships, vec![Relationship::new("Bob", "friend")]);
        assert_eq!(objects[1].name, "Bob");
        assert!(objects[1].relationships.is_empty());
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = "```json\n{\"objects\": [{\"name\": \"Charlie\", \"description\": \"A cat\"}]}\n```";
        let objects = parse_llm_response(response).unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name, "Charlie");
    }

    #[test]
    fn test_strip_code_fence_without_language() {
        assert_eq!(strip_code_fence("```\n{\"objects\": []}\n```"), "{\"objects\": []}");
        assert_eq!(strip_code_fence("  {\"objects\": []}  "), "{\"objects\": []}");
    }

    #[test]
    fn test_parse_empty_objects() {
        let objects = parse_llm_response(r#"{"objects": []}"#).unwrap();
        assert!(objects.is_empty());
    }

    #[test]
    fn test_description_is_optional() {
        let objects = parse_llm_response(r#"{"objects": [{"name": "Alice"}]}"#).unwrap();
        assert_eq!(objects[0].description, "");
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_llm_response("This is not JSON");
        assert!(matches!(result, Err(ExtractorError::JsonParse(_))));
    }

    #[test]
    fn test_parse_empty_response() {
        let result = parse_llm_response("   ");
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_top_level_array_rejected() {
        let result = parse_llm_response(r#"[{"name": "Alice"}]"#);
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_missing_objects_field() {
        let result = parse_llm_response(r#"{"items": []}"#);
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_missing_name_rejects_whole_response() {
        let response = r#"{"objects": [
            {"name": "Alice", "description": "ok"},
            {"description": "nameless"}
        ]}"#;
        match parse_llm_response(response) {
            Err(ExtractorError::InvalidFormat(msg)) => assert!(msg.starts_with("Object 1:")),
            other => panic!("Expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_name_rejected() {
        let result = parse_llm_response(r#"{"objects": [{"name": "   "}]}"#);
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_wrong_types_rejected() {
        for response in [
            r#"{"objects": [{"name": 42}]}"#,
            r#"{"objects": [{"name": "A", "description": 3}]}"#,
            r#"{"objects": [{"name": "A", "relationships": "Bob"}]}"#,
            r#"{"objects": [{"name": "A", "relationships": [{"target": "B"}]}]}"#,
            r#"{"objects": [{"name": "A", "relationships": [{"target": "", "description": "x"}]}]}"#,
            r#"{"objects": ["Alice"]}"#,
        ] {
            assert!(
                matches!(parse_llm_response(response), Err(ExtractorError::InvalidFormat(_))),
                "accepted: {}",
                response
            );
        }
    }

    #[test]
    fn test_length_limits() {
        let long_name = "n".repeat(MAX_NAME_LENGTH + 1);
        let response = format!(r#"{{"objects": [{{"name": "{}"}}]}}"#, long_name);
        assert!(parse_llm_response(&response).is_err());

        let long_desc = "d".repeat(MAX_DESCRIPTION_LENGTH + 1);
        let response = format!(r#"{{"objects": [{{"name": "A", "description": "{}"}}]}}"#, long_desc);
        assert!(parse_llm_response(&response).is_err());

        let long_rel = "r".repeat(MAX_RELATIONSHIP_DESCRIPTION_LENGTH + 1);
        let response = format!(
            r#"{{"objects": [{{"name": "A", "relationships": [{{"target": "B", "description": "{}"}}]}}]}}"#,
            long_rel
        );
        assert!(parse_llm_response(&response).is_err());

        let at_limit = "é".repeat(MAX_NAME_LENGTH);
        let response = format!(r#"{{"objects": [{{"name": "{}"}}]}}"#, at_limit);
        assert!(parse_llm_response(&response).is_ok());
    }

    #[test]
    fn test_duplicate_names_first_wins() {
        let response = r#"{"objects": [
            {"name": "Bob", "description": "first"},
            {"name": " bob ", "description": "second"},
            {"name": "Alice", "description": "third"}
        ]}"#;
        let objects = parse_llm_response(response).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].description, "first");
        assert_eq!(objects[1].name, "Alice");
    }

    #[test]
    fn test_placeholder_echo_rejected() {
        let response = r#"{"objects": [{"name": "string", "description": "string", "relationships": []}]}"#;
        match parse_llm_response(response) {
            Err(ExtractorError::InvalidFormat(msg)) => assert!(msg.contains("template")),
            other => panic!("Expected InvalidFormat, got {:?}", other),
        }
    }
}
