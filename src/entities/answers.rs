//! Checklist answer maps with read-repair parsing
//!
//! Answer blobs are stored loosely typed: historical rows hold nulls,
//! JSON-encoded strings, or structured maps. Every read goes through
//! [`parse_answer_map`], which repairs whatever it finds into a
//! well-formed mapping. A corrupt blob must never block rendering a
//! report, so parse failures fall open to an empty map.

use std::collections::BTreeMap;

use crate::entities::FieldError;

/// Question text -> answer ("Yes" / "No" / "N/A")
pub type AnswerMap = BTreeMap<String, String>;

/// The answers accepted for a checklist question
pub const ALLOWED_ANSWERS: [&str; 3] = ["Yes", "No", "N/A"];

/// Normalize a raw stored answer value into a well-formed map.
///
/// - `null` (or anything non-map) becomes an empty map
/// - an object becomes its entries, values stringified
/// - a string is parsed as JSON; parse errors yield an empty map
pub fn parse_answer_map(raw: &serde_json::Value) -> AnswerMap {
    match raw {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect(),
        serde_json::Value::String(s) => {
            if s.trim().is_empty() {
                return AnswerMap::new();
            }
            match serde_json::from_str::<serde_json::Value>(s) {
                Ok(parsed @ serde_json::Value::Object(_)) => parse_answer_map(&parsed),
                _ => AnswerMap::new(),
            }
        }
        _ => AnswerMap::new(),
    }
}

/// Validate that every answer value is one of the allowed strings
pub fn validate_answers(field: &str, map: &AnswerMap) -> Vec<FieldError> {
    map.iter()
        .filter(|(_, v)| !ALLOWED_ANSWERS.contains(&v.as_str()))
        .map(|(q, v)| {
            FieldError::new(
                field,
                format!("answer for '{}' must be Yes, No, or N/A (got '{}')", q, v),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_yields_empty_map() {
        assert!(parse_answer_map(&serde_json::Value::Null).is_empty());
    }

    #[test]
    fn test_structured_map_passes_through() {
        let raw = json!({"Q1": "Yes"});
        let map = parse_answer_map(&raw);
        assert_eq!(map.get("Q1").map(String::as_str), Some("Yes"));
    }

    #[test]
    fn test_string_encoded_json_is_parsed() {
        let raw = json!("{\"Q1\":\"Yes\"}");
        let map = parse_answer_map(&raw);
        assert_eq!(map.get("Q1").map(String::as_str), Some("Yes"));

        let empty = json!("{}");
        assert!(parse_answer_map(&empty).is_empty());
    }

    #[test]
    fn test_corrupt_string_falls_open_to_empty() {
        let raw = json!("{not json at all");
        assert!(parse_answer_map(&raw).is_empty());
    }

    #[test]
    fn test_non_map_values_yield_empty() {
        assert!(parse_answer_map(&json!(42)).is_empty());
        assert!(parse_answer_map(&json!(["Yes"])).is_empty());
    }

    #[test]
    fn test_validate_answers_flags_bad_values() {
        let mut map = AnswerMap::new();
        map.insert("Q1".to_string(), "Yes".to_string());
        map.insert("Q2".to_string(), "Maybe".to_string());

        let errors = validate_answers("checklist_answers", &map);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Q2"));
    }
}
