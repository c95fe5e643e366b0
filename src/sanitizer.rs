// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Recovers the JSON object from a model reply
//!
//! Models sometimes wrap the requested JSON in prose or code fences even in
//! JSON mode. The reply is cut from the first `{` to the last `}` and parsed.
//! Braces inside string values can mislead this scan; it is a best-effort
//! heuristic, not a validating parser.

use tracing::debug;

use crate::receipt::Categorization;
use crate::{ReceiptError, Result};

/// Slice from the first opening brace to the last closing brace, inclusive
pub fn extract_json_object(raw: &str) -> Result<&str> {
    let start = raw.find('{').ok_or(ReceiptError::NoJsonObject)?;
    let end = raw.rfind('}').ok_or(ReceiptError::NoJsonObject)?;
    if end < start {
        return Err(ReceiptError::NoJsonObject);
    }
    Ok(&raw[start..=end])
}

/// Extract and parse the categorization from a raw reply
pub fn parse_reply(raw: &str) -> Result<Categorization> {
    let json = extract_json_object(raw)?;
    debug!("Extracted {} of {} reply bytes as JSON", json.len(), raw.len());
    serde_json::from_str(json).map_err(|e| ReceiptError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_with_surrounding_prose() {
        let object = r#"{"items": [{"name": "Milk", "price": 3.50}], "subtotals": {}}"#;
        let raw = format!("Here is the receipt:\n```json\n{}\n```\nLet me know!", object);
        assert_eq!(extract_json_object(&raw).unwrap(), object);
    }

    #[test]
    fn test_extract_bare_object() {
        assert_eq!(extract_json_object("{}").unwrap(), "{}");
    }

    #[test]
    fn test_no_opening_brace() {
        assert!(matches!(
            extract_json_object("sorry, no data }"),
            Err(ReceiptError::NoJsonObject)
        ));
    }

    #[test]
    fn test_no_closing_brace() {
        assert!(matches!(
            extract_json_object("{ \"items\": ["),
            Err(ReceiptError::NoJsonObject)
        ));
    }

    #[test]
    fn test_closing_before_opening() {
        assert!(matches!(extract_json_object("} oops {"), Err(ReceiptError::NoJsonObject)));
    }

    #[test]
    fn test_parse_reply() {
        let raw = r#"Sure! {"items": [{"name": "Oil Filter", "price": 12.99, "category": "Automotive"}],
            "subtotals": {"Automotive": 12.99}, "receipt_total_verified": false} Thanks."#;
        let parsed = parse_reply(raw).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.verified, Some(serde_json::Value::Bool(false)));
    }

    #[test]
    fn test_parse_failure_is_malformed() {
        let err = parse_reply("{ not json }").unwrap_err();
        assert!(matches!(err, ReceiptError::MalformedResponse(_)));
    }

    #[test]
    fn test_reply_shape_mismatch_is_malformed() {
        assert!(matches!(parse_reply("{\"items\": 5}"), Err(ReceiptError::MalformedResponse(_))));
        assert!(parse_reply("{\"items\": []}").is_ok());
    }
}
