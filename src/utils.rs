//! Utility functions and helpers for the vote relay

use serde_json::{json, Value};

const LOG_BODY_LIMIT: usize = 256;

/// Parse an upstream body as JSON, wrapping non-JSON text as `{"raw": text}`
pub(crate) fn parse_upstream_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}

/// Shorten a body for a single log line without splitting a character
pub(crate) fn truncate_for_log(text: &str) -> &str {
    if text.len() <= LOG_BODY_LIMIT {
        return text;
    }
    let mut end = LOG_BODY_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Parse `name=pollId,name=pollId` into a pollId -> category map
pub(crate) fn parse_category_map(mapping: &str) -> Option<Vec<(String, String)>> {
    mapping.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (category, poll_id) = pair.split_once('=')?;
            let (category, poll_id) = (category.trim(), poll_id.trim());
            if category.is_empty() || poll_id.is_empty() {
                return None;
            }
            Some((poll_id.to_string(), category.to_string()))
        })
        .collect()
}
