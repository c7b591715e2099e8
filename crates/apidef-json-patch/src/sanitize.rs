//! Content-safety screening for values written into a document.
//!
//! Every string reachable from a written value, recursively through arrays
//! and objects, is checked for script-like markup. The first offending
//! string aborts the whole patch.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn unsafe_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // Script tags, with or without attributes.
            r"(?i)<\s*script",
            // Event-handler attributes inside a tag: <img onerror=...>
            r"(?i)<[^>]*\bon[a-z]+\s*=",
            // javascript: URLs.
            r"(?i)javascript\s*:",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("hardcoded pattern must compile"))
        .collect()
    })
}

/// Returns the first unsafe string fragment found anywhere inside `value`,
/// or `None` when the value is clean.
pub fn find_unsafe(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => {
            if unsafe_patterns().iter().any(|re| re.is_match(s)) {
                Some(s)
            } else {
                None
            }
        }
        Value::Array(arr) => arr.iter().find_map(find_unsafe),
        Value::Object(map) => map.values().find_map(find_unsafe),
        _ => None,
    }
}
