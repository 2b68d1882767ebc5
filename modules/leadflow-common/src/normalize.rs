//! Field canonicalizers for loosely-typed upstream payloads.
//!
//! Every function here is total: upstream shapes are not contractually
//! guaranteed, and a malformed field must never abort a batch. Unparsable
//! input yields `None` (field omitted), never an error.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

/// Trim a string, returning `None` when nothing remains.
pub fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Canonicalize a URL field that some sources emit as a plain string and
/// others as the textual rendering of a single-element array
/// (`"['https://...']"`). Takes the first string element of the array form;
/// array-looking input that fails to parse passes through as-is.
pub fn url_or_first(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        if let Some(values) = parse_loose_array(trimmed) {
            return values
                .iter()
                .find_map(|v| v.as_str())
                .and_then(non_empty);
        }
        // Unparsable array-looking input: pass through untouched.
    }

    Some(trimmed.to_string())
}

/// Extract a canonical domain from a bare domain, a "www."-prefixed domain,
/// or a full URL: lowercase host with a leading "www." stripped. Never
/// errors on invalid URLs; falls back to pattern extraction.
pub fn extract_domain(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    if let Ok(parsed) = Url::parse(&candidate) {
        if let Some(host) = parsed.host_str() {
            return Some(strip_www(&host.to_lowercase()));
        }
    }

    // Url couldn't make sense of it (spaces, stray characters). Grab the
    // first host-looking token instead.
    static HOST_RE: OnceLock<Regex> = OnceLock::new();
    let re = HOST_RE.get_or_init(|| {
        Regex::new(r"(?i)(?:[a-z][a-z0-9+.-]*://)?(?:www\.)?([a-z0-9][a-z0-9.-]*\.[a-z]{2,})")
            .expect("host regex is valid")
    });
    re.captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| strip_www(&m.as_str().to_lowercase()))
}

/// Parse a field that is either a textual array of strings or a single
/// plain string, into a non-empty list of trimmed strings.
pub fn string_list(raw: &str) -> Option<Vec<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        if let Some(values) = parse_loose_array(trimmed) {
            let items: Vec<String> = values
                .iter()
                .filter_map(|v| v.as_str())
                .filter_map(non_empty)
                .collect();
            return if items.is_empty() { None } else { Some(items) };
        }
    }

    Some(vec![trimmed.to_string()])
}

/// Coerce a numeric-or-string year field.
pub fn year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

/// Coerce a boolean-or-string flag field.
pub fn boolish(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Coerce a string-or-number field (size bands, external ids) into a string.
pub fn string_like(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Canonicalize a URL field that may arrive as a JSON string (possibly an
/// array rendered into a string) or as a real JSON array.
pub fn url_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => url_or_first(s),
        Value::Array(values) => values.iter().find_map(|v| v.as_str()).and_then(non_empty),
        _ => None,
    }
}

/// Exact-match email key: trimmed, lowercased.
pub fn email(raw: &str) -> Option<String> {
    non_empty(raw).map(|e| e.to_lowercase())
}

/// Parse an array-looking string. Tries strict JSON first, then a
/// single-quoted literal form (the most common upstream rendering).
fn parse_loose_array(raw: &str) -> Option<Vec<Value>> {
    if let Ok(Value::Array(values)) = serde_json::from_str::<Value>(raw) {
        return Some(values);
    }
    let requoted = raw.replace('\'', "\"");
    if let Ok(Value::Array(values)) = serde_json::from_str::<Value>(&requoted) {
        return Some(values);
    }
    None
}

fn strip_www(host: &str) -> String {
    host.strip_prefix("www.").unwrap_or(host).to_string()
}
