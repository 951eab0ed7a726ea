//! JSON recovery for model output
//!
//! Hosted models intermittently wrap JSON in code fences, append prose,
//! leave trailing commas, emit smart quotes, or get cut off mid-object.
//! This module recovers a JSON object from such output in escalating steps:
//! direct parse, first-object extraction, lightweight repair, and finally a
//! largest-valid-prefix salvage for truncated output.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

lazy_static! {
    static ref JSON_OBJECT_RE: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
    static ref FENCE_OPEN_RE: Regex = Regex::new(r"^```[a-zA-Z0-9_-]*\n").unwrap();
    static ref FENCE_CLOSE_RE: Regex = Regex::new(r"\n```$").unwrap();
    static ref TRAILING_COMMA_RE: Regex = Regex::new(r",\s*([}\]])").unwrap();
}

#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("model did not return valid JSON. Raw output: {0}")]
    InvalidJson(String),
}

/// Remove ```json ... ``` (or bare ```) fences around the output.
pub fn strip_code_fences(s: &str) -> String {
    let mut t = s.trim().to_string();
    if t.starts_with("```") {
        t = FENCE_OPEN_RE.replace(&t, "").into_owned();
        t = FENCE_CLOSE_RE.replace(&t, "").into_owned();
    }
    t.trim().to_string()
}

fn try_parse_object(s: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Best-effort cleanup for common model JSON issues: fence stripping,
/// first-object extraction, trailing-comma removal, smart-quote
/// normalization.
pub fn repair_best_effort(s: &str) -> String {
    let mut t = strip_code_fences(s);

    if !t.starts_with('{') {
        if let Some(m) = JSON_OBJECT_RE.find(&t) {
            t = m.as_str().to_string();
        }
    }

    let t = TRAILING_COMMA_RE.replace_all(&t, "$1").into_owned();
    let t = t
        .replace('\u{201c}', "\"")
        .replace('\u{201d}', "\"")
        .replace('\u{2019}', "'");

    t.trim().to_string()
}

/// Recover a JSON object from a model response.
///
/// Strategy: strip fences and parse directly; extract the first `{...}`
/// block and parse; apply [`repair_best_effort`] and parse. The error
/// carries the raw output (truncated) for display.
pub fn extract_object(text: &str) -> Result<Map<String, Value>, RecoveryError> {
    let raw = strip_code_fences(text);

    if let Some(obj) = try_parse_object(&raw) {
        return Ok(obj);
    }

    if let Some(m) = JSON_OBJECT_RE.find(&raw) {
        if let Some(obj) = try_parse_object(m.as_str()) {
            return Ok(obj);
        }
    }

    if let Some(obj) = try_parse_object(&repair_best_effort(&raw)) {
        return Ok(obj);
    }

    Err(RecoveryError::InvalidJson(truncate_chars(&raw, 2000)))
}

/// Salvage a valid object from truncated output by parsing the largest
/// prefix that ends at a closing brace.
pub fn largest_valid_prefix(text: &str) -> Option<Map<String, Value>> {
    let mut raw = strip_code_fences(text);

    if !raw.starts_with('{') {
        if let Some(m) = JSON_OBJECT_RE.find(&raw) {
            raw = m.as_str().to_string();
        }
    }

    if let Some(obj) = try_parse_object(&raw) {
        return Some(obj);
    }

    let closers: Vec<usize> = raw
        .bytes()
        .enumerate()
        .filter(|(_, b)| *b == b'}')
        .map(|(i, _)| i)
        .collect();

    for end in closers.into_iter().rev() {
        let candidate = repair_best_effort(&raw[..=end]);
        if let Some(obj) = try_parse_object(&candidate) {
            return Some(obj);
        }
    }

    None
}

/// Heuristic: the model started a JSON object but did not finish it.
pub fn looks_truncated(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let t = strip_code_fences(s);
    t.starts_with('{') && !t.ends_with('}')
}

/// Char-safe truncation for error display.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
