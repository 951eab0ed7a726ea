//! Field items and the extraction result adapter
//!
//! The extraction service returns a mapping of field key -> suggested value
//! plus a parallel mapping of field key -> justification. This module turns
//! those raw mappings into the ordered `FieldItem` sequence a `ReviewSession`
//! steps through, preserving the extraction result's insertion order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Justification used when the extraction service returned none for a field.
pub const DEFAULT_REASON: &str = "Generated by AI";

/// Justification attached to the placeholder sequence when extraction
/// produced no fields at all.
const PLACEHOLDER_REASON: &str = "Extraction unavailable";

/// Field keys of the suitability form schema the extraction service is
/// prompted for. Also the shape of the placeholder sequence shown when the
/// service returns nothing.
pub const FORM_FIELD_KEYS: &[&str] = &[
    "client_age",
    "time_horizon_years",
    "risk_tolerance",
    "primary_goal",
    "recommended_action_summary",
    "risk_disclosure_summary",
];

/// One compliance field under review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldItem {
    /// Display name, humanized from the extraction key
    pub label: String,
    /// Current suggested text; empty when extraction returned null/absent
    pub value: String,
    /// Justification from the extraction service
    pub reason: String,
}

/// Humanize an extraction key into a display label.
///
/// Underscores become spaces and the first letter of every word is
/// uppercased: `"risk_tolerance_level"` -> `"Risk Tolerance Level"`.
pub fn humanize_label(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a raw extraction value as display text.
///
/// `null` becomes the empty string, strings pass through verbatim, and any
/// other JSON value renders as its compact JSON text.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Adapt raw extraction mappings into the ordered field sequence a session
/// reviews.
///
/// An empty field mapping falls back to [`placeholder_fields`] so a review
/// screen is never empty after a failed or degenerate extraction.
pub fn fields_from_extraction(
    fields: &Map<String, Value>,
    explanations: &HashMap<String, String>,
) -> Vec<FieldItem> {
    if fields.is_empty() {
        return placeholder_fields();
    }

    fields
        .iter()
        .map(|(key, value)| FieldItem {
            label: humanize_label(key),
            value: display_text(value),
            reason: explanations
                .get(key)
                .cloned()
                .unwrap_or_else(|| DEFAULT_REASON.to_string()),
        })
        .collect()
}

/// The fixed fallback sequence: every known form field with an empty value.
pub fn placeholder_fields() -> Vec<FieldItem> {
    FORM_FIELD_KEYS
        .iter()
        .map(|key| FieldItem {
            label: humanize_label(key),
            value: String::new(),
            reason: PLACEHOLDER_REASON.to_string(),
        })
        .collect()
}
