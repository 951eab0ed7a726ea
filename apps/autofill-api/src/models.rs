//! Request and response models for the autofill API

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use review_core::{fields::display_text, ReviewSession, FORM_FIELD_KEYS};

use crate::error::ApiError;

fn default_use_policy_docs() -> bool {
    true
}

fn default_top_k_docs() -> usize {
    4
}

/// Body of `POST /autofill`
#[derive(Debug, Clone, Deserialize)]
pub struct AutofillRequest {
    pub advisor_notes: String,
    #[serde(default)]
    pub client_profile: Option<Value>,
    pub form_type: String,
    #[serde(default = "default_use_policy_docs")]
    pub use_policy_docs: bool,
    #[serde(default = "default_top_k_docs")]
    pub top_k_docs: usize,
}

impl AutofillRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.advisor_notes.chars().count() < 5 {
            return Err(ApiError::InvalidRequest(
                "advisor_notes must be at least 5 characters".to_string(),
            ));
        }
        if self.form_type.chars().count() < 3 {
            return Err(ApiError::InvalidRequest(
                "form_type must be at least 3 characters".to_string(),
            ));
        }
        Ok(())
    }
}

/// Extraction result returned by `/autofill` and `/autofill-from-pdf`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutofillResponse {
    pub form_type: String,
    /// Field key -> suggested value, in model output order
    pub autofilled_fields: Map<String, Value>,
    pub missing_fields: Vec<String>,
    pub risk_flags: Vec<String>,
    pub explanations: HashMap<String, String>,
    /// citations[field] = ["source.pdf::chunk_12", ...]
    pub citations: HashMap<String, Vec<String>>,
}

impl AutofillResponse {
    /// Normalize a recovered model object so the response always matches the
    /// schema: missing sections default, and every known field key gets a
    /// citations list (coercing any non-list value to empty).
    pub fn from_model_output(mut data: Map<String, Value>, requested_form_type: &str) -> Self {
        let form_type = match data.remove("form_type") {
            Some(Value::String(s)) => s,
            _ => requested_form_type.to_string(),
        };

        let autofilled_fields = match data.remove("autofilled_fields") {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };

        let missing_fields = string_list(data.remove("missing_fields"));
        let risk_flags = string_list(data.remove("risk_flags"));

        let explanations = match data.remove("explanations") {
            Some(Value::Object(map)) => map
                .into_iter()
                .map(|(k, v)| (k, display_text(&v)))
                .collect(),
            _ => HashMap::new(),
        };

        let mut citations: HashMap<String, Vec<String>> = match data.remove("citations") {
            Some(Value::Object(map)) => map
                .into_iter()
                .map(|(k, v)| (k, string_list(Some(v))))
                .collect(),
            _ => HashMap::new(),
        };
        for key in FORM_FIELD_KEYS {
            citations.entry(key.to_string()).or_default();
        }

        Self {
            form_type,
            autofilled_fields,
            missing_fields,
            risk_flags,
            explanations,
            citations,
        }
    }
}

fn string_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(display_text).collect(),
        _ => Vec::new(),
    }
}

/// Body of `POST /api/review`. Accepts a full `AutofillResponse` as posted
/// back by the UI; only the two mappings are used.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewRequest {
    #[serde(default)]
    pub autofilled_fields: Map<String, Value>,
    #[serde(default)]
    pub explanations: HashMap<String, String>,
}

/// Body of `POST /api/review/:id/edit`
#[derive(Debug, Clone, Deserialize)]
pub struct EditRequest {
    pub text: String,
}

/// The active field as shown to the review UI
#[derive(Debug, Clone, Serialize)]
pub struct ReviewFieldView {
    pub label: String,
    pub value: String,
    pub reason: String,
    /// Current (possibly unsaved) draft text
    pub draft: String,
}

/// Session state returned by every review endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub current_index: usize,
    pub length: usize,
    pub terminal: bool,
    /// The UI disables forward navigation while this is false
    pub current_saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<ReviewFieldView>,
}

impl ReviewResponse {
    pub fn from_session(id: Uuid, session: &ReviewSession) -> Self {
        let field = session.current().map(|item| ReviewFieldView {
            label: item.label.clone(),
            value: item.value.clone(),
            reason: item.reason.clone(),
            draft: session.current_draft().unwrap_or_default().to_string(),
        });

        Self {
            id,
            current_index: session.current_index(),
            length: session.len(),
            terminal: session.is_terminal(),
            current_saved: session.is_current_saved(),
            field,
        }
    }
}

/// Service banner for `GET /`
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub docs: &'static str,
}

/// `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// `POST /health/model`
#[derive(Debug, Serialize)]
pub struct ModelHealthResponse {
    pub status: &'static str,
    pub model_reply: String,
}

/// `POST /docs/reload`
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    pub chunks_loaded: usize,
    pub chunks_path: String,
}
