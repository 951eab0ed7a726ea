//! HTTP handlers: health, autofill, and chunk index management

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::extraction;
use crate::models::*;
use crate::pdf;
use crate::prompt;
use crate::state::AppState;

/// Handler: GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok",
        service: "autofill-api",
        docs: "/health",
    })
}

/// Handler: GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Handler: POST /health/model
///
/// Sends a fixed probe prompt so operators can verify model connectivity
/// and credentials without a real document.
pub async fn model_health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelHealthResponse>, ApiError> {
    let reply = state.model.complete(prompt::MODEL_PROBE_PROMPT).await?;
    Ok(Json(ModelHealthResponse {
        status: "ok",
        model_reply: reply,
    }))
}

/// Handler: POST /docs/reload
pub async fn reload_docs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadResponse>, ApiError> {
    let mut index = state.index.write().await;
    let chunks_loaded = index.reload()?;
    info!("Reloaded {} policy chunks", chunks_loaded);
    Ok(Json(ReloadResponse {
        status: "ok",
        chunks_loaded,
        chunks_path: index.path().display().to_string(),
    }))
}

/// Handler: POST /autofill
pub async fn autofill(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AutofillRequest>,
) -> Result<Json<AutofillResponse>, ApiError> {
    req.validate()?;
    run_autofill(&state, req).await.map(Json)
}

/// Handler: POST /autofill-from-pdf
///
/// Multipart variant: extracts the uploaded PDF's text, joins it with any
/// advisor notes, and runs the same pipeline as /autofill.
pub async fn autofill_from_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<AutofillResponse>, ApiError> {
    let upload = PdfUpload::read_from(multipart).await?;

    let pdf_text = pdf::extract_text(&upload.file)
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let combined_notes: String = [upload.advisor_notes.as_deref(), Some(pdf_text.as_str())]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    if combined_notes.is_empty() {
        return Err(ApiError::InvalidRequest(
            "No text found in PDF or notes.".to_string(),
        ));
    }

    let req = AutofillRequest {
        advisor_notes: combined_notes,
        client_profile: upload.client_profile,
        form_type: upload.form_type,
        use_policy_docs: upload.use_policy_docs,
        top_k_docs: upload.top_k_docs,
    };
    req.validate()?;

    run_autofill(&state, req).await.map(Json)
}

/// The shared autofill pipeline: retrieve, prompt, extract, normalize.
async fn run_autofill(
    state: &AppState,
    req: AutofillRequest,
) -> Result<AutofillResponse, ApiError> {
    let excerpts = if req.use_policy_docs {
        let query = prompt::retrieval_query(&req);
        state.index.read().await.retrieve(&query, req.top_k_docs)
    } else {
        Vec::new()
    };

    info!(
        "Autofill request: form_type={}, {} policy excerpts",
        req.form_type,
        excerpts.len()
    );

    let prompt_text = prompt::autofill_prompt(&req, &excerpts);
    let data = extraction::extract_autofill_object(&state.model, &prompt_text).await?;

    Ok(AutofillResponse::from_model_output(data, &req.form_type))
}

/// Parsed fields of the /autofill-from-pdf multipart form
struct PdfUpload {
    file: Vec<u8>,
    form_type: String,
    client_profile: Option<Value>,
    advisor_notes: Option<String>,
    use_policy_docs: bool,
    top_k_docs: usize,
}

impl PdfUpload {
    async fn read_from(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut file: Option<Vec<u8>> = None;
        let mut form_type: Option<String> = None;
        let mut client_profile: Option<Value> = None;
        let mut advisor_notes: Option<String> = None;
        let mut use_policy_docs = true;
        let mut top_k_docs = 4usize;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Malformed multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let is_pdf_type = field.content_type() == Some("application/pdf");
                    let is_pdf_name = field
                        .file_name()
                        .map(|f| f.to_lowercase().ends_with(".pdf"))
                        .unwrap_or(false);
                    if !is_pdf_type && !is_pdf_name {
                        return Err(ApiError::InvalidRequest(
                            "Only PDF files are supported.".to_string(),
                        ));
                    }
                    let bytes = field.bytes().await.map_err(|e| {
                        ApiError::InvalidRequest(format!("Failed to read upload: {e}"))
                    })?;
                    file = Some(bytes.to_vec());
                }
                "form_type" => form_type = Some(text_field(field).await?),
                "client_profile" => {
                    let raw = text_field(field).await?;
                    if !raw.is_empty() {
                        let parsed = serde_json::from_str(&raw).map_err(|e| {
                            ApiError::InvalidRequest(format!("Invalid client_profile JSON: {e}"))
                        })?;
                        client_profile = Some(parsed);
                    }
                }
                "advisor_notes" => advisor_notes = Some(text_field(field).await?),
                "use_policy_docs" => {
                    use_policy_docs = parse_form_bool(&text_field(field).await?);
                }
                "top_k_docs" => {
                    let raw = text_field(field).await?;
                    top_k_docs = raw.trim().parse().map_err(|_| {
                        ApiError::InvalidRequest(format!("Invalid top_k_docs: {raw}"))
                    })?;
                }
                _ => {}
            }
        }

        Ok(Self {
            file: file
                .ok_or_else(|| ApiError::InvalidRequest("Missing 'file' field".to_string()))?,
            form_type: form_type
                .ok_or_else(|| ApiError::InvalidRequest("Missing 'form_type' field".to_string()))?,
            client_profile,
            advisor_notes,
            use_policy_docs,
            top_k_docs,
        })
    }
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Malformed multipart field: {e}")))
}

fn parse_form_bool(raw: &str) -> bool {
    !matches!(
        raw.trim().to_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}
