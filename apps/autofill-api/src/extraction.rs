//! Extraction orchestration: model calls plus JSON recovery retries
//!
//! Models intermittently emit invalid or truncated JSON, so one logical
//! extraction is a short retry loop: recover what came back, ask for a
//! reprint when it looks cut off, and only give up after three rounds.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::llm::{ModelClient, ModelError};
use crate::prompt;
use crate::recovery;

const MAX_ATTEMPTS: usize = 3;
const RAW_OUTPUT_DISPLAY_LIMIT: usize = 2000;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("model did not return valid JSON after retries. Raw output: {0}")]
    InvalidJson(String),
}

/// Run the extraction prompt and recover a JSON object from the reply.
pub async fn extract_autofill_object(
    client: &ModelClient,
    prompt_text: &str,
) -> Result<Map<String, Value>, ExtractionError> {
    let mut last_raw = String::new();

    for attempt in 1..=MAX_ATTEMPTS {
        last_raw = client.complete(prompt_text).await?;

        // Obviously cut off: ask for a full reprint before trying to parse
        if recovery::looks_truncated(&last_raw) {
            tracing::debug!("attempt {attempt}: output looks truncated, requesting reprint");
            last_raw = client.complete(&prompt::reprint_prompt(&last_raw)).await?;
        }

        if let Some(data) = recover(&last_raw) {
            return Ok(data);
        }

        // Ask the model to fix its own output, then try once more this round
        tracing::debug!("attempt {attempt}: output invalid, requesting corrected reprint");
        last_raw = client.complete(&prompt::reprint_prompt(&last_raw)).await?;

        if let Some(data) = recover(&last_raw) {
            return Ok(data);
        }
    }

    Err(ExtractionError::InvalidJson(recovery::truncate_chars(
        &last_raw,
        RAW_OUTPUT_DISPLAY_LIMIT,
    )))
}

fn recover(raw: &str) -> Option<Map<String, Value>> {
    recovery::extract_object(raw)
        .ok()
        .or_else(|| recovery::largest_valid_prefix(raw))
}
