//! Client for the hosted extraction model
//!
//! One prompt in, one reply text out. The endpoint speaks the
//! Anthropic-style invoke shape: a `messages` body posted to
//! `{endpoint}/model/{model_id}/invoke`, reply text in `content[0].text`.
//! Endpoint, model id, and API key come from the environment.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const DEFAULT_ENDPOINT: &str = "https://bedrock-runtime.us-east-1.amazonaws.com";
const MAX_TOKENS: u32 = 400;
const TEMPERATURE: f64 = 0.2;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("MODEL_ID is not set; add it to the environment or .env file")]
    MissingModelId,

    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Upstream body text is carried verbatim for display
    #[error("model endpoint returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model reply contained no content")]
    EmptyReply,
}

#[derive(Debug, Deserialize)]
struct InvokeReply {
    #[serde(default)]
    content: Vec<ReplyBlock>,
}

#[derive(Debug, Deserialize)]
struct ReplyBlock {
    #[serde(default)]
    text: String,
}

/// Thin handle over the hosted model endpoint
#[derive(Debug, Clone)]
pub struct ModelClient {
    http: Client,
    endpoint: String,
    model_id: Option<String>,
    api_key: Option<String>,
}

impl ModelClient {
    /// Configure from `MODEL_ENDPOINT`, `MODEL_ID`, and `MODEL_API_KEY`.
    /// A missing model id only fails at call time so the server can still
    /// boot for the non-model endpoints.
    pub fn from_env(http: Client) -> Self {
        Self {
            http,
            endpoint: std::env::var("MODEL_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            model_id: std::env::var("MODEL_ID").ok(),
            api_key: std::env::var("MODEL_API_KEY").ok(),
        }
    }

    /// Send one prompt and return the reply text.
    pub async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let model_id = self.model_id.as_deref().ok_or(ModelError::MissingModelId)?;
        let url = format!(
            "{}/model/{}/invoke",
            self.endpoint.trim_end_matches('/'),
            model_id
        );

        let body = json!({
            "anthropic_version": "bedrock-2023-05-31",
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });

        tracing::debug!("Invoking model {} ({} prompt chars)", model_id, prompt.len());

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let reply: InvokeReply = response.json().await?;
        reply
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .ok_or(ModelError::EmptyReply)
    }
}
