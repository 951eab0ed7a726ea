//! Application state for the autofill API

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::RwLock;
use uuid::Uuid;

use review_core::ReviewSession;

use crate::llm::ModelClient;
use crate::retrieval::ChunkIndex;

const DEFAULT_INDEX_DIR: &str = "data/index";

pub struct AppState {
    /// Hosted extraction model
    pub model: ModelClient,
    /// Policy chunk corpus, reloadable via POST /docs/reload
    pub index: RwLock<ChunkIndex>,
    /// In-memory review sessions; nothing survives process teardown
    pub sessions: RwLock<HashMap<Uuid, ReviewSession>>,
}

impl AppState {
    pub fn from_env() -> Result<Self> {
        let model = ModelClient::from_env(reqwest::Client::new());

        let index_dir =
            std::env::var("INDEX_DIR").unwrap_or_else(|_| DEFAULT_INDEX_DIR.to_string());
        let chunks_path = PathBuf::from(index_dir).join("chunks.json");
        let index = ChunkIndex::load(chunks_path)?;
        tracing::info!(
            "Loaded {} policy chunks from {}",
            index.len(),
            index.path().display()
        );

        Ok(Self {
            model,
            index: RwLock::new(index),
            sessions: RwLock::new(HashMap::new()),
        })
    }
}
