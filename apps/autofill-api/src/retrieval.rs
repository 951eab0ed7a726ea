//! Lexical policy-document retrieval
//!
//! Policy PDFs are ingested offline into a JSON chunk index
//! (`$INDEX_DIR/chunks.json`). At request time chunks are scored by distinct
//! token overlap with the query and the top-k excerpts are spliced into the
//! extraction prompt. A missing index file simply yields an empty corpus.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref NON_ALNUM_RE: Regex = Regex::new(r"[^a-z0-9\s]").unwrap();
}

/// Most excerpts a single request may splice into the prompt.
const MAX_TOP_K: usize = 10;

/// One ingested chunk of a policy document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkRecord {
    pub id: String,
    pub source: String,
    pub chunk_index: usize,
    pub text: String,
}

/// In-memory chunk corpus, reloadable from disk at runtime
#[derive(Debug)]
pub struct ChunkIndex {
    path: PathBuf,
    chunks: Vec<ChunkRecord>,
}

impl ChunkIndex {
    /// Load the corpus from `path`. A missing file is an empty corpus, not
    /// an error; a corrupt file is an error.
    pub fn load(path: PathBuf) -> Result<Self> {
        let chunks = read_chunks(&path)?;
        Ok(Self { path, chunks })
    }

    /// Re-read the chunk file without restarting the server. Returns the
    /// number of chunks now loaded.
    pub fn reload(&mut self) -> Result<usize> {
        self.chunks = read_chunks(&self.path)?;
        Ok(self.chunks.len())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Return the best `(chunk_id, chunk_text)` matches for `query` by
    /// distinct-token overlap, best first. `k` is clamped to `1..=10`.
    pub fn retrieve(&self, query: &str, k: usize) -> Vec<(String, String)> {
        if self.chunks.is_empty() {
            return Vec::new();
        }

        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, &ChunkRecord)> = self
            .chunks
            .iter()
            .filter_map(|rec| {
                let overlap = tokenize(&rec.text).intersection(&query_tokens).count();
                (overlap > 0).then_some((overlap, rec))
            })
            .collect();

        // Stable sort keeps ingestion order among equal scores
        scored.sort_by_key(|(score, _)| std::cmp::Reverse(*score));

        scored
            .into_iter()
            .take(k.clamp(1, MAX_TOP_K))
            .map(|(_, rec)| (rec.id.clone(), rec.text.clone()))
            .collect()
    }
}

fn read_chunks(path: &Path) -> Result<Vec<ChunkRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read chunk index at {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("malformed chunk index at {}", path.display()))
}

/// Lowercase, strip non-alphanumerics, keep tokens of three or more chars.
fn tokenize(s: &str) -> HashSet<String> {
    let lowered = s.to_lowercase();
    NON_ALNUM_RE
        .replace_all(&lowered, " ")
        .split_whitespace()
        .filter(|w| w.len() >= 3)
        .map(str::to_string)
        .collect()
}
