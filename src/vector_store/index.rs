//! In-memory semantic index.

use super::{cosine_similarity, SearchResult};
use crate::chunking::TextChunk;
use crate::embedding::Embedder;
use crate::error::{Result, VidqaError};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

struct IndexEntry {
    chunk: TextChunk,
    embedding: Vec<f32>,
}

/// Immutable nearest-neighbor index over one transcript's chunks.
///
/// Holds the embedder it was built with so queries are embedded by the same
/// model as the chunks.
pub struct SemanticIndex {
    entries: Vec<IndexEntry>,
    embedder: Arc<dyn Embedder>,
}

impl SemanticIndex {
    /// Embed every chunk in one bulk call and build the index.
    #[instrument(skip(chunks, embedder), fields(chunks = chunks.len()))]
    pub async fn build(chunks: Vec<TextChunk>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if chunks.is_empty() {
            return Ok(Self {
                entries: Vec::new(),
                embedder,
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(VidqaError::Indexing(format!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        if let Some(first) = embeddings.first() {
            let dims = first.len();
            if dims == 0 || embeddings.iter().any(|e| e.len() != dims) {
                return Err(VidqaError::Indexing(
                    "Embedder returned vectors of inconsistent dimensions".to_string(),
                ));
            }
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();

        debug!("Built index with {} entries", entries.len());
        Ok(Self { entries, embedder })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indexed chunks in build order.
    pub fn chunks(&self) -> impl Iterator<Item = &TextChunk> {
        self.entries.iter().map(|e| &e.chunk)
    }

    /// Return up to `k` chunks most similar to `query`, best first.
    ///
    /// `k` larger than the index returns every chunk. An empty index or
    /// `k == 0` returns nothing without contacting the embedder.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        self.search_by_vector(&query_embedding, k)
    }

    /// Rank chunks against an already computed query vector.
    ///
    /// Equal scores keep build order.
    pub fn search_by_vector(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if let Some(first) = self.entries.first() {
            if first.embedding.len() != query_embedding.len() {
                return Err(VidqaError::Indexing(format!(
                    "Query has {} dimensions, index has {}",
                    query_embedding.len(),
                    first.embedding.len()
                )));
            }
        }

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query_embedding, &entry.embedding),
            })
            .collect();

        // sort_by is stable, so ties stay in build order
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results.truncate(k.min(self.entries.len()));

        Ok(results)
    }
}
