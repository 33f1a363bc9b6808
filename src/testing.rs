//! Deterministic in-process collaborators for tests.

use crate::embedding::Embedder;
use crate::error::{Result, VidqaError};
use crate::generation::Generator;
use crate::transcript::TranscriptSource;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

const KEYWORD_DIMENSIONS: usize = 512;

/// Bag-of-words embedder: each lowercase word is hashed into one dimension.
///
/// Texts sharing more words score higher under cosine similarity.
pub struct KeywordEmbedder {
    pub batch_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self {
            batch_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
        }
    }

    pub fn vectorize(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; KEYWORD_DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let slot = fnv1a(&word.to_lowercase()) as usize % KEYWORD_DIMENSIONS;
            vector[slot] += 1.0;
        }
        vector
    }
}

fn fnv1a(text: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in text.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        KEYWORD_DIMENSIONS
    }
}

/// Embedder that always fails, as on quota exhaustion.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(VidqaError::Indexing("quota exceeded".to_string()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(VidqaError::Indexing("quota exceeded".to_string()))
    }

    fn dimensions(&self) -> usize {
        KEYWORD_DIMENSIONS
    }
}

/// Embedder that indexes fine but fails on query embedding.
pub struct QueryFailingEmbedder;

#[async_trait]
impl Embedder for QueryFailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(VidqaError::Indexing("connection reset".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| KeywordEmbedder::vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        KEYWORD_DIMENSIONS
    }
}

/// Embedder whose bulk call waits until the gate is opened.
pub struct GatedEmbedder {
    pub gate: Arc<Notify>,
    inner: KeywordEmbedder,
}

impl GatedEmbedder {
    pub fn new(gate: Arc<Notify>) -> Self {
        Self {
            gate,
            inner: KeywordEmbedder::new(),
        }
    }
}

#[async_trait]
impl Embedder for GatedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.inner.embed(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.gate.notified().await;
        self.inner.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

/// Generator that records every prompt and answers by echoing it back, so
/// answers are traceable to the retrieved text.
pub struct RecordingGenerator {
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(prompt.to_string())
    }
}

/// Generator that always fails.
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(VidqaError::Generation("model overloaded".to_string()))
    }
}

/// Transcript source serving fixed transcripts by video ID.
///
/// Unknown IDs behave like videos with captions disabled.
pub struct StaticTranscriptSource {
    transcripts: HashMap<String, String>,
}

impl StaticTranscriptSource {
    pub fn new<const N: usize>(entries: [(&str, &str); N]) -> Self {
        Self {
            transcripts: entries
                .into_iter()
                .map(|(id, text)| (id.to_string(), text.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl TranscriptSource for StaticTranscriptSource {
    async fn fetch_transcript(&self, video_id: &str, _languages: &[String]) -> Result<String> {
        self.transcripts
            .get(video_id)
            .cloned()
            .ok_or_else(|| VidqaError::TranscriptNotAvailable(video_id.to_string()))
    }
}
