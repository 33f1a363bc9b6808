//! Transcript chunking for semantic indexing.
//!
//! Splits a flat transcript into overlapping, size-bounded text segments,
//! preferring paragraph, line, sentence, then word boundaries.

mod recursive;

pub use recursive::RecursiveChunker;

use crate::config::ChunkingSettings;
use serde::{Deserialize, Serialize};

/// Default separators, highest priority first. The empty separator splits
/// between characters and always applies.
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// A contiguous slice of a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Order of this chunk in the transcript.
    pub order: usize,
    /// Text content of this chunk.
    pub content: String,
    /// Offset of the first character within the transcript, in characters.
    pub start: usize,
    /// Length in characters.
    pub len: usize,
}

impl TextChunk {
    /// Offset one past the last character, in characters.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters of context shared between consecutive chunks.
    pub chunk_overlap: usize,
    /// Separators in descending priority.
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl From<&ChunkingSettings> for ChunkingConfig {
    fn from(settings: &ChunkingSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
            ..Self::default()
        }
    }
}
