//! Configuration module for vidqa.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QaPrompts};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, GenerationSettings, PromptSettings, RetrievalSettings,
    ServerSettings, Settings, TranscriptSettings,
};
