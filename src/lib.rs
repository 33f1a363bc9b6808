//! vidqa - Question answering over YouTube video transcripts
//!
//! Fetches a video's captions, splits them into overlapping chunks, embeds
//! them into an in-memory index, and answers questions using only the
//! retrieved transcript text.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `video_id` - Video ID extraction from watch URLs
//! - `transcript` - Caption retrieval
//! - `chunking` - Recursive character splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - Per-transcript similarity index
//! - `generation` - Chat model completion
//! - `rag` - Retrieval-augmented answering
//! - `session` - Session registry
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use vidqa::config::Settings;
//! use vidqa::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let processed = orchestrator
//!         .process_video("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
//!         .await?;
//!     let qa = orchestrator
//!         .ask_question(&processed.session_id, "What is this video about?")
//!         .await?;
//!     println!("{}", qa.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod session;
pub mod transcript;
pub mod vector_store;
pub mod video_id;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ErrorKind, Result, VidqaError};
