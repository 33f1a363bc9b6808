//! Pipeline orchestrator for vidqa.
//!
//! Coordinates URL validation, transcript fetch, chunking, indexing and
//! session registration, and routes questions to the right session.

use crate::chunking::{ChunkingConfig, RecursiveChunker};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, VidqaError};
use crate::generation::{Generator, OpenAIGenerator};
use crate::rag::Answerer;
use crate::session::{Session, SessionInfo, SessionRegistry};
use crate::transcript::{TranscriptSource, YtDlpTranscriptSource};
use crate::vector_store::SemanticIndex;
use crate::video_id::extract_video_id;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the vidqa pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    chunker: RecursiveChunker,
    transcript_source: Arc<dyn TranscriptSource>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    registry: Arc<SessionRegistry>,
}

impl Orchestrator {
    /// Create a new orchestrator backed by yt-dlp and OpenAI.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let transcript_source = Arc::new(YtDlpTranscriptSource::with_executable(
            &settings.transcript.ytdlp_path,
        ));

        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        )?);

        let generator = Arc::new(OpenAIGenerator::new(
            &settings.generation.model,
            settings.generation.temperature,
        )?);

        info!(
            "Using {} for embeddings and {} for answers",
            settings.embedding.model, settings.generation.model
        );

        Self::with_components(settings, prompts, transcript_source, embedder, generator)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        transcript_source: Arc<dyn TranscriptSource>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        settings.validate()?;
        let chunker = RecursiveChunker::new(ChunkingConfig::from(&settings.chunking));

        Ok(Self {
            settings,
            prompts,
            chunker,
            transcript_source,
            embedder,
            generator,
            registry: Arc::new(SessionRegistry::new()),
        })
    }

    /// Fetch, chunk and index a video's transcript, then register a session.
    ///
    /// Nothing is registered unless every step succeeds. The registry lock is
    /// only taken for the final insert.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn process_video(&self, url: &str) -> Result<ProcessedVideo> {
        let video_id = extract_video_id(url)
            .ok_or_else(|| VidqaError::InvalidInput(format!("Invalid YouTube URL: {}", url)))?;

        let transcript = self
            .transcript_source
            .fetch_transcript(&video_id, &self.settings.transcript.languages)
            .await
            .map_err(|e| match e {
                VidqaError::TranscriptNotAvailable(_)
                | VidqaError::TranscriptUnavailable(_)
                | VidqaError::ToolNotFound(_) => e,
                other => VidqaError::TranscriptUnavailable(other.to_string()),
            })?;
        info!("Fetched transcript ({} chars)", transcript.chars().count());

        let chunks = self.chunker.chunk(&transcript);
        if chunks.is_empty() {
            warn!("Transcript for {} produced no chunks", video_id);
        }

        let index = SemanticIndex::build(chunks, self.embedder.clone())
            .await
            .map_err(|e| match e {
                VidqaError::Indexing(_) => e,
                other => VidqaError::Indexing(other.to_string()),
            })?;
        let chunk_count = index.len();

        let answerer = Answerer::new(index, self.generator.clone())
            .with_prompts(self.prompts.clone())
            .with_top_k(self.settings.retrieval.top_k);

        let session_id = self
            .registry
            .create(&video_id, url, transcript, answerer)
            .await;

        info!("Processed {} into {} ({} chunks)", video_id, session_id, chunk_count);

        Ok(ProcessedVideo {
            session_id,
            video_id,
            chunk_count,
        })
    }

    /// Answer a question against one session's transcript.
    #[instrument(skip(self, question), fields(session_id = %session_id))]
    pub async fn ask_question(&self, session_id: &str, question: &str) -> Result<QuestionAnswer> {
        let session = self.require_session(session_id).await?;
        let answer = session.answerer().answer(question).await?;

        Ok(QuestionAnswer {
            question: question.to_string(),
            answer,
        })
    }

    /// Summaries of all sessions, oldest first.
    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        self.registry.list().await
    }

    /// Look up a session.
    pub async fn get_session(&self, session_id: &str) -> Option<Arc<Session>> {
        self.registry.get(session_id).await
    }

    /// Delete a session.
    #[instrument(skip(self))]
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        if self.registry.delete(session_id).await {
            info!("Deleted session {}", session_id);
            Ok(())
        } else {
            Err(VidqaError::SessionNotFound(session_id.to_string()))
        }
    }

    async fn require_session(&self, session_id: &str) -> Result<Arc<Session>> {
        self.registry
            .get(session_id)
            .await
            .ok_or_else(|| VidqaError::SessionNotFound(session_id.to_string()))
    }
}

/// Result of processing a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedVideo {
    pub session_id: String,
    pub video_id: String,
    /// Number of chunks indexed.
    pub chunk_count: usize,
}

/// A question with its answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}
