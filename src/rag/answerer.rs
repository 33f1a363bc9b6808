//! Question answering over a single transcript.

use super::format_context;
use crate::config::Prompts;
use crate::error::{Result, VidqaError};
use crate::generation::Generator;
use crate::vector_store::{SearchResult, SemanticIndex};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Number of chunks retrieved per question unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 4;

/// Answers questions strictly from one transcript's index.
///
/// Holds no conversation state; every call is independent, so a shared
/// reference can serve concurrent questions.
pub struct Answerer {
    index: SemanticIndex,
    generator: Arc<dyn Generator>,
    prompts: Prompts,
    top_k: usize,
}

impl Answerer {
    /// Create an answerer over a built index.
    pub fn new(index: SemanticIndex, generator: Arc<dyn Generator>) -> Self {
        Self {
            index,
            generator,
            prompts: Prompts::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Set the number of chunks retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn index(&self) -> &SemanticIndex {
        &self.index
    }

    /// Render the QA template for a context and question.
    pub fn render_prompt(&self, context: &str, question: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context.to_string());
        vars.insert("question".to_string(), question.to_string());
        self.prompts.render_with_custom(&self.prompts.qa.template, &vars)
    }

    /// Answer a question, returning the generator's raw output.
    pub async fn answer(&self, question: &str) -> Result<String> {
        Ok(self.answer_with_sources(question).await?.answer)
    }

    /// Answer a question and also return the chunks it was answered from.
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn answer_with_sources(&self, question: &str) -> Result<RagResponse> {
        info!("Answering question");

        let sources = self
            .index
            .search(question, self.top_k)
            .await
            .map_err(|e| as_generation_failure("Retrieval failed", e))?;

        let context = format_context(&sources);
        let prompt = self.render_prompt(&context, question);
        debug!(
            "Retrieved {} chunks, prompt is {} chars",
            sources.len(),
            prompt.len()
        );

        let answer = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| as_generation_failure("Generation failed", e))?;

        Ok(RagResponse { answer, sources })
    }
}

fn as_generation_failure(stage: &str, err: VidqaError) -> VidqaError {
    match err {
        VidqaError::Generation(_) => err,
        other => VidqaError::Generation(format!("{}: {}", stage, other)),
    }
}

/// A RAG answer with the chunks it was grounded on.
#[derive(Debug, Clone)]
pub struct RagResponse {
    /// The generated answer, verbatim.
    pub answer: String,
    /// Retrieved chunks, best first.
    pub sources: Vec<SearchResult>,
}
