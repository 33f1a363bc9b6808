//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Process a video, answer one question about it, and exit.
pub async fn run_ask(url: &str, question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vidqa doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Fetching and indexing transcript...");
    let processed = match orchestrator.process_video(url).await {
        Ok(processed) => {
            spinner.finish_and_clear();
            processed
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to process video: {}", e));
            return Err(e.into());
        }
    };
    Output::session_info(&processed.session_id, &processed.video_id, processed.chunk_count);

    let spinner = Output::spinner("Thinking...");
    match orchestrator.ask_question(&processed.session_id, question).await {
        Ok(qa) => {
            spinner.finish_and_clear();
            Output::answer(&qa.answer);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
