//! Interactive question loop over one video.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
///
/// Every question is answered on its own; earlier turns are not sent along.
pub async fn run_chat(url: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vidqa doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Fetching and indexing transcript...");
    let processed = orchestrator.process_video(url).await;
    spinner.finish_and_clear();
    let processed = processed?;

    println!("\n{}", style("vidqa Chat").bold().cyan());
    Output::session_info(&processed.session_id, &processed.video_id, processed.chunk_count);
    println!("{}\n", style("Type your questions, or 'exit' to quit.").dim());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if is_exit(input) {
            Output::info("Goodbye!");
            break;
        }

        match orchestrator.ask_question(&processed.session_id, input).await {
            Ok(qa) => Output::answer(&qa.answer),
            Err(e) => Output::error(&format!("Error: {}", e)),
        }
    }

    Ok(())
}

fn is_exit(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}
