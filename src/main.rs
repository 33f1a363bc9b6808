//! vidqa CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vidqa::cli::preflight::{self, Operation};
use vidqa::cli::{commands, Cli, Commands, Output};
use vidqa::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("vidqa={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    match &cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings, cli.config.as_deref())?;
        }

        Commands::Serve { host, port } => {
            if let Err(e) = preflight::check(Operation::Serve, &settings) {
                Output::error(&format!("{}", e));
                Output::info("Run 'vidqa doctor' for detailed diagnostics.");
                return Err(e.into());
            }
            let host = host.clone().unwrap_or_else(|| settings.server.host.clone());
            let port = port.unwrap_or(settings.server.port);
            commands::run_serve(&host, port, settings).await?;
        }

        Commands::Ask { url, question } => {
            commands::run_ask(url, question, settings).await?;
        }

        Commands::Chat { url } => {
            commands::run_chat(url, settings).await?;
        }

        Commands::Config { action } => {
            preflight::check(Operation::Config, &settings)?;
            commands::run_config(action, &settings, cli.config.as_deref())?;
        }
    }

    Ok(())
}
