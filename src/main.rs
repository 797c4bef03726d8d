//! Svar CLI entry point.

use anyhow::Result;
use clap::Parser;
use svar::cli::{commands, Cli, Commands};
use svar::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging; -v flags override the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("svar={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Ensure the data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Init { force } => {
            commands::run_init(&settings, *force)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings).await?;
        }

        Commands::Sync { limit, episode } => {
            commands::run_sync(*limit, *episode, settings).await?;
        }

        Commands::Episodes { processed, limit } => {
            commands::run_episodes(*processed, *limit, settings).await?;
        }

        Commands::Process {
            episode,
            all_pending,
        } => {
            commands::run_process(*episode, *all_pending, settings).await?;
        }

        Commands::Ask { episode, question } => {
            commands::run_ask(*episode, question, settings).await?;
        }

        Commands::Chat { episode } => {
            commands::run_chat(*episode, settings).await?;
        }

        Commands::Summary { episode } => {
            commands::run_summary(*episode, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
