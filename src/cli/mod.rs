//! CLI module for Svar.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Svar - Podcast Transcript QA
///
/// A CLI tool for asking grounded questions about podcast episodes.
/// The name "Svar" comes from the Norwegian word for "answer."
#[derive(Parser, Debug)]
#[command(name = "svar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Svar and write the default configuration
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Check configuration, API access, and database health
    Doctor,

    /// Scrape the episode directory and fetch missing transcripts
    Sync {
        /// Maximum number of episode pages to fetch this run
        #[arg(short, long)]
        limit: Option<usize>,

        /// Sync only this episode number
        #[arg(short, long)]
        episode: Option<i64>,
    },

    /// List known episodes, newest first
    Episodes {
        /// Show only processed episodes
        #[arg(short, long)]
        processed: bool,

        /// Maximum number of episodes to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Embed and index an episode's transcript
    Process {
        /// Episode number to process
        episode: Option<i64>,

        /// Process every unprocessed episode that has a transcript
        #[arg(long, conflicts_with = "episode")]
        all_pending: bool,
    },

    /// Ask a question about one episode
    Ask {
        /// Episode number to ask about
        episode: i64,

        /// The question to ask
        question: String,
    },

    /// Start an interactive chat session about one episode
    Chat {
        /// Episode number to chat about
        episode: i64,
    },

    /// Show an episode's structured summary, generating it once
    Summary {
        /// Episode number to summarize
        episode: i64,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "rag.model")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
