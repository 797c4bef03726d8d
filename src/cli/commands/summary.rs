//! Summary command - show or generate an episode's structured summary.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the summary command.
pub async fn run_summary(episode: i64, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = Pipeline::new(&settings)?;

    let spinner = Output::spinner(&format!("Summarizing episode {}...", episode));
    let summary = pipeline.summarize(episode).await;
    spinner.finish_and_clear();

    match summary {
        Some(text) => {
            println!("\n{}\n", text);
        }
        None => {
            Output::error(&format!(
                "No summary available for episode {}. Make sure it exists and is processed.",
                episode
            ));
            Output::info(&format!("Process it with: svar process {}", episode));
            anyhow::bail!("summary not available for episode {}", episode);
        }
    }

    Ok(())
}
