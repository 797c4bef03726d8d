//! Process command - embed and index episode transcripts.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the process command.
pub async fn run_process(
    episode: Option<i64>,
    all_pending: bool,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Process) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = Pipeline::new(&settings)?;

    match (episode, all_pending) {
        (Some(n), _) => process_one(&pipeline, n).await,
        (None, true) => process_pending(&pipeline).await,
        (None, false) => {
            Output::error("Specify an episode number or use --all-pending.");
            anyhow::bail!("no episode specified");
        }
    }
}

async fn process_one(pipeline: &Pipeline, episode_number: i64) -> Result<()> {
    let spinner = Output::spinner(&format!("Processing episode {}...", episode_number));

    match pipeline.process_episode(episode_number).await {
        Ok(result) if result.skipped => {
            spinner.finish_and_clear();
            Output::info(&format!(
                "Episode {} ({}) is already processed.",
                result.episode_number, result.title
            ));
            Ok(())
        }
        Ok(result) => {
            spinner.finish_and_clear();
            Output::success(&format!(
                "Indexed episode {} ({}): {} units",
                result.episode_number, result.title, result.units_indexed
            ));
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to process episode {}: {}", episode_number, e));
            Err(e.into())
        }
    }
}

async fn process_pending(pipeline: &Pipeline) -> Result<()> {
    let spinner = Output::spinner("Processing pending episodes...");
    let report = pipeline.process_pending().await?;
    spinner.finish_and_clear();

    if report.indexed.is_empty() && report.failed.is_empty() {
        Output::info("Nothing to process. Run 'svar sync' to fetch new transcripts.");
        return Ok(());
    }

    for result in &report.indexed {
        Output::success(&format!(
            "Indexed episode {} ({}): {} units",
            result.episode_number, result.title, result.units_indexed
        ));
    }

    for (episode_number, error) in &report.failed {
        Output::warning(&format!("Episode {} failed: {}", episode_number, error));
    }

    println!();
    Output::kv("Indexed", &report.indexed.len().to_string());
    Output::kv("Failed", &report.failed.len().to_string());

    Ok(())
}
