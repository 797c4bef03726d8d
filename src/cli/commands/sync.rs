//! Sync command - scrape the episode directory and fetch transcripts.

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the sync command.
pub async fn run_sync(
    limit: Option<usize>,
    episode: Option<i64>,
    settings: Settings,
) -> Result<()> {
    let pipeline = Pipeline::new(&settings)?;

    let spinner = Output::spinner("Scraping episode directory...");

    match pipeline.sync(limit, episode).await {
        Ok(report) => {
            spinner.finish_and_clear();

            Output::success(&format!("Found {} episodes", report.discovered));
            if report.fetched > 0 {
                Output::success(&format!("Fetched {} episode pages", report.fetched));
            }
            if report.skipped > 0 {
                Output::info(&format!(
                    "{} episodes already had transcript and date",
                    report.skipped
                ));
            }
            if report.failed > 0 {
                Output::warning(&format!(
                    "{} episode pages failed (missing or incomplete); re-run sync to retry",
                    report.failed
                ));
            }

            let stats = pipeline.stats().await;
            println!();
            Output::kv("Episodes tracked", &stats.episodes.to_string());
            Output::kv("Processed", &stats.processed.to_string());
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Sync failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
