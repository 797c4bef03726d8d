//! Episodes command - list known episodes.

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the episodes command.
pub async fn run_episodes(
    processed_only: bool,
    limit: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let pipeline = Pipeline::new(&settings)?;

    let episodes = if processed_only {
        pipeline.tracker().list_processed().await
    } else {
        pipeline.tracker().list_all().await
    };

    if episodes.is_empty() {
        if processed_only {
            Output::info("No processed episodes yet. Use 'svar process <episode>' to index one.");
        } else {
            Output::info("No episodes yet. Use 'svar sync' to fetch the episode directory.");
        }
        return Ok(());
    }

    let shown = limit.unwrap_or(episodes.len()).min(episodes.len());
    Output::header(&format!("Episodes ({} of {})", shown, episodes.len()));
    println!();

    for episode in episodes.iter().take(shown) {
        Output::episode_line(episode);
    }

    let stats = pipeline.stats().await;
    println!();
    Output::kv("Total episodes", &stats.episodes.to_string());
    Output::kv("Processed", &stats.processed.to_string());
    Output::kv("Indexed units", &stats.units.to_string());

    Ok(())
}
