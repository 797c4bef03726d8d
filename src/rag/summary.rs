//! Structured episode summaries with a read-through cache.

use super::format_context;
use crate::config::Prompts;
use crate::error::Result;
use crate::generation::Generator;
use crate::retriever::EpisodeRetriever;
use crate::store::Episode;
use crate::tracker::EpisodeTracker;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Generates and caches one structured summary per episode.
///
/// The stored summary is the cache: once set, later calls return it
/// without touching the generation model. A summary that generated but
/// failed to persist is still handed to the caller; the next call simply
/// regenerates it.
pub struct SummarySynthesizer {
    tracker: Arc<EpisodeTracker>,
    retriever: Arc<EpisodeRetriever>,
    generator: Arc<dyn Generator>,
    prompts: Prompts,
}

impl SummarySynthesizer {
    /// Create a new summary synthesizer.
    pub fn new(
        tracker: Arc<EpisodeTracker>,
        retriever: Arc<EpisodeRetriever>,
        generator: Arc<dyn Generator>,
        prompts: Prompts,
    ) -> Self {
        Self {
            tracker,
            retriever,
            generator,
            prompts,
        }
    }

    /// The episode's summary, or None when it cannot be produced
    /// (episode missing, not yet processed, or generation failed).
    #[instrument(skip(self))]
    pub async fn summarize(&self, episode_number: i64) -> Option<String> {
        let episode = self.tracker.get(episode_number).await?;

        if let Some(summary) = episode.summary {
            info!("Returning cached summary for episode {}", episode_number);
            return Some(summary);
        }

        if !episode.processed {
            warn!(
                "Episode {} has no indexed transcript to summarize",
                episode_number
            );
            return None;
        }

        match self.generate(&episode).await {
            Ok(summary) => {
                if !self.tracker.set_summary(episode_number, &summary).await {
                    warn!(
                        "Summary for episode {} was not cached; it will be regenerated next time",
                        episode_number
                    );
                }
                Some(summary)
            }
            Err(e) => {
                error!(
                    "Error generating summary for episode {}: {}",
                    episode_number, e
                );
                None
            }
        }
    }

    async fn generate(&self, episode: &Episode) -> Result<String> {
        let units = self.retriever.fetch_all(episode.episode_number).await?;
        info!(
            "Summarizing episode {} from {} units",
            episode.episode_number,
            units.len()
        );

        let context = format_context(units.iter().map(|u| u.text.as_str()));

        let mut vars = HashMap::new();
        vars.insert("title".to_string(), episode.title.clone());
        vars.insert("context".to_string(), context);

        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.summary.template, &vars);

        self.generator.complete(&prompt).await
    }
}
