//! Pipeline service object for Svar.
//!
//! Wires the scraper, episode store, vector store, embedder, and
//! generator into one explicitly constructed object. The entry point
//! builds it once and hands it to whichever surface (CLI command, HTTP
//! handler) needs it; nothing here is cached globally.

use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SvarError};
use crate::generation::{Generator, OpenAIGenerator};
use crate::indexer::{EpisodeIndexer, IndexResult};
use crate::rag::{AnswerSynthesizer, ChatSession, SummarySynthesizer};
use crate::retriever::EpisodeRetriever;
use crate::scraper::PodcastScraper;
use crate::store::{Episode, EpisodeStore, SqliteEpisodeStore};
use crate::tracker::EpisodeTracker;
use crate::vector_store::{SqliteVectorStore, VectorStore};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The assembled question-answering pipeline.
pub struct Pipeline {
    scraper: PodcastScraper,
    store: Arc<dyn EpisodeStore>,
    vector_store: Arc<dyn VectorStore>,
    tracker: Arc<EpisodeTracker>,
    indexer: EpisodeIndexer,
    answerer: Arc<AnswerSynthesizer>,
    summarizer: SummarySynthesizer,
}

/// What one sync run did.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncReport {
    /// Episodes found in the directory listing.
    pub discovered: usize,
    /// Episode pages fetched and merged this run.
    pub fetched: usize,
    /// Episodes skipped because transcript and date were already stored.
    pub skipped: usize,
    /// Episode pages that failed to fetch or had no publication date.
    pub failed: usize,
}

/// What one process-pending run did.
#[derive(Debug, Clone, Default)]
pub struct PendingReport {
    /// Episodes indexed this run.
    pub indexed: Vec<IndexResult>,
    /// Episodes that failed to index, with the failure text.
    pub failed: Vec<(i64, String)>,
}

/// Corpus counts for status displays.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStats {
    pub episodes: usize,
    pub processed: usize,
    pub units: usize,
}

impl Pipeline {
    /// Build the pipeline from settings, backed by SQLite and OpenAI.
    pub fn new(settings: &Settings) -> Result<Self> {
        let db_path = settings.db_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let store: Arc<dyn EpisodeStore> = Arc::new(SqliteEpisodeStore::new(&db_path)?);
        let vector_store: Arc<dyn VectorStore> = Arc::new(SqliteVectorStore::new(&db_path)?);

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        let generator: Arc<dyn Generator> = Arc::new(OpenAIGenerator::with_config(
            &settings.rag.model,
            settings.rag.temperature,
        ));

        Self::with_components(settings, store, vector_store, embedder, generator)
    }

    /// Build the pipeline around injected stores and model clients.
    pub fn with_components(
        settings: &Settings,
        store: Arc<dyn EpisodeStore>,
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let scraper = PodcastScraper::new(&settings.scraper)?;
        let tracker = Arc::new(EpisodeTracker::new(store.clone()));
        let retriever = Arc::new(EpisodeRetriever::new(vector_store.clone(), embedder.clone()));
        let indexer = EpisodeIndexer::new(store.clone(), vector_store.clone(), embedder);

        let answerer = Arc::new(AnswerSynthesizer::new(
            tracker.clone(),
            retriever.clone(),
            generator.clone(),
            prompts.clone(),
            &settings.general.podcast_name,
            settings.rag.answer_top_k as usize,
        ));
        let summarizer = SummarySynthesizer::new(tracker.clone(), retriever, generator, prompts);

        Ok(Self {
            scraper,
            store,
            vector_store,
            tracker,
            indexer,
            answerer,
            summarizer,
        })
    }

    /// Episode state reads for listing surfaces.
    pub fn tracker(&self) -> &EpisodeTracker {
        &self.tracker
    }

    /// Scrape the episode directory and fill in missing transcripts.
    ///
    /// Pass 1 upserts directory metadata for every discovered episode;
    /// the store's field-level merge keeps transcripts and dates fetched
    /// earlier. Pass 2 fetches episode pages for records still missing a
    /// transcript or date, bounded by `limit`. A page without its
    /// publication date counts as failed even when a transcript parsed,
    /// so no episode is ever stored half-filled.
    #[instrument(skip(self))]
    pub async fn sync(&self, limit: Option<usize>, only: Option<i64>) -> Result<SyncReport> {
        let mut refs = self.scraper.fetch_episode_list().await?;
        if let Some(n) = only {
            refs.retain(|r| r.episode_number == n);
            if refs.is_empty() {
                return Err(SvarError::EpisodeNotFound(n));
            }
        }

        let mut report = SyncReport {
            discovered: refs.len(),
            ..SyncReport::default()
        };

        for r in &refs {
            self.store
                .upsert(&Episode::new(r.episode_number, r.title.clone(), r.url.clone()))
                .await?;
        }

        let mut budget = limit.unwrap_or(usize::MAX);
        for r in &refs {
            let stored = self
                .store
                .get(r.episode_number)
                .await?
                .ok_or(SvarError::EpisodeNotFound(r.episode_number))?;

            if stored.has_transcript() && stored.published_date.is_some() {
                report.skipped += 1;
                continue;
            }
            if budget == 0 {
                break;
            }
            budget -= 1;

            match self.scraper.fetch_episode_page(&r.url).await {
                Ok(Some(page)) => {
                    let mut episode = stored;
                    if !page.transcript.is_empty() {
                        episode.transcript = Some(page.transcript);
                    }
                    episode.published_date = Some(page.published_date);
                    self.store.upsert(&episode).await?;
                    report.fetched += 1;
                }
                Ok(None) => {
                    report.failed += 1;
                }
                Err(e) => {
                    warn!("Failed to fetch episode {}: {}", r.episode_number, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Sync complete: {} discovered, {} fetched, {} skipped, {} failed",
            report.discovered, report.fetched, report.skipped, report.failed
        );
        Ok(report)
    }

    /// Index one episode's transcript into the vector store.
    pub async fn process_episode(&self, episode_number: i64) -> Result<IndexResult> {
        self.indexer.index(episode_number).await
    }

    /// Index every unprocessed episode that has a transcript.
    ///
    /// One episode failing does not stop the rest; failures come back in
    /// the report so the caller can surface them.
    #[instrument(skip(self))]
    pub async fn process_pending(&self) -> Result<PendingReport> {
        let pending: Vec<Episode> = self
            .store
            .list_all()
            .await?
            .into_iter()
            .filter(|e| !e.processed && e.has_transcript())
            .collect();

        let mut report = PendingReport::default();
        for episode in pending {
            match self.indexer.index(episode.episode_number).await {
                Ok(result) => report.indexed.push(result),
                Err(e) => {
                    warn!("Failed to index episode {}: {}", episode.episode_number, e);
                    report.failed.push((episode.episode_number, e.to_string()));
                }
            }
        }
        Ok(report)
    }

    /// Answer a question about one episode. Always returns displayable text.
    pub async fn answer(&self, question: &str, episode_number: i64) -> String {
        self.answerer.answer(question, episode_number).await
    }

    /// The episode's cached or freshly generated summary, if available.
    pub async fn summarize(&self, episode_number: i64) -> Option<String> {
        self.summarizer.summarize(episode_number).await
    }

    /// Start an ephemeral chat session scoped to one episode.
    ///
    /// Returns the session plus the episode so callers can warn when it
    /// has not been processed yet; None when the episode is unknown.
    pub async fn chat(&self, episode_number: i64) -> Option<(ChatSession, Episode)> {
        let episode = self.tracker.get(episode_number).await?;
        let session = ChatSession::new(self.answerer.clone(), episode_number, &episode.title);
        Some((session, episode))
    }

    /// Corpus counts, degrading to zero on read failure.
    pub async fn stats(&self) -> PipelineStats {
        let episodes = self.tracker.stats().await;
        let units = self.vector_store.unit_count().await.unwrap_or_default();
        PipelineStats {
            episodes: episodes.total,
            processed: episodes.processed,
            units,
        }
    }
}
