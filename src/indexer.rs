//! Embedding indexer.
//!
//! Turns an episode's transcript into vector records and commits them to
//! the vector store as one batch. The processed flag only flips after the
//! whole batch is in; any embedding or store failure leaves the flag
//! unset so the episode stays eligible for a clean retry. The flag check
//! is also the idempotence guard: embeddings are billed per call, so an
//! already-processed episode returns immediately.

use crate::embedding::Embedder;
use crate::error::{Result, SvarError};
use crate::segment::segment_transcript;
use crate::store::EpisodeStore;
use crate::vector_store::{VectorRecord, VectorStore};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Indexes episode transcripts into the vector store.
pub struct EpisodeIndexer {
    store: Arc<dyn EpisodeStore>,
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
}

/// Outcome of indexing one episode.
#[derive(Debug, Clone)]
pub struct IndexResult {
    pub episode_number: i64,
    pub title: String,
    /// Number of units written to the vector store.
    pub units_indexed: usize,
    /// True when the episode was already processed and nothing ran.
    pub skipped: bool,
}

impl EpisodeIndexer {
    /// Create a new indexer.
    pub fn new(
        store: Arc<dyn EpisodeStore>,
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            store,
            vector_store,
            embedder,
        }
    }

    /// Index one episode's transcript.
    ///
    /// Two concurrent calls for the same episode can both pass the
    /// processed check and both pay for embeddings; the conditional flag
    /// flip lets only one observe success, and the (episode, ordinal) key
    /// makes the loser's writes overwrite in place rather than duplicate.
    /// That duplicate-spend window is accepted rather than locked against.
    #[instrument(skip(self))]
    pub async fn index(&self, episode_number: i64) -> Result<IndexResult> {
        let episode = self
            .store
            .get(episode_number)
            .await?
            .ok_or(SvarError::EpisodeNotFound(episode_number))?;

        if episode.processed {
            info!("Episode {} already processed", episode_number);
            return Ok(IndexResult {
                episode_number,
                title: episode.title,
                units_indexed: 0,
                skipped: true,
            });
        }

        let units = segment_transcript(&episode)?;
        info!(
            "Indexing episode {} ({} units)",
            episode_number,
            units.len()
        );

        let texts: Vec<String> = units.iter().map(|u| u.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != units.len() {
            return Err(SvarError::Embedding(format!(
                "Expected {} embeddings, got {}",
                units.len(),
                embeddings.len()
            )));
        }

        let records: Vec<VectorRecord> = units
            .into_iter()
            .zip(embeddings)
            .map(|(unit, embedding)| VectorRecord::new(unit, embedding))
            .collect();

        let units_indexed = self.vector_store.upsert_batch(&records).await?;

        // Flag flips only once every unit is committed
        let flipped = self.store.mark_processed(episode_number).await?;
        if !flipped {
            debug!(
                "Episode {} was marked processed by a concurrent indexer",
                episode_number
            );
        }

        info!(
            "Successfully processed episode {} ({} units)",
            episode_number, units_indexed
        );

        Ok(IndexResult {
            episode_number,
            title: episode.title,
            units_indexed,
            skipped: false,
        })
    }
}
