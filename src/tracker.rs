//! Episode state tracking.
//!
//! Thin view over the episode store that the synthesizers and the UI
//! consult. Listings come back newest first. Read failures degrade to
//! empty results instead of propagating, so a broken database renders as
//! "no episodes" rather than a crash; the underlying error is logged.
//! The processed flag and summary writes used by the indexing path go
//! through the store directly and do propagate their failures.

use crate::store::{Episode, EpisodeStore};
use std::sync::Arc;
use tracing::{error, instrument};

/// Per-episode processing state and summary cache.
pub struct EpisodeTracker {
    store: Arc<dyn EpisodeStore>,
}

/// Episode counts for status displays.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpisodeStats {
    pub total: usize,
    pub processed: usize,
}

impl EpisodeTracker {
    /// Create a tracker over the given store.
    pub fn new(store: Arc<dyn EpisodeStore>) -> Self {
        Self { store }
    }

    /// Fetch one episode, or None when absent or unreadable.
    #[instrument(skip(self))]
    pub async fn get(&self, episode_number: i64) -> Option<Episode> {
        match self.store.get(episode_number).await {
            Ok(episode) => episode,
            Err(e) => {
                error!("Error retrieving episode {}: {}", episode_number, e);
                None
            }
        }
    }

    /// All tracked episodes, newest first.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Vec<Episode> {
        match self.store.list_all().await {
            Ok(episodes) => episodes,
            Err(e) => {
                error!("Error retrieving episodes: {}", e);
                Vec::new()
            }
        }
    }

    /// Processed episodes only, newest first.
    #[instrument(skip(self))]
    pub async fn list_processed(&self) -> Vec<Episode> {
        match self.store.list_processed().await {
            Ok(episodes) => episodes,
            Err(e) => {
                error!("Error retrieving processed episodes: {}", e);
                Vec::new()
            }
        }
    }

    /// Persist a generated summary. Returns false when the write failed;
    /// the caller still holds the fresh summary text either way.
    #[instrument(skip(self, summary))]
    pub async fn set_summary(&self, episode_number: i64, summary: &str) -> bool {
        match self.store.set_summary(episode_number, summary).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error updating summary for episode {}: {}", episode_number, e);
                false
            }
        }
    }

    /// Episode counts, degrading to zero on read failure.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> EpisodeStats {
        let total = self.store.episode_count().await.unwrap_or_else(|e| {
            error!("Error counting episodes: {}", e);
            0
        });
        let processed = self.store.processed_count().await.unwrap_or_else(|e| {
            error!("Error counting processed episodes: {}", e);
            0
        });
        EpisodeStats { total, processed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SvarError};
    use crate::store::MemoryEpisodeStore;
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl EpisodeStore for FailingStore {
        async fn upsert(&self, _episode: &Episode) -> Result<()> {
            Err(SvarError::Store("down".to_string()))
        }
        async fn get(&self, _episode_number: i64) -> Result<Option<Episode>> {
            Err(SvarError::Store("down".to_string()))
        }
        async fn list_all(&self) -> Result<Vec<Episode>> {
            Err(SvarError::Store("down".to_string()))
        }
        async fn list_processed(&self) -> Result<Vec<Episode>> {
            Err(SvarError::Store("down".to_string()))
        }
        async fn mark_processed(&self, _episode_number: i64) -> Result<bool> {
            Err(SvarError::Store("down".to_string()))
        }
        async fn set_summary(&self, _episode_number: i64, _summary: &str) -> Result<()> {
            Err(SvarError::Store("down".to_string()))
        }
        async fn episode_count(&self) -> Result<usize> {
            Err(SvarError::Store("down".to_string()))
        }
        async fn processed_count(&self) -> Result<usize> {
            Err(SvarError::Store("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_reads_degrade_to_empty_on_store_failure() {
        let tracker = EpisodeTracker::new(Arc::new(FailingStore));

        assert!(tracker.get(42).await.is_none());
        assert!(tracker.list_all().await.is_empty());
        assert!(tracker.list_processed().await.is_empty());
        assert!(!tracker.set_summary(42, "text").await);

        let stats = tracker.stats().await;
        assert_eq!(stats.total, 0);
        assert_eq!(stats.processed, 0);
    }

    #[tokio::test]
    async fn test_tracker_passes_through_store_state() {
        let store = Arc::new(MemoryEpisodeStore::new());
        let tracker = EpisodeTracker::new(store.clone());

        for n in [1, 2, 3] {
            store
                .upsert(&Episode::new(
                    n,
                    format!("Episode {}", n),
                    format!("https://example.com/podcast/{}", n),
                ))
                .await
                .unwrap();
        }
        store.mark_processed(2).await.unwrap();

        let all: Vec<i64> = tracker
            .list_all()
            .await
            .iter()
            .map(|e| e.episode_number)
            .collect();
        assert_eq!(all, vec![3, 2, 1]);

        let processed: Vec<i64> = tracker
            .list_processed()
            .await
            .iter()
            .map(|e| e.episode_number)
            .collect();
        assert_eq!(processed, vec![2]);

        assert!(tracker.get(1).await.is_some());
        assert!(tracker.get(99).await.is_none());

        assert!(tracker.set_summary(1, "A summary.").await);
        assert_eq!(
            tracker.get(1).await.unwrap().summary.as_deref(),
            Some("A summary.")
        );

        let stats = tracker.stats().await;
        assert_eq!(stats.total, 3);
        assert_eq!(stats.processed, 1);
    }
}
