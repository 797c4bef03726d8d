//! Episode-scoped retrieval.
//!
//! Embeds the query and ranks one episode's stored units by similarity.
//! The episode filter is applied by the vector store before ranking, so
//! results can never contain another episode's units. An empty result
//! means the episode has nothing relevant stored; callers treat that as
//! insufficient context, not as a failure.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{ScoredUnit, Unit, VectorStore};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Retrieves transcript units for one episode.
pub struct EpisodeRetriever {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
}

impl EpisodeRetriever {
    /// Create a new retriever.
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
        }
    }

    /// Top-k most similar units for a query, restricted to one episode.
    ///
    /// Results are ordered by descending similarity; equal scores fall
    /// back to ascending ordinal. `k = 0` short-circuits to an empty
    /// result without spending an embedding call.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn retrieve(
        &self,
        query: &str,
        episode_number: i64,
        k: usize,
    ) -> Result<Vec<ScoredUnit>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let results = self
            .vector_store
            .search_episode(episode_number, &query_embedding, k)
            .await?;

        debug!(
            "Retrieved {} units for episode {}",
            results.len(),
            episode_number
        );
        Ok(results)
    }

    /// Every stored unit for an episode, in ordinal order.
    ///
    /// Summary generation wants the whole episode rather than a
    /// similarity sample, and ordinal order reads as the transcript does.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self, episode_number: i64) -> Result<Vec<Unit>> {
        self.vector_store.fetch_episode(episode_number).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SvarError;
    use crate::vector_store::{MemoryVectorStore, VectorRecord};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds "intro"-like text along one axis and everything else along
    /// the other, so similarity ordering is predictable in tests.
    struct AxisEmbedder {
        calls: AtomicUsize,
    }

    impl AxisEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn vector_for(text: &str) -> Vec<f32> {
            if text.contains("intro") {
                vec![1.0, 0.0]
            } else {
                vec![0.0, 1.0]
            }
        }
    }

    #[async_trait]
    impl Embedder for AxisEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::vector_for(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn record(episode: i64, ordinal: u32, text: &str) -> VectorRecord {
        VectorRecord::new(
            Unit {
                episode_number: episode,
                episode_title: format!("Episode {}", episode),
                ordinal,
                text: text.to_string(),
                url: format!("https://example.com/podcast/{}", episode),
            },
            AxisEmbedder::vector_for(text),
        )
    }

    async fn seeded_retriever() -> (EpisodeRetriever, Arc<AxisEmbedder>) {
        let store = Arc::new(MemoryVectorStore::new());
        store
            .upsert_batch(&[
                record(42, 0, "the intro segment"),
                record(42, 1, "a discussion of markets"),
                record(42, 2, "closing remarks"),
                record(7, 0, "another intro segment"),
            ])
            .await
            .unwrap();

        let embedder = Arc::new(AxisEmbedder::new());
        (EpisodeRetriever::new(store, embedder.clone()), embedder)
    }

    #[tokio::test]
    async fn test_retrieve_is_scoped_and_ranked() {
        let (retriever, _) = seeded_retriever().await;

        let results = retriever.retrieve("intro music", 42, 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.unit.episode_number == 42));
        assert_eq!(results[0].unit.ordinal, 0);
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_retrieve_k_zero_skips_embedding() {
        let (retriever, embedder) = seeded_retriever().await;

        let results = retriever.retrieve("anything", 42, 0).await.unwrap();

        assert!(results.is_empty());
        assert_eq!(embedder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_retrieve_unknown_episode_is_empty_not_error() {
        let (retriever, _) = seeded_retriever().await;

        let results = retriever.retrieve("intro", 999, 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_caps_at_k() {
        let (retriever, _) = seeded_retriever().await;

        let results = retriever.retrieve("markets", 42, 10).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_all_returns_transcript_order() {
        let (retriever, embedder) = seeded_retriever().await;

        let units = retriever.fetch_all(42).await.unwrap();

        let ordinals: Vec<u32> = units.iter().map(|u| u.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        assert_eq!(embedder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        struct BrokenEmbedder;

        #[async_trait]
        impl Embedder for BrokenEmbedder {
            async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
                Err(SvarError::Embedding("service down".to_string()))
            }

            async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
                Err(SvarError::Embedding("service down".to_string()))
            }

            fn dimensions(&self) -> usize {
                2
            }
        }

        let retriever =
            EpisodeRetriever::new(Arc::new(MemoryVectorStore::new()), Arc::new(BrokenEmbedder));

        let err = retriever.retrieve("query", 42, 4).await.unwrap_err();
        assert!(matches!(err, SvarError::Embedding(_)));
    }
}
