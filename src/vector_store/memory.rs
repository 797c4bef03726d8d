//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, sort_scored, ScoredUnit, Unit, VectorRecord, VectorStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store keyed by (episode_number, ordinal).
pub struct MemoryVectorStore {
    records: RwLock<HashMap<(i64, u32), VectorRecord>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, record: &VectorRecord) -> Result<()> {
        let mut records = self.records.write().unwrap();
        records.insert(
            (record.unit.episode_number, record.unit.ordinal),
            record.clone(),
        );
        Ok(())
    }

    async fn upsert_batch(&self, batch: &[VectorRecord]) -> Result<usize> {
        let mut records = self.records.write().unwrap();
        for record in batch {
            records.insert(
                (record.unit.episode_number, record.unit.ordinal),
                record.clone(),
            );
        }
        Ok(batch.len())
    }

    async fn search_episode(
        &self,
        episode_number: i64,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredUnit>> {
        let records = self.records.read().unwrap();

        let mut results: Vec<ScoredUnit> = records
            .values()
            .filter(|r| r.unit.episode_number == episode_number)
            .map(|r| {
                let score = cosine_similarity(query_embedding, &r.embedding);
                ScoredUnit {
                    unit: r.unit.clone(),
                    score,
                }
            })
            .collect();

        sort_scored(&mut results);
        results.truncate(k);

        Ok(results)
    }

    async fn fetch_episode(&self, episode_number: i64) -> Result<Vec<Unit>> {
        let records = self.records.read().unwrap();
        let mut units: Vec<Unit> = records
            .values()
            .filter(|r| r.unit.episode_number == episode_number)
            .map(|r| r.unit.clone())
            .collect();
        units.sort_by_key(|u| u.ordinal);
        Ok(units)
    }

    async fn episode_unit_count(&self, episode_number: i64) -> Result<usize> {
        let records = self.records.read().unwrap();
        Ok(records
            .values()
            .filter(|r| r.unit.episode_number == episode_number)
            .count())
    }

    async fn unit_count(&self) -> Result<usize> {
        let records = self.records.read().unwrap();
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(episode: i64, ordinal: u32, text: &str, embedding: Vec<f32>) -> VectorRecord {
        VectorRecord::new(
            Unit {
                episode_number: episode,
                episode_title: format!("Episode {}", episode),
                ordinal,
                text: text.to_string(),
                url: format!("https://example.com/podcast/{}", episode),
            },
            embedding,
        )
    }

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        store
            .upsert_batch(&[
                record(1, 0, "Hello world", vec![1.0, 0.0, 0.0]),
                record(1, 1, "Goodbye world", vec![0.0, 1.0, 0.0]),
            ])
            .await
            .unwrap();

        assert_eq!(store.unit_count().await.unwrap(), 2);

        let results = store.search_episode(1, &[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score > results[1].score);
        assert_eq!(results[0].unit.text, "Hello world");
    }

    #[tokio::test]
    async fn test_search_never_leaks_other_episodes() {
        let store = MemoryVectorStore::new();

        store
            .upsert_batch(&[
                record(1, 0, "identical text", vec![1.0, 0.0]),
                record(2, 0, "identical text", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = store.search_episode(1, &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].unit.episode_number, 1);

        let none = store.search_episode(3, &[1.0, 0.0], 10).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_equal_scores_order_by_ordinal() {
        let store = MemoryVectorStore::new();

        // Identical embeddings produce identical scores
        store
            .upsert_batch(&[
                record(1, 3, "d", vec![1.0, 0.0]),
                record(1, 1, "b", vec![1.0, 0.0]),
                record(1, 2, "c", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = store.search_episode(1, &[1.0, 0.0], 2).await.unwrap();
        let ordinals: Vec<u32> = results.iter().map(|r| r.unit.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2]);
    }
}
