//! Vector store abstraction for Svar.
//!
//! Provides a trait-based interface for different vector database backends.
//! All retrieval is episode-scoped: the store applies the episode filter
//! before similarity ranking, so one episode's units can never surface in
//! another episode's results no matter how similar the text.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One retrievable chunk of an episode's transcript.
///
/// Units are immutable once created. The (episode_number, ordinal) pair
/// identifies a unit; ordinals are zero-based and contiguous per episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Episode this unit belongs to.
    pub episode_number: i64,
    /// Episode title at the time of segmentation.
    pub episode_title: String,
    /// Position of this paragraph within the episode, starting at 0.
    pub ordinal: u32,
    /// Raw paragraph text.
    pub text: String,
    /// URL of the episode page the paragraph came from.
    pub url: String,
}

/// A unit paired with its embedding vector, as stored for similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub unit: Unit,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this record was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl VectorRecord {
    /// Pair a unit with its embedding.
    pub fn new(unit: Unit, embedding: Vec<f32>) -> Self {
        Self {
            unit,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct ScoredUnit {
    /// The matched unit.
    pub unit: Unit,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store a record with its embedding.
    async fn upsert(&self, record: &VectorRecord) -> Result<()>;

    /// Bulk upsert records in a single transaction.
    async fn upsert_batch(&self, records: &[VectorRecord]) -> Result<usize>;

    /// Top-k similarity search restricted to one episode.
    ///
    /// Results come back in descending score order; equal scores are
    /// broken by ascending ordinal so repeated queries are reproducible.
    async fn search_episode(
        &self,
        episode_number: i64,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredUnit>>;

    /// All stored units for an episode, in ordinal order.
    async fn fetch_episode(&self, episode_number: i64) -> Result<Vec<Unit>>;

    /// Number of stored units for an episode.
    async fn episode_unit_count(&self, episode_number: i64) -> Result<usize>;

    /// Total stored unit count.
    async fn unit_count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Order scored units by descending score, then ascending ordinal.
pub(crate) fn sort_scored(results: &mut [ScoredUnit]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.unit.ordinal.cmp(&b.unit.ordinal))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_sort_scored_ties_by_ordinal() {
        let unit = |ordinal: u32| Unit {
            episode_number: 1,
            episode_title: "Test".to_string(),
            ordinal,
            text: format!("paragraph {}", ordinal),
            url: "https://example.com/podcast/1".to_string(),
        };

        let mut results = vec![
            ScoredUnit { unit: unit(2), score: 0.5 },
            ScoredUnit { unit: unit(0), score: 0.5 },
            ScoredUnit { unit: unit(1), score: 0.9 },
        ];
        sort_scored(&mut results);

        let ordinals: Vec<u32> = results.iter().map(|r| r.unit.ordinal).collect();
        assert_eq!(ordinals, vec![1, 0, 2]);
    }
}
