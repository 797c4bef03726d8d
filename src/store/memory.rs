//! In-memory episode store implementation.
//!
//! Useful for testing. Mirrors the merge semantics of the SQLite store.

use super::{Episode, EpisodeStore};
use crate::error::{Result, SvarError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory episode store.
pub struct MemoryEpisodeStore {
    episodes: RwLock<HashMap<i64, Episode>>,
}

impl MemoryEpisodeStore {
    /// Create a new in-memory episode store.
    pub fn new() -> Self {
        Self {
            episodes: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryEpisodeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EpisodeStore for MemoryEpisodeStore {
    async fn upsert(&self, episode: &Episode) -> Result<()> {
        let mut episodes = self.episodes.write().unwrap();
        let now = Utc::now();

        match episodes.get_mut(&episode.episode_number) {
            Some(existing) => {
                existing.title = episode.title.clone();
                existing.url = episode.url.clone();
                if episode.transcript.is_some() {
                    existing.transcript = episode.transcript.clone();
                }
                if episode.published_date.is_some() {
                    existing.published_date = episode.published_date.clone();
                }
                existing.updated_at = now;
            }
            None => {
                let mut fresh = episode.clone();
                fresh.processed = false;
                fresh.summary = None;
                fresh.created_at = now;
                fresh.updated_at = now;
                episodes.insert(fresh.episode_number, fresh);
            }
        }
        Ok(())
    }

    async fn get(&self, episode_number: i64) -> Result<Option<Episode>> {
        let episodes = self.episodes.read().unwrap();
        Ok(episodes.get(&episode_number).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Episode>> {
        let episodes = self.episodes.read().unwrap();
        let mut all: Vec<Episode> = episodes.values().cloned().collect();
        all.sort_by(|a, b| b.episode_number.cmp(&a.episode_number));
        Ok(all)
    }

    async fn list_processed(&self) -> Result<Vec<Episode>> {
        let all = self.list_all().await?;
        Ok(all.into_iter().filter(|e| e.processed).collect())
    }

    async fn mark_processed(&self, episode_number: i64) -> Result<bool> {
        let mut episodes = self.episodes.write().unwrap();
        match episodes.get_mut(&episode_number) {
            Some(ep) if !ep.processed => {
                ep.processed = true;
                ep.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_summary(&self, episode_number: i64, summary: &str) -> Result<()> {
        let mut episodes = self.episodes.write().unwrap();
        match episodes.get_mut(&episode_number) {
            Some(ep) => {
                ep.summary = Some(summary.to_string());
                ep.updated_at = Utc::now();
                Ok(())
            }
            None => Err(SvarError::EpisodeNotFound(episode_number)),
        }
    }

    async fn episode_count(&self) -> Result<usize> {
        let episodes = self.episodes.read().unwrap();
        Ok(episodes.len())
    }

    async fn processed_count(&self) -> Result<usize> {
        let episodes = self.episodes.read().unwrap();
        Ok(episodes.values().filter(|e| e.processed).count())
    }
}
