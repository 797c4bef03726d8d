//! Episode store abstraction for Svar.
//!
//! Episodes are keyed by their externally assigned episode number. The
//! store guarantees field-level merge on upsert: a metadata-only refresh
//! from the episode directory never wipes out a transcript or publication
//! date that an earlier sync already fetched. The processed flag and the
//! cached summary are never written by upsert at all; they change only
//! through their dedicated methods.

mod memory;
mod sqlite;

pub use memory::MemoryEpisodeStore;
pub use sqlite::SqliteEpisodeStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A podcast episode as tracked by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Externally assigned episode number; unique and stable.
    pub episode_number: i64,
    /// Episode title.
    pub title: String,
    /// URL of the episode page.
    pub url: String,
    /// Transcript paragraphs, absent until the episode page was fetched.
    pub transcript: Option<Vec<String>>,
    /// Publication date as scraped (ISO-8601 text).
    pub published_date: Option<String>,
    /// True once all transcript units are in the vector index.
    pub processed: bool,
    /// Cached structured summary.
    pub summary: Option<String>,
    /// When this record was first stored.
    pub created_at: DateTime<Utc>,
    /// When this record was last written.
    pub updated_at: DateTime<Utc>,
}

impl Episode {
    /// Create a new unprocessed episode from directory metadata.
    pub fn new(episode_number: i64, title: String, url: String) -> Self {
        let now = Utc::now();
        Self {
            episode_number,
            title,
            url,
            transcript: None,
            published_date: None,
            processed: false,
            summary: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the episode has a non-empty transcript.
    pub fn has_transcript(&self) -> bool {
        self.transcript.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// Trait for episode store implementations.
#[async_trait]
pub trait EpisodeStore: Send + Sync {
    /// Insert or update an episode by its episode number.
    ///
    /// Title and URL always take the incoming values. Transcript and
    /// publication date only overwrite when the incoming record has them.
    /// The processed flag and summary are ignored here; new rows start
    /// unprocessed with no summary.
    async fn upsert(&self, episode: &Episode) -> Result<()>;

    /// Fetch an episode by number.
    async fn get(&self, episode_number: i64) -> Result<Option<Episode>>;

    /// All episodes, newest first (descending episode number).
    async fn list_all(&self) -> Result<Vec<Episode>>;

    /// Processed episodes only, newest first.
    async fn list_processed(&self) -> Result<Vec<Episode>>;

    /// Flip the processed flag, but only if it is currently unset.
    ///
    /// Returns true when this call performed the flip. A false return
    /// means the episode was already processed or does not exist, which
    /// lets concurrent indexers detect that they lost the race.
    async fn mark_processed(&self, episode_number: i64) -> Result<bool>;

    /// Store the cached summary for an episode.
    async fn set_summary(&self, episode_number: i64, summary: &str) -> Result<()>;

    /// Total number of tracked episodes.
    async fn episode_count(&self) -> Result<usize>;

    /// Number of processed episodes.
    async fn processed_count(&self) -> Result<usize>;
}
