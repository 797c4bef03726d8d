//! SQLite-based episode store implementation.
//!
//! Shares a database file with the SQLite vector store; each store opens
//! its own connection and owns its own tables, and WAL mode keeps the two
//! connections from blocking each other.

use super::{Episode, EpisodeStore};
use crate::error::{Result, SvarError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

/// SQLite-based episode store.
pub struct SqliteEpisodeStore {
    conn: Mutex<Connection>,
}

impl SqliteEpisodeStore {
    /// Create a new SQLite episode store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        Self::create_tables(&conn)?;

        info!("Initialized SQLite episode store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite episode store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::create_tables(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn create_tables(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS episodes (
                episode_number INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                url TEXT NOT NULL,
                transcript TEXT,
                published_date TEXT,
                processed INTEGER NOT NULL DEFAULT 0,
                summary TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_episodes_processed ON episodes(processed);
            "#,
        )?;
        Ok(())
    }

    fn row_to_episode(row: &Row) -> rusqlite::Result<Episode> {
        let transcript_json: Option<String> = row.get(3)?;
        let created_at_str: String = row.get(7)?;
        let updated_at_str: String = row.get(8)?;

        Ok(Episode {
            episode_number: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            transcript: transcript_json.and_then(|s| serde_json::from_str(&s).ok()),
            published_date: row.get(4)?,
            processed: row.get::<_, i64>(5)? != 0,
            summary: row.get(6)?,
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

const EPISODE_COLUMNS: &str =
    "episode_number, title, url, transcript, published_date, processed, summary, created_at, updated_at";

#[async_trait]
impl EpisodeStore for SqliteEpisodeStore {
    #[instrument(skip(self, episode), fields(episode = episode.episode_number))]
    async fn upsert(&self, episode: &Episode) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::Store(format!("Failed to acquire lock: {}", e))
        })?;

        let transcript_json = episode
            .transcript
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            r#"
            INSERT INTO episodes
            (episode_number, title, url, transcript, published_date, processed, summary, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 0, NULL, ?6, ?6)
            ON CONFLICT(episode_number) DO UPDATE SET
                title = excluded.title,
                url = excluded.url,
                transcript = COALESCE(excluded.transcript, transcript),
                published_date = COALESCE(excluded.published_date, published_date),
                updated_at = excluded.updated_at
            "#,
            params![
                episode.episode_number,
                episode.title,
                episode.url,
                transcript_json,
                episode.published_date,
                Utc::now().to_rfc3339(),
            ],
        )?;

        debug!("Upserted episode {}", episode.episode_number);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, episode_number: i64) -> Result<Option<Episode>> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::Store(format!("Failed to acquire lock: {}", e))
        })?;

        let episode = conn.query_row(
            &format!("SELECT {} FROM episodes WHERE episode_number = ?1", EPISODE_COLUMNS),
            params![episode_number],
            Self::row_to_episode,
        );

        match episode {
            Ok(ep) => Ok(Some(ep)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Episode>> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::Store(format!("Failed to acquire lock: {}", e))
        })?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM episodes ORDER BY episode_number DESC",
            EPISODE_COLUMNS
        ))?;

        let episodes = stmt.query_map([], Self::row_to_episode)?;
        Ok(episodes.filter_map(|e| e.ok()).collect())
    }

    #[instrument(skip(self))]
    async fn list_processed(&self) -> Result<Vec<Episode>> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::Store(format!("Failed to acquire lock: {}", e))
        })?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM episodes WHERE processed = 1 ORDER BY episode_number DESC",
            EPISODE_COLUMNS
        ))?;

        let episodes = stmt.query_map([], Self::row_to_episode)?;
        Ok(episodes.filter_map(|e| e.ok()).collect())
    }

    #[instrument(skip(self))]
    async fn mark_processed(&self, episode_number: i64) -> Result<bool> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::Store(format!("Failed to acquire lock: {}", e))
        })?;

        // Conditional update doubles as a compare-and-swap on the flag
        let updated = conn.execute(
            "UPDATE episodes SET processed = 1, updated_at = ?2 WHERE episode_number = ?1 AND processed = 0",
            params![episode_number, Utc::now().to_rfc3339()],
        )?;

        Ok(updated > 0)
    }

    #[instrument(skip(self, summary))]
    async fn set_summary(&self, episode_number: i64, summary: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::Store(format!("Failed to acquire lock: {}", e))
        })?;

        let updated = conn.execute(
            "UPDATE episodes SET summary = ?2, updated_at = ?3 WHERE episode_number = ?1",
            params![episode_number, summary, Utc::now().to_rfc3339()],
        )?;

        if updated == 0 {
            return Err(SvarError::EpisodeNotFound(episode_number));
        }

        debug!("Stored summary for episode {}", episode_number);
        Ok(())
    }

    async fn episode_count(&self) -> Result<usize> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::Store(format!("Failed to acquire lock: {}", e))
        })?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM episodes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn processed_count(&self) -> Result<usize> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::Store(format!("Failed to acquire lock: {}", e))
        })?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM episodes WHERE processed = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
