//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! Similarity search only ever runs over one episode's rows (a few hundred
//! paragraphs), so a linear scan of the pre-filtered set is plenty. For
//! corpus-wide search over large datasets, consider the sqlite-vec
//! extension or a dedicated vector database.

use super::{cosine_similarity, sort_scored, ScoredUnit, Unit, VectorRecord, VectorStore};
use crate::error::{Result, SvarError};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

/// SQLite-based vector store.
///
/// Units are keyed by (episode_number, ordinal), so re-upserting an
/// episode's units overwrites rows in place rather than duplicating them.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
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

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
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
            CREATE TABLE IF NOT EXISTS units (
                episode_number INTEGER NOT NULL,
                ordinal INTEGER NOT NULL,
                episode_title TEXT NOT NULL,
                text TEXT NOT NULL,
                url TEXT NOT NULL,
                embedding BLOB NOT NULL,
                indexed_at TEXT NOT NULL,
                PRIMARY KEY (episode_number, ordinal)
            );

            CREATE INDEX IF NOT EXISTS idx_units_episode ON units(episode_number);
            "#,
        )?;
        Ok(())
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding
            .iter()
            .flat_map(|f| f.to_le_bytes())
            .collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, record))]
    async fn upsert(&self, record: &VectorRecord) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let embedding_bytes = Self::embedding_to_bytes(&record.embedding);

        conn.execute(
            r#"
            INSERT OR REPLACE INTO units
            (episode_number, ordinal, episode_title, text, url, embedding, indexed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.unit.episode_number,
                record.unit.ordinal,
                record.unit.episode_title,
                record.unit.text,
                record.unit.url,
                embedding_bytes,
                record.indexed_at.to_rfc3339(),
            ],
        )?;

        debug!(
            "Upserted unit {}/{}",
            record.unit.episode_number, record.unit.ordinal
        );
        Ok(())
    }

    #[instrument(skip(self, records))]
    async fn upsert_batch(&self, records: &[VectorRecord]) -> Result<usize> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let tx = conn.unchecked_transaction()?;

        for record in records {
            let embedding_bytes = Self::embedding_to_bytes(&record.embedding);

            tx.execute(
                r#"
                INSERT OR REPLACE INTO units
                (episode_number, ordinal, episode_title, text, url, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    record.unit.episode_number,
                    record.unit.ordinal,
                    record.unit.episode_title,
                    record.unit.text,
                    record.unit.url,
                    embedding_bytes,
                    record.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Batch upserted {} units", records.len());
        Ok(records.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_episode(
        &self,
        episode_number: i64,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredUnit>> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let mut stmt = conn.prepare(
            r#"
            SELECT episode_number, ordinal, episode_title, text, url, embedding
            FROM units
            WHERE episode_number = ?1
            "#,
        )?;

        let records = stmt.query_map(params![episode_number], |row| {
            let embedding_bytes: Vec<u8> = row.get(5)?;

            Ok((
                Unit {
                    episode_number: row.get(0)?,
                    ordinal: row.get(1)?,
                    episode_title: row.get(2)?,
                    text: row.get(3)?,
                    url: row.get(4)?,
                },
                Self::bytes_to_embedding(&embedding_bytes),
            ))
        })?;

        let mut results: Vec<ScoredUnit> = records
            .filter_map(|r| r.ok())
            .map(|(unit, embedding)| {
                let score = cosine_similarity(query_embedding, &embedding);
                ScoredUnit { unit, score }
            })
            .collect();

        sort_scored(&mut results);
        results.truncate(k);

        debug!(
            "Found {} matching units for episode {}",
            results.len(),
            episode_number
        );
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn fetch_episode(&self, episode_number: i64) -> Result<Vec<Unit>> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let mut stmt = conn.prepare(
            r#"
            SELECT episode_number, ordinal, episode_title, text, url
            FROM units
            WHERE episode_number = ?1
            ORDER BY ordinal
            "#,
        )?;

        let units = stmt.query_map(params![episode_number], |row| {
            Ok(Unit {
                episode_number: row.get(0)?,
                ordinal: row.get(1)?,
                episode_title: row.get(2)?,
                text: row.get(3)?,
                url: row.get(4)?,
            })
        })?;

        let result: Vec<Unit> = units.filter_map(|u| u.ok()).collect();
        debug!(
            "Fetched {} units for episode {}",
            result.len(),
            episode_number
        );
        Ok(result)
    }

    async fn episode_unit_count(&self, episode_number: i64) -> Result<usize> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM units WHERE episode_number = ?1",
            params![episode_number],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    async fn unit_count(&self) -> Result<usize> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM units", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
