//! Svar - Podcast Transcript QA
//!
//! A CLI tool for asking grounded questions about podcast episodes.
//!
//! The name "Svar" comes from the Norwegian word for "answer."
//!
//! # Overview
//!
//! Svar allows you to:
//! - Scrape podcast episode listings and transcripts
//! - Index transcripts into an episode-scoped vector store
//! - Ask questions about one episode and get grounded answers
//! - Generate and cache structured episode summaries
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `scraper` - Episode directory and transcript scraping
//! - `store` - Episode record persistence
//! - `segment` - Transcript segmentation into retrievable units
//! - `embedding` - Embedding generation
//! - `vector_store` - Episode-scoped vector storage and search
//! - `indexer` - Transcript indexing with idempotence via the processed flag
//! - `tracker` - Episode state reads for listing surfaces
//! - `retriever` - Episode-scoped top-k retrieval
//! - `generation` - Text completion
//! - `rag` - Answer, summary, and chat synthesis
//! - `pipeline` - Service object wiring everything together
//!
//! # Example
//!
//! ```rust,no_run
//! use svar::config::Settings;
//! use svar::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(&settings)?;
//!
//!     // Index an episode, then ask about it
//!     let result = pipeline.process_episode(42).await?;
//!     println!("Indexed {} units", result.units_indexed);
//!
//!     let answer = pipeline.answer("What is discussed?", 42).await;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod indexer;
pub mod openai;
pub mod pipeline;
pub mod rag;
pub mod retriever;
pub mod scraper;
pub mod segment;
pub mod store;
pub mod tracker;
pub mod vector_store;

pub use error::{Result, SvarError};
pub use pipeline::Pipeline;
