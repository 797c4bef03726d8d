//! Text generation for answer and summary synthesis.
//!
//! The trait seam exists so synthesis logic can be exercised in tests
//! with canned generators instead of a live model.

mod openai;

pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for text completion.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Complete a rendered prompt into text, single request/response.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
