//! OpenAI-backed embedding of questions and transcript paragraphs.

use super::Embedder;
use crate::error::{Result, SvarError};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Paragraphs sent per embedding request. The API caps inputs per call,
/// and a long episode transcript runs to several hundred paragraphs.
const PARAGRAPHS_PER_REQUEST: usize = 100;

/// Embeds text through the OpenAI embeddings API.
///
/// Indexing pushes whole transcripts through `embed_batch`; retrieval
/// embeds one question at a time through `embed`. Both go through the
/// same pinned model and dimension count, so question vectors stay
/// comparable with the paragraph vectors stored at indexing time.
pub struct OpenAIEmbedder {
    client: async_openai::Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Create an embedder with the default model and dimensions.
    pub fn new() -> Self {
        Self::with_config("text-embedding-3-small", 1536)
    }

    /// Create an embedder pinned to a specific model and dimension count.
    pub fn with_config(model: &str, dimensions: usize) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            dimensions,
        }
    }

    /// One embeddings API round trip.
    ///
    /// Vectors come back sorted by input index, and a response that does
    /// not cover every input is an error; the indexer relies on one
    /// vector per paragraph before it writes anything.
    async fn request(&self, input: EmbeddingInput, expected: usize) -> Result<Vec<Vec<f32>>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(input)
            .dimensions(self.dimensions as u32)
            .build()
            .map_err(|e| SvarError::Embedding(e.to_string()))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| SvarError::Embedding(format!("API request failed: {}", e)))?;

        if response.data.len() != expected {
            return Err(SvarError::Embedding(format!(
                "Expected {} embeddings, received {}",
                expected,
                response.data.len()
            )));
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

impl Default for OpenAIEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self
            .request(EmbeddingInput::String(text.to_string()), 1)
            .await?;
        vectors
            .pop()
            .ok_or_else(|| SvarError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for paragraphs in texts.chunks(PARAGRAPHS_PER_REQUEST) {
            let batch = self
                .request(
                    EmbeddingInput::StringArray(paragraphs.to_vec()),
                    paragraphs.len(),
                )
                .await?;
            vectors.extend(batch);
        }

        debug!("Embedded {} paragraphs", vectors.len());
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
