//! Grounded question answering for a single episode.

use super::format_context;
use crate::config::Prompts;
use crate::error::Result;
use crate::generation::Generator;
use crate::retriever::EpisodeRetriever;
use crate::store::Episode;
use crate::tracker::EpisodeTracker;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Returned when anything downstream of the state checks fails. Callers
/// see a string either way; the underlying error goes to the log.
const ANSWER_FAILURE: &str =
    "I encountered an error while processing your question. Please try again.";

/// Answers questions about one episode from its retrieved transcript units.
///
/// `answer` always returns a displayable string. Episodes that are
/// missing or not yet indexed get a fixed explanation without any
/// retrieval or generation spend. Whether retrieved context actually
/// suffices is judged by the model under the prompt's instruction to
/// decline rather than fabricate.
pub struct AnswerSynthesizer {
    tracker: Arc<EpisodeTracker>,
    retriever: Arc<EpisodeRetriever>,
    generator: Arc<dyn Generator>,
    prompts: Prompts,
    podcast_name: String,
    top_k: usize,
}

impl AnswerSynthesizer {
    /// Create a new answer synthesizer.
    pub fn new(
        tracker: Arc<EpisodeTracker>,
        retriever: Arc<EpisodeRetriever>,
        generator: Arc<dyn Generator>,
        prompts: Prompts,
        podcast_name: &str,
        top_k: usize,
    ) -> Self {
        Self {
            tracker,
            retriever,
            generator,
            prompts,
            podcast_name: podcast_name.to_string(),
            top_k,
        }
    }

    /// Answer a question about the given episode.
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn answer(&self, question: &str, episode_number: i64) -> String {
        let Some(episode) = self.tracker.get(episode_number).await else {
            return format!(
                "Episode {} not found in database. Please process it first.",
                episode_number
            );
        };

        if !episode.processed {
            return format!(
                "Episode {} has not been processed yet. Please process it first.",
                episode_number
            );
        }

        match self.generate(question, &episode).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(
                    "Error answering question for episode {}: {}",
                    episode_number, e
                );
                ANSWER_FAILURE.to_string()
            }
        }
    }

    async fn generate(&self, question: &str, episode: &Episode) -> Result<String> {
        let retrieved = self
            .retriever
            .retrieve(question, episode.episode_number, self.top_k)
            .await?;
        info!(
            "Answering with {} retrieved units for episode {}",
            retrieved.len(),
            episode.episode_number
        );

        let context = format_context(retrieved.iter().map(|r| r.unit.text.as_str()));

        let mut vars = HashMap::new();
        vars.insert("podcast".to_string(), self.podcast_name.clone());
        vars.insert("title".to_string(), episode.title.clone());
        vars.insert("context".to_string(), context);
        vars.insert("question".to_string(), question.to_string());

        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.answer.template, &vars);

        self.generator.complete(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::error::SvarError;
    use crate::store::{EpisodeStore, MemoryEpisodeStore};
    use crate::vector_store::{MemoryVectorStore, Unit, VectorRecord, VectorStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, _text: &str) -> crate::error::Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> crate::error::Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Records every prompt it is asked to complete.
    struct RecordingGenerator {
        prompts: Mutex<Vec<String>>,
        reply: String,
    }

    impl RecordingGenerator {
        fn new(reply: &str) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                reply: reply.to_string(),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Generator for RecordingGenerator {
        async fn complete(&self, prompt: &str) -> crate::error::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        async fn complete(&self, _prompt: &str) -> crate::error::Result<String> {
            Err(SvarError::Generation("model unavailable".to_string()))
        }
    }

    struct Fixture {
        embedder: Arc<CountingEmbedder>,
        store: Arc<MemoryEpisodeStore>,
        vectors: Arc<MemoryVectorStore>,
    }

    impl Fixture {
        async fn new() -> Self {
            let fixture = Self {
                embedder: Arc::new(CountingEmbedder {
                    calls: AtomicUsize::new(0),
                }),
                store: Arc::new(MemoryEpisodeStore::new()),
                vectors: Arc::new(MemoryVectorStore::new()),
            };

            let mut ep = Episode::new(
                42,
                "Episode 42: Factor Investing".to_string(),
                "https://example.com/podcast/42".to_string(),
            );
            ep.transcript = Some(vec![
                "Intro text.".to_string(),
                "Middle text.".to_string(),
                "Outro text.".to_string(),
            ]);
            fixture.store.upsert(&ep).await.unwrap();

            let mut unprocessed = Episode::new(
                7,
                "Episode 7".to_string(),
                "https://example.com/podcast/7".to_string(),
            );
            unprocessed.transcript = None;
            fixture.store.upsert(&unprocessed).await.unwrap();

            fixture
        }

        async fn index_42(&self) {
            for (i, text) in ["Intro text.", "Middle text.", "Outro text."]
                .iter()
                .enumerate()
            {
                self.vectors
                    .upsert(&VectorRecord::new(
                        Unit {
                            episode_number: 42,
                            episode_title: "Episode 42: Factor Investing".to_string(),
                            ordinal: i as u32,
                            text: text.to_string(),
                            url: "https://example.com/podcast/42".to_string(),
                        },
                        vec![1.0, 0.0],
                    ))
                    .await
                    .unwrap();
            }
            self.store.mark_processed(42).await.unwrap();
        }

        fn synthesizer(&self, generator: Arc<dyn Generator>) -> AnswerSynthesizer {
            AnswerSynthesizer::new(
                Arc::new(EpisodeTracker::new(self.store.clone())),
                Arc::new(EpisodeRetriever::new(
                    self.vectors.clone(),
                    self.embedder.clone(),
                )),
                generator,
                Prompts::default(),
                "Rational Reminder",
                2,
            )
        }
    }

    #[tokio::test]
    async fn test_unknown_episode_returns_fixed_message_without_calls() {
        let fixture = Fixture::new().await;
        let generator = Arc::new(RecordingGenerator::new("unused"));
        let synthesizer = fixture.synthesizer(generator.clone());

        let answer = synthesizer.answer("anything", 999).await;

        assert_eq!(
            answer,
            "Episode 999 not found in database. Please process it first."
        );
        assert_eq!(fixture.embedder.calls.load(Ordering::SeqCst), 0);
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_unprocessed_episode_returns_fixed_message_without_calls() {
        let fixture = Fixture::new().await;
        let generator = Arc::new(RecordingGenerator::new("unused"));
        let synthesizer = fixture.synthesizer(generator.clone());

        let answer = synthesizer.answer("anything", 7).await;

        assert_eq!(
            answer,
            "Episode 7 has not been processed yet. Please process it first."
        );
        assert_eq!(fixture.embedder.calls.load(Ordering::SeqCst), 0);
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_answer_grounds_prompt_in_retrieved_units() {
        let fixture = Fixture::new().await;
        fixture.index_42().await;
        let generator = Arc::new(RecordingGenerator::new("Markets were discussed."));
        let synthesizer = fixture.synthesizer(generator.clone());

        let answer = synthesizer.answer("What is discussed?", 42).await;

        assert_eq!(answer, "Markets were discussed.");

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        let prompt = &prompts[0];
        assert!(prompt.contains("Rational Reminder"));
        assert!(prompt.contains("Episode 42: Factor Investing"));
        assert!(prompt.contains("What is discussed?"));
        // Top-k is 2, so exactly two of the three units appear
        let included = ["Intro text.", "Middle text.", "Outro text."]
            .iter()
            .filter(|t| prompt.contains(*t))
            .count();
        assert_eq!(included, 2);
        assert!(prompt.contains("rather than making up information"));
    }

    #[tokio::test]
    async fn test_generation_failure_returns_fixed_error_string() {
        let fixture = Fixture::new().await;
        fixture.index_42().await;
        let synthesizer = fixture.synthesizer(Arc::new(FailingGenerator));

        let answer = synthesizer.answer("What is discussed?", 42).await;

        assert_eq!(answer, ANSWER_FAILURE);
    }
}
