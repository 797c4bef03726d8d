//! Ephemeral chat sessions scoped to one episode.

use super::AnswerSynthesizer;
use std::sync::Arc;

/// Who spoke a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One utterance in a chat session.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// An in-memory conversation about one episode.
///
/// The history exists for display only: every question is answered
/// independently against the episode's indexed transcript, so earlier
/// turns never influence later answers and clearing the history changes
/// nothing but the screen. Nothing here is persisted.
pub struct ChatSession {
    answerer: Arc<AnswerSynthesizer>,
    episode_number: i64,
    episode_title: String,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    /// Start a session for one episode.
    pub fn new(answerer: Arc<AnswerSynthesizer>, episode_number: i64, episode_title: &str) -> Self {
        Self {
            answerer,
            episode_number,
            episode_title: episode_title.to_string(),
            history: Vec::new(),
        }
    }

    /// The episode this session is scoped to.
    pub fn episode_number(&self) -> i64 {
        self.episode_number
    }

    /// Title of the episode this session is scoped to.
    pub fn episode_title(&self) -> &str {
        &self.episode_title
    }

    /// The turns exchanged so far, oldest first.
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Ask a question, record both turns, and return the answer.
    pub async fn ask(&mut self, question: &str) -> String {
        let answer = self.answerer.answer(question, self.episode_number).await;

        self.history.push(ChatTurn {
            role: ChatRole::User,
            content: question.to_string(),
        });
        self.history.push(ChatTurn {
            role: ChatRole::Assistant,
            content: answer.clone(),
        });

        answer
    }

    /// Forget the conversation so far.
    pub fn clear(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::embedding::Embedder;
    use crate::generation::Generator;
    use crate::retriever::EpisodeRetriever;
    use crate::store::{Episode, EpisodeStore, MemoryEpisodeStore};
    use crate::tracker::EpisodeTracker;
    use crate::vector_store::{MemoryVectorStore, Unit, VectorRecord, VectorStore};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticEmbedder;

    #[async_trait]
    impl Embedder for StaticEmbedder {
        async fn embed(&self, _text: &str) -> crate::error::Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> crate::error::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Records every prompt and replies with a numbered answer.
    struct RecordingGenerator {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Generator for RecordingGenerator {
        async fn complete(&self, prompt: &str) -> crate::error::Result<String> {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            Ok(format!("Answer number {}.", prompts.len()))
        }
    }

    async fn session() -> (ChatSession, Arc<RecordingGenerator>) {
        let store = Arc::new(MemoryEpisodeStore::new());
        let vectors = Arc::new(MemoryVectorStore::new());

        let mut ep = Episode::new(
            42,
            "Episode 42".to_string(),
            "https://example.com/podcast/42".to_string(),
        );
        ep.transcript = Some(vec!["Intro text.".to_string()]);
        store.upsert(&ep).await.unwrap();
        vectors
            .upsert(&VectorRecord::new(
                Unit {
                    episode_number: 42,
                    episode_title: "Episode 42".to_string(),
                    ordinal: 0,
                    text: "Intro text.".to_string(),
                    url: "https://example.com/podcast/42".to_string(),
                },
                vec![1.0, 0.0],
            ))
            .await
            .unwrap();
        store.mark_processed(42).await.unwrap();

        let generator = Arc::new(RecordingGenerator {
            prompts: Mutex::new(Vec::new()),
        });
        let answerer = Arc::new(AnswerSynthesizer::new(
            Arc::new(EpisodeTracker::new(store)),
            Arc::new(EpisodeRetriever::new(vectors, Arc::new(StaticEmbedder))),
            generator.clone(),
            Prompts::default(),
            "Rational Reminder",
            4,
        ));

        (ChatSession::new(answerer, 42, "Episode 42"), generator)
    }

    #[tokio::test]
    async fn test_ask_appends_both_turns_in_order() {
        let (mut session, _) = session().await;

        let answer = session.ask("What is the intro about?").await;
        assert_eq!(answer, "Answer number 1.");

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[0].content, "What is the intro about?");
        assert_eq!(history[1].role, ChatRole::Assistant);
        assert_eq!(history[1].content, "Answer number 1.");

        session.ask("And then?").await;
        assert_eq!(session.history().len(), 4);
    }

    #[tokio::test]
    async fn test_history_never_reaches_the_prompt() {
        let (mut session, generator) = session().await;

        session.ask("A very distinctive first question").await;
        session.ask("Second question").await;

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        // Each question is answered on its own; earlier turns stay out
        assert!(!prompts[1].contains("A very distinctive first question"));
        assert!(!prompts[1].contains("Answer number 1."));
        assert!(prompts[1].contains("Second question"));
    }

    #[tokio::test]
    async fn test_clear_empties_history_only() {
        let (mut session, generator) = session().await;

        session.ask("First").await;
        session.clear();
        assert!(session.history().is_empty());

        // The session still answers after a clear
        let answer = session.ask("Second").await;
        assert_eq!(answer, "Answer number 2.");
        assert_eq!(session.history().len(), 2);
        assert_eq!(generator.prompts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_session_is_scoped_to_its_episode() {
        let (session, _) = session().await;
        assert_eq!(session.episode_number(), 42);
        assert_eq!(session.episode_title(), "Episode 42");
    }
}
