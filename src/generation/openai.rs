//! OpenAI chat-completion generator.

use super::Generator;
use crate::error::{Result, SvarError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI-based generator.
///
/// Prompts are sent as a single user message; the templates carry their
/// own framing, so no separate system message is needed.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIGenerator {
    /// Create a new OpenAI generator with default settings.
    pub fn new() -> Self {
        Self::with_config("gpt-4o-mini", 0.7)
    }

    /// Create a new OpenAI generator with custom model and temperature.
    pub fn with_config(model: &str, temperature: f32) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            temperature,
        }
    }
}

impl Default for OpenAIGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| SvarError::Generation(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| SvarError::Generation(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            SvarError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| SvarError::Generation("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated {} characters", text.len());
        Ok(text)
    }
}
