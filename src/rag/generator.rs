//! Answer generation providers.

use super::prompt::{compose_messages, PromptMessage, PromptRole};
use crate::config::{GenerationSettings, Prompts};
use crate::conversation::ConversationTurn;
use crate::error::{Result, TubechatError};
use crate::openai::create_client_with_timeout;
use crate::vector_store::ScoredChunk;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Trait for producing an answer from retrieved context and recent history.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an answer to `question`.
    async fn generate(
        &self,
        context_chunks: &[ScoredChunk],
        recent_turns: &[ConversationTurn],
        question: &str,
    ) -> Result<String>;
}

/// Chat-completion generator backed by OpenAI.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    prompts: Prompts,
}

impl OpenAIGenerator {
    /// Create a generator from configuration.
    pub fn from_settings(settings: &GenerationSettings, prompts: Prompts) -> Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(Duration::from_secs(settings.timeout_seconds))?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            prompts,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_request_message(message: PromptMessage) -> Result<ChatCompletionRequestMessage> {
        let built: ChatCompletionRequestMessage = match message.role {
            PromptRole::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(message.content)
                .build()
                .map_err(build_error)?
                .into(),
            PromptRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.content)
                .build()
                .map_err(build_error)?
                .into(),
            PromptRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.content)
                .build()
                .map_err(build_error)?
                .into(),
        };
        Ok(built)
    }
}

fn build_error(e: impl std::fmt::Display) -> TubechatError {
    TubechatError::GenerationProvider(format!("Failed to build request: {}", e))
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip_all, fields(model = %self.model, chunks = context_chunks.len(), turns = recent_turns.len()))]
    async fn generate(
        &self,
        context_chunks: &[ScoredChunk],
        recent_turns: &[ConversationTurn],
        question: &str,
    ) -> Result<String> {
        let messages = compose_messages(&self.prompts, context_chunks, recent_turns, question)
            .into_iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(build_error)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            TubechatError::GenerationProvider(format!("Failed to generate response: {}", e))
        })?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| TubechatError::GenerationProvider("Empty response from LLM".to_string()))?;

        debug!("Generated answer of {} chars", answer.chars().count());
        Ok(answer)
    }
}
