//! The retrieve, compose, generate, append loop.

use super::{AnswerResult, Generator, RetrievalOptions};
use crate::conversation::{ChunkReference, ConversationMemory, ConversationTurn};
use crate::error::{Result, TubechatError};
use crate::vector_store::VectorIndex;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Answers questions against an index, recording each exchange in memory.
pub struct Answerer {
    generator: Arc<dyn Generator>,
    options: RetrievalOptions,
}

impl Answerer {
    pub fn new(generator: Arc<dyn Generator>, options: RetrievalOptions) -> Self {
        Self { generator, options }
    }

    pub fn options(&self) -> &RetrievalOptions {
        &self.options
    }

    /// Answer `question` from the chunks of `index` and the recent turns of `memory`.
    ///
    /// `memory` is only touched after generation succeeds, so an error or a
    /// dropped future leaves it exactly as it was.
    #[instrument(skip(self, index, memory), fields(question = %question))]
    pub async fn answer(
        &self,
        question: &str,
        index: &VectorIndex,
        memory: &mut ConversationMemory,
    ) -> Result<AnswerResult> {
        if question.trim().is_empty() {
            return Err(TubechatError::EmptyQuestion);
        }

        info!("Answering question");

        let retrieved = index
            .search_with_threshold(question, self.options.k, self.options.min_score)
            .await?;
        debug!("Retrieved {} chunks", retrieved.len());

        let recent_turns = memory.recent(self.options.history_window);
        let answer_text = self
            .generator
            .generate(&retrieved, recent_turns, question)
            .await?;

        let references: Vec<ChunkReference> = retrieved.iter().map(ChunkReference::from).collect();
        memory.append(ConversationTurn::new(question, answer_text.clone(), references.clone()));

        Ok(AnswerResult {
            answer_text,
            retrieved_chunk_references: references,
        })
    }
}
