//! Prompt composition for answer generation.

use crate::config::Prompts;
use crate::conversation::ConversationTurn;
use crate::vector_store::ScoredChunk;
use std::collections::HashMap;

/// Author of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

/// A single provider-neutral chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: PromptRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Format retrieved chunks as numbered excerpts.
pub fn format_context_for_prompt(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            let chunk = &scored.chunk;
            let heading = match chunk.format_timestamp() {
                Some(ts) => format!("[{}] {} @ {}", i + 1, chunk.source.title, ts),
                None => format!("[{}] {}", i + 1, chunk.source.title),
            };
            format!("---\n{}\n{}\n---", heading, chunk.text.trim())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the message list for one question.
///
/// Order: system prompt, one user/assistant pair per recent turn (oldest first),
/// then the rendered user template carrying the excerpts and the question.
pub fn compose_messages(
    prompts: &Prompts,
    context_chunks: &[ScoredChunk],
    recent_turns: &[ConversationTurn],
    question: &str,
) -> Vec<PromptMessage> {
    let mut messages = Vec::with_capacity(2 + recent_turns.len() * 2);
    messages.push(PromptMessage::new(PromptRole::System, prompts.rag.system.clone()));

    for turn in recent_turns {
        messages.push(PromptMessage::new(PromptRole::User, turn.question.clone()));
        messages.push(PromptMessage::new(PromptRole::Assistant, turn.answer.clone()));
    }

    let context = if context_chunks.is_empty() {
        prompts.rag.no_context.clone()
    } else {
        format_context_for_prompt(context_chunks)
    };

    let mut vars = HashMap::new();
    vars.insert("context".to_string(), context);
    vars.insert("question".to_string(), question.to_string());

    messages.push(PromptMessage::new(
        PromptRole::User,
        prompts.render_with_custom(&prompts.rag.user, &vars),
    ));

    messages
}
