//! Conversation memory: the ordered, append-only log of question/answer turns.

use crate::vector_store::ScoredChunk;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Citation data for a chunk retrieved while answering a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkReference {
    /// ID of the source the chunk came from.
    pub source_id: String,
    /// Title of the source.
    pub source_title: String,
    /// Order of the chunk within its source.
    pub chunk_index: usize,
    /// Char span of the chunk in the source text.
    pub start_char: usize,
    pub end_char: usize,
    /// Start time in the video, if known.
    pub start_seconds: Option<f64>,
    /// Formatted timestamp (e.g., "02:34").
    pub timestamp: Option<String>,
    /// Link to the moment in the video, if known.
    pub url: Option<String>,
    /// Similarity score.
    pub score: f32,
    /// Chunk text.
    pub content: String,
}

impl From<&ScoredChunk> for ChunkReference {
    fn from(scored: &ScoredChunk) -> Self {
        let chunk = &scored.chunk;
        Self {
            source_id: chunk.source.id.clone(),
            source_title: chunk.source.title.clone(),
            chunk_index: chunk.index,
            start_char: chunk.start_char,
            end_char: chunk.end_char,
            start_seconds: chunk.start_seconds,
            timestamp: chunk.format_timestamp(),
            url: chunk.url(),
            score: scored.score,
            content: chunk.text.clone(),
        }
    }
}

impl ChunkReference {
    /// Short label such as `Title @ 01:23` or `Title #4`.
    pub fn label(&self) -> String {
        match &self.timestamp {
            Some(ts) => format!("{} @ {}", self.source_title, ts),
            None => format!("{} #{}", self.source_title, self.chunk_index + 1),
        }
    }
}

/// One question/answer exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
    /// Chunks that were retrieved to answer the question.
    pub sources: Vec<ChunkReference>,
    pub asked_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, sources: Vec<ChunkReference>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            sources,
            asked_at: Utc::now(),
        }
    }
}

/// Ordered sequence of conversation turns.
///
/// Growth is unbounded; prompt size is bounded by reading only `recent(n)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationMemory {
    turns: Vec<ConversationTurn>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn to the end of the conversation.
    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// The last `n` turns (or fewer) in chronological order.
    pub fn recent(&self, n: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Remove all turns.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// All turns in chronological order.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render the conversation as Markdown, with sources under each answer.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        for (i, turn) in self.turns.iter().enumerate() {
            if i > 0 {
                output.push_str("\n---\n\n");
            }
            output.push_str(&format!("**Q:** {}\n\n", turn.question));
            output.push_str(&format!("**A:** {}\n", turn.answer));

            if !turn.sources.is_empty() {
                output.push_str("\nSources:\n");
                for source in &turn.sources {
                    match &source.url {
                        Some(url) => output.push_str(&format!("- [{}]({})\n", source.label(), url)),
                        None => output.push_str(&format!("- {}\n", source.label())),
                    }
                }
            }
        }

        output
    }
}
