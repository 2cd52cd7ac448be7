//! Retrieval-augmented question answering over the loaded transcripts.
//!
//! Each question retrieves the most similar chunks from the vector index, reads
//! the recent conversation turns, and asks a generator for an answer grounded in
//! both. Successful exchanges are appended to conversation memory.

mod answerer;
mod generator;
pub mod prompt;

pub use answerer::Answerer;
pub use generator::{Generator, OpenAIGenerator};

use crate::config::RetrievalSettings;
use crate::conversation::ChunkReference;

/// Knobs for retrieval and history selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalOptions {
    /// Number of chunks to retrieve.
    pub k: usize,
    /// Number of recent turns to include in the prompt.
    pub history_window: usize,
    /// Drop retrieved chunks scoring below this.
    pub min_score: Option<f32>,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self::from(&RetrievalSettings::default())
    }
}

impl From<&RetrievalSettings> for RetrievalOptions {
    fn from(settings: &RetrievalSettings) -> Self {
        Self {
            k: settings.top_k,
            history_window: settings.history_window,
            min_score: settings.min_score,
        }
    }
}

/// An answer with the chunks it was grounded on.
#[derive(Debug, Clone)]
pub struct AnswerResult {
    /// The generated answer.
    pub answer_text: String,
    /// Chunks retrieved for the question, best first.
    pub retrieved_chunk_references: Vec<ChunkReference>,
}

impl AnswerResult {
    /// Format the answer and its sources for terminal display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer_text.clone();

        if !self.retrieved_chunk_references.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for source in &self.retrieved_chunk_references {
                output.push_str(&format!("\n{} (score: {:.2})", source.label(), source.score));
                if let Some(url) = &source.url {
                    output.push_str(&format!("\n  {}", url));
                }
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_settings() {
        let settings = RetrievalSettings {
            top_k: 7,
            history_window: 2,
            min_score: Some(0.3),
        };
        let options = RetrievalOptions::from(&settings);
        assert_eq!(options.k, 7);
        assert_eq!(options.history_window, 2);
        assert_eq!(options.min_score, Some(0.3));

        let defaults = RetrievalOptions::default();
        assert_eq!(defaults.k, 4);
        assert_eq!(defaults.history_window, 4);
        assert_eq!(defaults.min_score, None);
    }

    #[test]
    fn test_format_for_display() {
        let result = AnswerResult {
            answer_text: "Yes, cats are mammals.".to_string(),
            retrieved_chunk_references: vec![ChunkReference {
                source_id: "abc".to_string(),
                source_title: "Pets".to_string(),
                chunk_index: 0,
                start_char: 0,
                end_char: 18,
                start_seconds: Some(12.0),
                timestamp: Some("00:12".to_string()),
                url: Some("https://youtube.com/watch?v=abc&t=12s".to_string()),
                score: 0.91,
                content: "Cats are mammals. ".to_string(),
            }],
        };

        let display = result.format_for_display();
        assert!(display.starts_with("Yes, cats are mammals."));
        assert!(display.contains("Pets @ 00:12 (score: 0.91)"));
        assert!(display.contains("https://youtube.com/watch?v=abc&t=12s"));

        let bare = AnswerResult {
            answer_text: "No idea.".to_string(),
            retrieved_chunk_references: Vec::new(),
        };
        assert_eq!(bare.format_for_display(), "No idea.");
    }
}
