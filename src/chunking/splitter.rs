//! Character-window text splitting.
//!
//! Each chunk ends at the last sentence boundary inside its window, falling back
//! to the last word boundary and finally to a hard cut. Boundaries are only
//! accepted past `overlap` chars so that every step makes progress.

use super::{Chunk, ChunkingConfig};
use crate::error::{Result, TubechatError};
use crate::transcript_source::{SourceDocument, SourceMetadata};
use std::sync::Arc;
use tracing::debug;

/// Splits text into overlapping chunks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// Split raw text into chunks sharing `source`.
    pub fn chunk(&self, raw_text: &str, source: Arc<SourceMetadata>) -> Result<Vec<Chunk>> {
        self.config.validate()?;

        if raw_text.trim().is_empty() {
            return Err(TubechatError::EmptyInput(format!(
                "transcript for '{}' contains no text",
                source.title
            )));
        }

        let chars: Vec<char> = raw_text.chars().collect();
        let spans = split_spans(&chars, self.config.max_chunk_size, self.config.overlap);

        let chunks: Vec<Chunk> = spans
            .into_iter()
            .enumerate()
            .map(|(index, (start, end))| Chunk {
                text: chars[start..end].iter().collect(),
                source: Arc::clone(&source),
                index,
                start_char: start,
                end_char: end,
                start_seconds: None,
            })
            .collect();

        debug!(
            "Split {} chars from '{}' into {} chunks",
            chars.len(),
            source.title,
            chunks.len()
        );
        Ok(chunks)
    }

    /// Split a fetched document, stamping each chunk with its start time.
    pub fn chunk_document(&self, document: &SourceDocument) -> Result<Vec<Chunk>> {
        let source = Arc::new(document.metadata.clone());
        let mut chunks = self.chunk(&document.raw_text, source)?;
        for chunk in &mut chunks {
            chunk.start_seconds = document.seconds_at(chunk.start_char);
        }
        Ok(chunks)
    }
}

/// Compute `[start, end)` char spans. Requires `overlap < max`.
fn split_spans(chars: &[char], max: usize, overlap: usize) -> Vec<(usize, usize)> {
    let len = chars.len();
    let mut spans = Vec::new();
    let mut start = 0;

    loop {
        if len - start <= max {
            spans.push((start, len));
            break;
        }

        let end = find_break(chars, start, start + max, overlap);
        spans.push((start, end));
        start = end - overlap;
    }

    spans
}

/// Choose where a chunk starting at `start` ends, no later than `window_end`.
///
/// `window_end < chars.len()` holds, so `chars[p]` is valid for every candidate.
fn find_break(chars: &[char], start: usize, window_end: usize, overlap: usize) -> usize {
    let min_end = start + overlap + 1;
    let mut word_break = None;

    for p in (min_end..=window_end).rev() {
        if !chars[p - 1].is_whitespace() || chars[p].is_whitespace() {
            continue;
        }

        if word_break.is_none() {
            word_break = Some(p);
        }

        let mut q = p - 1;
        let mut saw_newline = false;
        while q > start && chars[q].is_whitespace() {
            saw_newline |= chars[q] == '\n';
            q -= 1;
        }

        if saw_newline || matches!(chars[q], '.' | '!' | '?') {
            return p;
        }
    }

    word_break.unwrap_or(window_end)
}
