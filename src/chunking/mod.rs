//! Transcript chunking for embedding and retrieval.
//!
//! Splits raw transcript text into bounded, optionally overlapping chunks that
//! carry the metadata of the source they came from.

mod splitter;

pub use splitter::TextChunker;

use crate::config::ChunkingSettings;
use crate::error::{Result, TubechatError};
use crate::transcript_source::{format_timestamp, SourceMetadata};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A chunk of transcript text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content of this chunk.
    pub text: String,
    /// Metadata of the source, shared by all chunks of that source.
    pub source: Arc<SourceMetadata>,
    /// Order of this chunk within its source.
    pub index: usize,
    /// Char offset of the first character in the source text.
    pub start_char: usize,
    /// Char offset one past the last character in the source text.
    pub end_char: usize,
    /// Time the chunk starts in the video, when captions carried timings.
    pub start_seconds: Option<f64>,
}

impl Chunk {
    /// Length of the chunk in chars.
    pub fn char_len(&self) -> usize {
        self.end_char - self.start_char
    }

    /// Format the start timestamp for display, if known.
    pub fn format_timestamp(&self) -> Option<String> {
        self.start_seconds.map(format_timestamp)
    }

    /// Link to the moment this chunk starts, if known.
    pub fn url(&self) -> Option<String> {
        self.start_seconds
            .map(|seconds| self.source.url_with_timestamp(seconds))
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum chunk length in chars.
    pub max_chunk_size: usize,
    /// Maximum number of chars shared by consecutive chunks.
    pub overlap: usize,
}

impl ChunkingConfig {
    /// Create a validated chunking config.
    pub fn new(max_chunk_size: usize, overlap: usize) -> Result<Self> {
        let config = Self {
            max_chunk_size,
            overlap,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check `max_chunk_size > 0` and `overlap < max_chunk_size`.
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(TubechatError::InvalidConfig(
                "max_chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.overlap >= self.max_chunk_size {
            return Err(TubechatError::InvalidConfig(format!(
                "overlap ({}) must be smaller than max_chunk_size ({})",
                self.overlap, self.max_chunk_size
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        let settings = ChunkingSettings::default();
        Self {
            max_chunk_size: settings.max_chunk_chars,
            overlap: settings.overlap_chars,
        }
    }
}

impl From<&ChunkingSettings> for ChunkingConfig {
    fn from(settings: &ChunkingSettings) -> Self {
        Self {
            max_chunk_size: settings.max_chunk_chars,
            overlap: settings.overlap_chars,
        }
    }
}

/// Split `raw_text` into chunks of at most `max_chunk_size` chars, with consecutive
/// chunks sharing up to `overlap` chars.
pub fn chunk(
    raw_text: &str,
    source_metadata: SourceMetadata,
    max_chunk_size: usize,
    overlap: usize,
) -> Result<Vec<Chunk>> {
    let config = ChunkingConfig::new(max_chunk_size, overlap)?;
    TextChunker::new(config).chunk(raw_text, Arc::new(source_metadata))
}
