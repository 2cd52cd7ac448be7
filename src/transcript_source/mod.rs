//! Transcript source abstraction for Tubechat.
//!
//! Provides a trait-based interface for fetching transcript text from different
//! places (YouTube captions, local caption or text files).

mod captions;
mod local;
mod youtube;

pub use captions::{parse_captions, CaptionCue};
pub use local::LocalSource;
pub use youtube::YoutubeSource;

use crate::config::SourceSettings;
use crate::error::{Result, TubechatError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type of transcript source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    YouTube,
    Local,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::YouTube => write!(f, "youtube"),
            SourceKind::Local => write!(f, "local"),
        }
    }
}

/// Metadata about the video or file a transcript came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Unique identifier (video ID or file path).
    pub id: String,
    /// Title.
    pub title: String,
    /// Channel or author name (if available).
    pub author: Option<String>,
    /// Description (if available).
    pub description: Option<String>,
    /// Duration in seconds (if known).
    pub duration_seconds: Option<u32>,
    /// Type of source.
    pub kind: SourceKind,
    /// URL or path to the source.
    pub source_url: String,
    /// Publication date (if available).
    pub published_at: Option<DateTime<Utc>>,
    /// Caption language (if known).
    pub language: Option<String>,
}

impl SourceMetadata {
    /// Create metadata with only the required fields set.
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: SourceKind, source_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: None,
            description: None,
            duration_seconds: None,
            kind,
            source_url: source_url.into(),
            published_at: None,
            language: None,
        }
    }

    /// Create a URL pointing at a specific moment of the source.
    pub fn url_with_timestamp(&self, seconds: f64) -> String {
        match self.kind {
            SourceKind::YouTube => {
                format!("https://youtube.com/watch?v={}&t={}s", self.id, seconds as u32)
            }
            SourceKind::Local => format!("{}#t={}", self.source_url, seconds as u32),
        }
    }
}

/// Format seconds as MM:SS or HH:MM:SS.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Maps a character offset in the raw text to the time it was spoken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineMark {
    /// Char offset into `SourceDocument::raw_text`.
    pub offset: usize,
    /// Start time in seconds.
    pub seconds: f64,
}

/// A fetched transcript: raw text plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub raw_text: String,
    pub metadata: SourceMetadata,
    /// Sorted by offset. Empty for plain text sources.
    pub timeline: Vec<TimelineMark>,
}

impl SourceDocument {
    /// Create a document without timing information.
    pub fn new(raw_text: String, metadata: SourceMetadata) -> Self {
        Self {
            raw_text,
            metadata,
            timeline: Vec::new(),
        }
    }

    /// Create a document by joining caption cues with single spaces.
    pub fn from_cues(cues: &[CaptionCue], metadata: SourceMetadata) -> Self {
        let mut raw_text = String::new();
        let mut timeline = Vec::with_capacity(cues.len());
        let mut offset = 0;

        for cue in cues {
            if cue.text.is_empty() {
                continue;
            }
            if !raw_text.is_empty() {
                raw_text.push(' ');
                offset += 1;
            }
            timeline.push(TimelineMark {
                offset,
                seconds: cue.start_seconds,
            });
            raw_text.push_str(&cue.text);
            offset += cue.text.chars().count();
        }

        Self {
            raw_text,
            metadata,
            timeline,
        }
    }

    /// Time at which the text at `offset` was spoken, if known.
    pub fn seconds_at(&self, offset: usize) -> Option<f64> {
        let idx = self.timeline.partition_point(|mark| mark.offset <= offset);
        if idx == 0 {
            return self.timeline.first().map(|m| m.seconds);
        }
        Some(self.timeline[idx - 1].seconds)
    }
}

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Short name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Check if this source can handle the given input.
    fn can_handle(&self, input: &str) -> bool;

    /// Fetch the transcript and metadata for an identifier.
    async fn fetch(&self, identifier: &str) -> Result<SourceDocument>;
}

/// Transcript source that dispatches each identifier to the first source able to
/// handle it.
pub struct AutoSource {
    sources: Vec<Box<dyn TranscriptSource>>,
}

impl AutoSource {
    /// Local files first, then YouTube.
    pub fn new(settings: &SourceSettings) -> Self {
        Self {
            sources: vec![
                Box::new(LocalSource::new()),
                Box::new(YoutubeSource::from_settings(settings)),
            ],
        }
    }

    fn select(&self, input: &str) -> Option<&dyn TranscriptSource> {
        self.sources
            .iter()
            .find(|s| s.can_handle(input))
            .map(|s| s.as_ref())
    }
}

#[async_trait]
impl TranscriptSource for AutoSource {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn can_handle(&self, input: &str) -> bool {
        self.select(input).is_some()
    }

    async fn fetch(&self, identifier: &str) -> Result<SourceDocument> {
        let source = self.select(identifier).ok_or_else(|| {
            TubechatError::InvalidIdentifier(format!(
                "Not a YouTube URL/ID or a supported transcript file: {}",
                identifier
            ))
        })?;
        source.fetch(identifier).await
    }
}
