//! Local file source implementation.
//!
//! Supports caption files (SRT, WebVTT) and plain text transcripts.

use super::{parse_captions, SourceDocument, SourceKind, SourceMetadata, TranscriptSource};
use crate::config::Settings;
use crate::error::{Result, TubechatError};
use async_trait::async_trait;
use std::path::Path;
use tracing::{info, instrument};

/// Supported caption file extensions.
const CAPTION_EXTENSIONS: &[&str] = &["srt", "vtt"];

/// Supported plain text extensions.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md"];

/// Local file source for transcript files.
pub struct LocalSource;

impl LocalSource {
    pub fn new() -> Self {
        Self
    }

    fn extension(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Check if path is a supported caption file.
    fn is_caption_file(path: &Path) -> bool {
        Self::extension(path).is_some_and(|ext| CAPTION_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Check if path is a supported plain text file.
    fn is_text_file(path: &Path) -> bool {
        Self::extension(path).is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()))
    }
}

impl Default for LocalSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for LocalSource {
    fn name(&self) -> &'static str {
        "local"
    }

    fn can_handle(&self, input: &str) -> bool {
        let path = Path::new(input.trim());
        Self::is_caption_file(path) || Self::is_text_file(path)
    }

    #[instrument(skip(self), fields(identifier = %identifier))]
    async fn fetch(&self, identifier: &str) -> Result<SourceDocument> {
        let expanded = Settings::expand_path(identifier.trim());
        let path = expanded.as_path();

        if !self.can_handle(identifier) {
            return Err(TubechatError::InvalidIdentifier(format!(
                "Not a supported transcript file (expected .srt, .vtt, .txt or .md): {}",
                identifier
            )));
        }

        if !path.exists() {
            return Err(TubechatError::SourceUnavailable(format!(
                "File not found: {}",
                identifier
            )));
        }

        let content = tokio::fs::read_to_string(path).await?;
        let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let display_path = absolute.to_string_lossy().to_string();

        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled")
            .to_string();

        let metadata = SourceMetadata::new(
            display_path.clone(),
            title,
            SourceKind::Local,
            display_path,
        );

        let document = if Self::is_caption_file(path) {
            SourceDocument::from_cues(&parse_captions(&content), metadata)
        } else {
            SourceDocument::new(content, metadata)
        };

        info!(
            "Loaded {} chars from local file '{}'",
            document.raw_text.chars().count(),
            document.metadata.title
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_handle() {
        let source = LocalSource::new();

        assert!(source.can_handle("talk.srt"));
        assert!(source.can_handle("/data/Talk.VTT"));
        assert!(source.can_handle("notes.txt"));
        assert!(!source.can_handle("video.mp4"));
        assert!(!source.can_handle("dQw4w9WgXcQ"));
    }

    #[tokio::test]
    async fn test_fetch_caption_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture.srt");
        std::fs::write(
            &path,
            "1\n00:00:00,000 --> 00:00:02,000\nFirst line.\n\n2\n00:00:02,000 --> 00:00:04,000\nSecond line.\n",
        )
        .unwrap();

        let doc = LocalSource::new()
            .fetch(path.to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(doc.raw_text, "First line. Second line.");
        assert_eq!(doc.metadata.title, "lecture");
        assert_eq!(doc.metadata.kind, SourceKind::Local);
        assert_eq!(doc.seconds_at(15), Some(2.0));
    }

    #[tokio::test]
    async fn test_fetch_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Plain transcript.\nSecond paragraph.").unwrap();

        let doc = LocalSource::new()
            .fetch(path.to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(doc.raw_text, "Plain transcript.\nSecond paragraph.");
        assert!(doc.timeline.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let err = LocalSource::new()
            .fetch("/definitely/not/here.vtt")
            .await
            .unwrap_err();
        assert!(matches!(err, TubechatError::SourceUnavailable(_)));
    }
}
