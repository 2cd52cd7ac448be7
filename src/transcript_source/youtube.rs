//! YouTube caption source implementation.
//!
//! Uses `yt-dlp` to write the video's info JSON and its caption track (manual
//! subtitles preferred, auto-generated as fallback) into a scratch directory.

use super::{parse_captions, SourceDocument, SourceKind, SourceMetadata, TranscriptSource};
use crate::config::SourceSettings;
use crate::error::{Result, TubechatError};
use async_trait::async_trait;
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// YouTube transcript source.
pub struct YoutubeSource {
    video_id_regex: Regex,
    ytdlp_path: String,
    language: String,
}

impl YoutubeSource {
    pub fn new() -> Self {
        Self::from_settings(&SourceSettings::default())
    }

    pub fn from_settings(settings: &SourceSettings) -> Self {
        // Matches various YouTube URL formats and bare video IDs
        let video_id_regex = Regex::new(
            r"(?x)
            (?:
                # Full YouTube URLs
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/|youtube\.com/shorts/|youtube\.com/live/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            # Bare video ID (11 characters)
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex");

        Self {
            video_id_regex,
            ytdlp_path: settings.ytdlp_path.clone(),
            language: settings.language.clone(),
        }
    }

    /// Extract video ID from a YouTube URL or bare ID.
    pub fn extract_video_id(&self, input: &str) -> Option<String> {
        let caps = self.video_id_regex.captures(input.trim())?;

        // Try group 1 (URL format) then group 2 (bare ID)
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    /// yt-dlp arguments writing `<id>.info.json` and `<id>.<lang>.vtt` into `dir`.
    fn ytdlp_args(&self, video_id: &str, dir: &Path) -> Vec<OsString> {
        let sub_langs = format!("{lang},{lang}.*,{lang}-orig", lang = self.language);
        let mut args: Vec<OsString> = [
            "--skip-download",
            "--write-info-json",
            "--write-subs",
            "--write-auto-subs",
            "--sub-langs",
            sub_langs.as_str(),
            "--sub-format",
            "vtt",
            "--output",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(dir.join("%(id)s.%(ext)s").into_os_string());
        args.extend(
            ["--no-playlist", "--no-warnings", "--quiet"]
                .into_iter()
                .map(OsString::from),
        );
        args.push(watch_url(video_id).into());
        args
    }

    /// Run yt-dlp for `video_id` inside `dir`.
    async fn download_captions(&self, video_id: &str, dir: &Path) -> Result<()> {
        let result = Command::new(&self.ytdlp_path)
            .args(self.ytdlp_args(video_id, dir))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TubechatError::ToolNotFound(self.ytdlp_path.clone()));
            }
            Err(e) => {
                return Err(TubechatError::SourceUnavailable(format!(
                    "Failed to run yt-dlp: {}",
                    e
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TubechatError::SourceUnavailable(format!(
                "Video {} not found or unavailable: {}",
                video_id,
                stderr.trim()
            )));
        }

        Ok(())
    }

    /// Pick the caption file for the configured language.
    ///
    /// An exact language match wins over regional or auto-translated variants.
    fn find_caption_file(&self, dir: &Path, video_id: &str) -> Result<PathBuf> {
        let exact = dir.join(format!("{}.{}.vtt", video_id, self.language));
        if exact.exists() {
            return Ok(exact);
        }

        let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "vtt"))
            .collect();
        candidates.sort();

        candidates.into_iter().next().ok_or_else(|| {
            TubechatError::SourceUnavailable(format!(
                "No '{}' captions available for video {}",
                self.language, video_id
            ))
        })
    }

    /// Build metadata from the yt-dlp info JSON.
    fn parse_metadata(&self, video_id: &str, json: &serde_json::Value) -> SourceMetadata {
        let mut metadata = SourceMetadata::new(
            video_id,
            json["title"].as_str().unwrap_or("Unknown Title"),
            SourceKind::YouTube,
            watch_url(video_id),
        );

        metadata.description = json["description"].as_str().map(|s| s.to_string());
        metadata.duration_seconds = json["duration"].as_f64().map(|d| d as u32);
        metadata.author = json["channel"]
            .as_str()
            .or_else(|| json["uploader"].as_str())
            .map(|s| s.to_string());
        metadata.language = Some(self.language.clone());

        metadata.published_at = json["upload_date"].as_str().and_then(|date_str| {
            // yt-dlp returns date as YYYYMMDD
            chrono::NaiveDate::parse_from_str(date_str, "%Y%m%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        });

        metadata
    }
}

impl Default for YoutubeSource {
    fn default() -> Self {
        Self::new()
    }
}

fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

#[async_trait]
impl TranscriptSource for YoutubeSource {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn can_handle(&self, input: &str) -> bool {
        self.extract_video_id(input).is_some()
    }

    #[instrument(skip(self), fields(identifier = %identifier))]
    async fn fetch(&self, identifier: &str) -> Result<SourceDocument> {
        let video_id = self.extract_video_id(identifier).ok_or_else(|| {
            TubechatError::InvalidIdentifier(format!(
                "Invalid YouTube video ID or URL: {}",
                identifier
            ))
        })?;

        let scratch = tempfile::tempdir()?;
        info!("Fetching captions for {}", video_id);
        self.download_captions(&video_id, scratch.path()).await?;

        let info_path = scratch.path().join(format!("{}.info.json", video_id));
        let metadata = match tokio::fs::read_to_string(&info_path).await {
            Ok(content) => {
                let json: serde_json::Value = serde_json::from_str(&content)?;
                self.parse_metadata(&video_id, &json)
            }
            Err(e) => {
                debug!("No info JSON written ({}), using bare metadata", e);
                self.parse_metadata(&video_id, &serde_json::Value::Null)
            }
        };

        let caption_path = self.find_caption_file(scratch.path(), &video_id)?;
        debug!("Using caption file {:?}", caption_path);
        let content = tokio::fs::read_to_string(&caption_path).await?;

        let cues = parse_captions(&content);
        if cues.is_empty() {
            return Err(TubechatError::SourceUnavailable(format!(
                "Captions for video {} are empty",
                video_id
            )));
        }

        info!("Fetched {} caption lines for '{}'", cues.len(), metadata.title);
        Ok(SourceDocument::from_cues(&cues, metadata))
    }
}
