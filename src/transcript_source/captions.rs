//! Caption file parsing (WebVTT and SRT).
//!
//! YouTube auto-generated captions carry inline word timings and repeat the
//! previous line at the top of every cue. In such files lines repeating the last
//! emitted line are dropped; in other files every line is kept.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex"));

static ANNOTATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[^\]]*\]$").expect("Invalid regex"));

/// Inline word timing such as `<00:00:01.000>`, only present in auto-generated captions.
static WORD_TIMING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\d{2}:\d{2}:\d{2}\.\d{3}>").expect("Invalid regex"));

/// A single timed caption line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionCue {
    /// Start time in seconds.
    pub start_seconds: f64,
    /// End time in seconds.
    pub end_seconds: f64,
    /// Cleaned text.
    pub text: String,
}

impl CaptionCue {
    /// Create a new caption cue.
    pub fn new(start_seconds: f64, end_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text: text.into(),
        }
    }
}

/// Raw lines collected under one timing line.
struct PendingCue {
    start: f64,
    end: f64,
    lines: Vec<String>,
    /// Set by the first blank line after some text; later lines belong to no cue.
    closed: bool,
}

/// Parse WebVTT or SRT content into cues.
///
/// Every timing line starts a new cue. A blank (or whitespace-only) line after
/// cue text ends the cue, so headers, NOTE, STYLE and REGION blocks and SRT
/// index numbers are skipped.
pub fn parse_captions(content: &str) -> Vec<CaptionCue> {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let rolling = WORD_TIMING_REGEX.is_match(&normalized);

    let mut cues = Vec::new();
    let mut last_line: Option<String> = None;
    let mut current: Option<PendingCue> = None;

    for raw in normalized.lines() {
        if let Some((start, end)) = raw.contains("-->").then(|| parse_timing_line(raw)).flatten() {
            if let Some(mut cue) = current.take() {
                // SRT index written without a blank line before it.
                if !cue.closed && cue.lines.last().is_some_and(|l| is_index_line(l)) {
                    cue.lines.pop();
                }
                emit(cue, rolling, &mut last_line, &mut cues);
            }
            current = Some(PendingCue {
                start,
                end,
                lines: Vec::new(),
                closed: false,
            });
            continue;
        }

        let Some(cue) = current.as_mut() else {
            continue;
        };
        if raw.trim().is_empty() {
            cue.closed |= !cue.lines.is_empty();
        } else if !cue.closed {
            cue.lines.push(raw.to_string());
        }
    }

    if let Some(cue) = current {
        emit(cue, rolling, &mut last_line, &mut cues);
    }

    cues
}

fn emit(cue: PendingCue, rolling: bool, last_line: &mut Option<String>, cues: &mut Vec<CaptionCue>) {
    for raw in &cue.lines {
        let line = clean_line(raw);
        if line.is_empty() || ANNOTATION_REGEX.is_match(&line) {
            continue;
        }
        if rolling && last_line.as_deref() == Some(line.as_str()) {
            continue;
        }
        cues.push(CaptionCue::new(cue.start, cue.end, line.clone()));
        *last_line = Some(line);
    }
}

fn is_index_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

/// Parse `00:00:01.000 --> 00:00:03.500 align:start` into seconds.
fn parse_timing_line(line: &str) -> Option<(f64, f64)> {
    let (left, right) = line.split_once("-->")?;
    let start = parse_timestamp(left.trim())?;
    let end = parse_timestamp(right.split_whitespace().next()?)?;
    Some((start, end))
}

/// Parse `HH:MM:SS.mmm`, `MM:SS.mmm` or the SRT `HH:MM:SS,mmm` form.
fn parse_timestamp(value: &str) -> Option<f64> {
    let value = value.replace(',', ".");
    let parts: Vec<&str> = value.split(':').collect();

    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (h.parse::<f64>().ok()?, m.parse::<f64>().ok()?, s.parse::<f64>().ok()?),
        [m, s] => (0.0, m.parse::<f64>().ok()?, s.parse::<f64>().ok()?),
        _ => return None,
    };

    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Strip markup, decode common entities and collapse whitespace.
fn clean_line(line: &str) -> String {
    let stripped = TAG_REGEX.replace_all(line, "");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_srt() {
        let srt = "1\n00:00:00,000 --> 00:00:02,500\nHello world.\n\n2\n00:00:02,500 --> 00:00:05,000\nThis is a test.\n";

        let cues = parse_captions(srt);

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0], CaptionCue::new(0.0, 2.5, "Hello world."));
        assert_eq!(cues[1].start_seconds, 2.5);
        assert_eq!(cues[1].text, "This is a test.");
    }

    #[test]
    fn test_parse_vtt_with_header_and_settings() {
        let vtt = "WEBVTT\nKind: captions\nLanguage: en\n\nNOTE generated\n\n00:01.000 --> 00:04.000 align:start position:0%\n<v Speaker>Tom &amp; Jerry</v>\n\n01:00:00.000 --> 01:00:01.000\nLate line\n";

        let cues = parse_captions(vtt);

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].start_seconds, 1.0);
        assert_eq!(cues[0].text, "Tom & Jerry");
        assert_eq!(cues[1].start_seconds, 3600.0);
    }

    #[test]
    fn test_parse_youtube_rolling_captions() {
        let vtt = concat!(
            "WEBVTT\n\n",
            "00:00:00.000 --> 00:00:02.000 align:start position:0%\n",
            " \n",
            "cats<00:00:00.500><c> are</c><00:00:01.000><c> mammals</c>\n\n",
            "00:00:02.000 --> 00:00:02.010 align:start position:0%\n",
            "cats are mammals\n",
            " \n\n",
            "00:00:02.010 --> 00:00:04.000 align:start position:0%\n",
            "cats are mammals\n",
            "dogs<00:00:02.500><c> are</c><00:00:03.000><c> too</c>\n\n",
            "00:00:04.000 --> 00:00:05.000\n",
            "[Music]\n",
        );

        let cues = parse_captions(vtt);
        let texts: Vec<&str> = cues.iter().map(|c| c.text.as_str()).collect();

        assert_eq!(texts, vec!["cats are mammals", "dogs are too"]);
        assert_eq!(cues[1].start_seconds, 2.01);
    }

    #[test]
    fn test_manual_captions_keep_repeated_lines() {
        let srt = concat!(
            "1\n00:00:00,000 --> 00:00:01,000\nNo.\n\n",
            "2\n00:00:01,000 --> 00:00:02,000\nNo.\n\n",
            "3\n00:00:02,000 --> 00:00:03,000\nStop.\n",
        );

        let cues = parse_captions(srt);
        let texts: Vec<&str> = cues.iter().map(|c| c.text.as_str()).collect();

        assert_eq!(texts, vec!["No.", "No.", "Stop."]);
        assert_eq!(cues[1].start_seconds, 1.0);
    }

    #[test]
    fn test_whitespace_line_separates_cues() {
        let srt = "1\n00:00:00,000 --> 00:00:02,000\nFirst.\n \n2\n00:00:02,000 --> 00:00:04,000\nSecond.\n";

        let cues = parse_captions(srt);

        assert_eq!(
            cues,
            vec![
                CaptionCue::new(0.0, 2.0, "First."),
                CaptionCue::new(2.0, 4.0, "Second."),
            ]
        );
    }

    #[test]
    fn test_index_without_blank_line() {
        let srt = "1\n00:00:00,000 --> 00:00:02,000\nFirst.\n2\n00:00:02,000 --> 00:00:04,000\nSecond.\n";

        let texts: Vec<String> = parse_captions(srt).into_iter().map(|c| c.text).collect();
        assert_eq!(texts, vec!["First.", "Second."]);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("abc"), None);
        assert_eq!(parse_timestamp("1:2:3:4"), None);
        assert_eq!(parse_timestamp("00:01:01,500"), Some(61.5));
    }
}
