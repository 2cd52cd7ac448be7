//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, TubechatError};
use crate::openai::is_api_key_configured;
use crate::transcript_source::{LocalSource, TranscriptSource};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Indexing and answering need the API key, plus yt-dlp for YouTube inputs.
    Chat,
    /// Printing a transcript needs yt-dlp for YouTube inputs only.
    Transcript,
}

/// Run pre-flight checks for the given operation and inputs.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings, inputs: &[String]) -> Result<()> {
    if let Operation::Chat = operation {
        check_api_key()?;
    }
    if needs_ytdlp(inputs) {
        check_tool(&settings.source.ytdlp_path)?;
    }
    Ok(())
}

/// Whether any input will be fetched from YouTube rather than read from disk.
fn needs_ytdlp(inputs: &[String]) -> bool {
    let local = LocalSource::new();
    inputs.iter().any(|input| !local.can_handle(input))
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    if is_api_key_configured() {
        Ok(())
    } else {
        Err(TubechatError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        ))
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(TubechatError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TubechatError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(TubechatError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
