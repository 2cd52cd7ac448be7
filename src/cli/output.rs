//! CLI output formatting utilities.

use crate::conversation::ChunkReference;
use crate::rag::AnswerResult;
use crate::transcript_source::SourceMetadata;
use crate::vector_store::ScoredChunk;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a loaded source.
    pub fn source_info(source: &SourceMetadata) {
        let duration = source
            .duration_seconds
            .map(|d| format!(", {}", format_duration(d)))
            .unwrap_or_default();
        println!(
            "  {} {} ({}{})",
            style("*").cyan(),
            style(&source.title).bold(),
            style(&source.id).dim(),
            duration
        );
    }

    /// Print a search result.
    pub fn search_result(result: &ScoredChunk) {
        let reference = ChunkReference::from(result);
        Self::reference(&reference, 200);
    }

    /// Print a cited chunk with a preview of its text.
    pub fn reference(reference: &ChunkReference, preview_len: usize) {
        println!(
            "\n{} {} (score: {:.2})",
            style(">>").green(),
            style(reference.label()).bold(),
            reference.score
        );
        println!("   {}", content_preview(&reference.content, preview_len));
        if let Some(url) = &reference.url {
            println!("   {}", style(url).dim());
        }
    }

    /// Print an answer followed by its sources.
    pub fn answer(result: &AnswerResult) {
        println!("\n{} {}\n", style("Tubechat:").cyan().bold(), result.answer_text);

        if !result.retrieved_chunk_references.is_empty() {
            println!("{}", style("Sources").dim().underlined());
            for reference in &result.retrieved_chunk_references {
                let link = reference
                    .url
                    .as_deref()
                    .map(|u| format!(" {}", style(u).dim()))
                    .unwrap_or_default();
                println!("  {} {}{}", style("*").cyan(), reference.label(), link);
            }
            println!();
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Format duration in seconds to a human-readable string.
fn format_duration(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Collapse newlines and truncate to `max_chars` with an ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.trim().replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
