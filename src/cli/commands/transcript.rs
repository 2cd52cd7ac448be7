//! Transcript command - fetch a transcript without indexing it.

use super::run_preflight;
use crate::cli::preflight::Operation;
use crate::cli::{Output, TranscriptFormat};
use crate::config::Settings;
use crate::transcript_source::{AutoSource, SourceDocument, TranscriptSource};
use anyhow::Result;

/// Run the transcript command.
pub async fn run_transcript(
    input: &str,
    format: TranscriptFormat,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    run_preflight(Operation::Transcript, &settings, &[input.to_string()])?;

    let source = AutoSource::new(&settings.source);
    let spinner = Output::spinner("Fetching transcript...");
    let document = source.fetch(input).await;
    spinner.finish_and_clear();

    let document = match document {
        Ok(document) => document,
        Err(e) => {
            Output::error(&format!("Failed to fetch transcript: {}", e));
            return Err(e.into());
        }
    };

    let rendered = render(&document, format)?;

    match output {
        Some(path) => {
            let path = Settings::expand_path(&path);
            tokio::fs::write(&path, rendered).await?;
            Output::success(&format!(
                "Wrote transcript of '{}' to {}",
                document.metadata.title,
                path.display()
            ));
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn render(document: &SourceDocument, format: TranscriptFormat) -> Result<String> {
    Ok(match format {
        TranscriptFormat::Text => document.raw_text.clone(),
        TranscriptFormat::Json => serde_json::to_string_pretty(document)?,
    })
}
