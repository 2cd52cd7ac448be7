//! Search command implementation.

use super::{load_transcripts, run_preflight};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{Pipeline, Session};
use anyhow::Result;

/// Run the search command.
pub async fn run_search(inputs: &[String], query: &str, limit: usize, settings: Settings) -> Result<()> {
    run_preflight(Operation::Chat, &settings, inputs)?;

    let pipeline = Pipeline::new(&settings)?;
    let mut session = Session::new();
    load_transcripts(&pipeline, &mut session, inputs).await?;

    let spinner = Output::spinner("Searching...");
    let results = pipeline.search(&session, query, limit).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) if results.is_empty() => {
            Output::warning("No results found matching your query.");
        }
        Ok(results) => {
            Output::success(&format!("Found {} results", results.len()));
            for result in &results {
                Output::search_result(result);
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
