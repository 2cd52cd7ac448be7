//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod doctor;
mod search;
mod transcript;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use search::run_search;
pub use transcript::run_transcript;

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{IngestResult, Pipeline, Session};

/// Run pre-flight checks, reporting failures the same way for every command.
fn run_preflight(operation: Operation, settings: &Settings, inputs: &[String]) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(operation, settings, inputs) {
        Output::error(&format!("{}", e));
        Output::info("Run 'tubechat doctor' for detailed diagnostics.");
        return Err(e.into());
    }
    Ok(())
}

/// Fetch, chunk and index `inputs` into `session`, with a spinner.
async fn load_transcripts(
    pipeline: &Pipeline,
    session: &mut Session,
    inputs: &[String],
) -> anyhow::Result<IngestResult> {
    let spinner = Output::spinner(&format!("Loading {} transcript(s)...", inputs.len()));
    let result = pipeline.ingest_all(session, inputs).await;
    spinner.finish_and_clear();

    match result {
        Ok(ingested) => {
            Output::success(&format!(
                "Indexed {} chunks from {} source(s)",
                ingested.chunks_indexed,
                ingested.sources.len()
            ));
            for source in &ingested.sources {
                Output::source_info(source);
            }
            Ok(ingested)
        }
        Err(e) => {
            Output::error(&format!("Failed to load transcripts: {}", e));
            Err(e.into())
        }
    }
}
