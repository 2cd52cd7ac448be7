//! Ask command implementation.

use super::{load_transcripts, run_preflight};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{Pipeline, Session};
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    inputs: &[String],
    question: &str,
    model: Option<String>,
    top_k: Option<usize>,
    mut settings: Settings,
) -> Result<()> {
    run_preflight(Operation::Chat, &settings, inputs)?;

    if let Some(model) = model {
        settings.generation.model = model;
    }
    if let Some(k) = top_k {
        settings.retrieval.top_k = k;
    }

    let pipeline = Pipeline::new(&settings)?;
    let mut session = Session::new();
    load_transcripts(&pipeline, &mut session, inputs).await?;

    let spinner = Output::spinner("Thinking...");
    let result = pipeline.ask(&mut session, question).await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => {
            println!("\n{}\n", answer.answer_text);

            if !answer.retrieved_chunk_references.is_empty() {
                Output::header("Sources");
                for reference in &answer.retrieved_chunk_references {
                    Output::reference(reference, 100);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
