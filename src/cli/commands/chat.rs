//! Interactive chat command.

use super::{load_transcripts, run_preflight};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{Pipeline, Session};
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

const HELP: &str = "Commands: 'history', 'sources', 'load <input>...', 'clear', 'help', 'exit'. Anything else is a question.";

/// A line typed at the chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChatCommand {
    Exit,
    Clear,
    History,
    Sources,
    Help,
    Load(Vec<String>),
    Question(String),
}

impl ChatCommand {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or_default().to_lowercase();
        let rest: Vec<String> = words.map(str::to_string).collect();

        let command = match (head.as_str(), rest.is_empty()) {
            ("exit" | "quit", true) => Self::Exit,
            ("clear", true) => Self::Clear,
            ("history", true) => Self::History,
            ("sources", true) => Self::Sources,
            ("help", true) => Self::Help,
            ("load", false) => Self::Load(rest),
            _ => Self::Question(line.to_string()),
        };
        Some(command)
    }
}

/// Run the interactive chat command.
pub async fn run_chat(inputs: &[String], model: Option<String>, mut settings: Settings) -> Result<()> {
    run_preflight(Operation::Chat, &settings, inputs)?;

    if let Some(model) = model {
        settings.generation.model = model;
    }

    let pipeline = Pipeline::new(&settings)?;
    let mut session = Session::new();
    load_transcripts(&pipeline, &mut session, inputs).await?;

    println!("\n{}", style("Tubechat").bold().cyan());
    println!("{}\n", style(HELP).dim());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let Some(command) = ChatCommand::parse(&line) else {
            continue;
        };

        match command {
            ChatCommand::Exit => {
                Output::info("Goodbye!");
                break;
            }
            ChatCommand::Help => Output::info(HELP),
            ChatCommand::Clear => {
                session.clear_history();
                Output::info("Conversation history cleared.");
            }
            ChatCommand::History => {
                if session.history().is_empty() {
                    Output::info("No questions asked yet.");
                } else {
                    println!("\n{}", session.memory().to_markdown());
                }
            }
            ChatCommand::Sources => {
                Output::header("Loaded sources");
                for source in session.sources() {
                    Output::source_info(source);
                }
                println!();
            }
            ChatCommand::Load(new_inputs) => {
                // Failures are already reported and the previous corpus stays loaded.
                if run_preflight(Operation::Chat, &settings, &new_inputs).is_err() {
                    continue;
                }
                if load_transcripts(&pipeline, &mut session, &new_inputs).await.is_ok() {
                    Output::info("Conversation history cleared.");
                }
            }
            ChatCommand::Question(question) => {
                let spinner = Output::spinner("Thinking...");
                let result = pipeline.ask(&mut session, &question).await;
                spinner.finish_and_clear();

                match result {
                    Ok(answer) => Output::answer(&answer),
                    Err(e) => Output::error(&format!("Error ({}): {}", e.kind(), e)),
                }
            }
        }
    }

    Ok(())
}
