//! CLI module for Tubechat.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand, ValueEnum};

/// Tubechat - chat with video transcripts
///
/// Loads the transcripts of YouTube videos or local caption files and answers
/// questions about them, citing the moments each answer came from.
#[derive(Parser, Debug)]
#[command(name = "tubechat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "TUBECHAT_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Load transcripts and start an interactive chat about them
    Chat {
        /// YouTube URLs/IDs or local transcript files (.srt, .vtt, .txt, .md)
        #[arg(required = true)]
        inputs: Vec<String>,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Load transcripts and answer a single question
    Ask {
        /// YouTube URLs/IDs or local transcript files
        #[arg(required = true)]
        inputs: Vec<String>,

        /// The question to ask
        #[arg(short, long)]
        question: String,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Number of transcript chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Load transcripts and show the chunks most similar to a query
    Search {
        /// YouTube URLs/IDs or local transcript files
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Search query
        #[arg(short, long)]
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Fetch a transcript and print it
    Transcript {
        /// YouTube URL/ID or local transcript file
        input: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: TranscriptFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    /// Plain transcript text
    Text,
    /// Transcript text, metadata and timeline as JSON
    Json,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
