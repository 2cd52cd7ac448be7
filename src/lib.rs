//! Tubechat - chat with video transcripts
//!
//! Loads the transcript of one or more videos, indexes it for semantic search and
//! answers follow-up questions grounded in the transcript text.
//!
//! # Architecture
//!
//! - `transcript_source` - Fetching transcripts (YouTube captions, local files)
//! - `chunking` - Splitting transcripts into overlapping chunks
//! - `embedding` - Embedding generation
//! - `vector_store` - In-memory vector index
//! - `conversation` - Conversation memory
//! - `rag` - Retrieval-augmented answering
//! - `pipeline` - Session state and pipeline coordination
//! - `config` - Configuration and prompt templates
//!
//! # Example
//!
//! ```rust,no_run
//! use tubechat::config::Settings;
//! use tubechat::pipeline::{Pipeline, Session};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(&settings)?;
//!     let mut session = Session::new();
//!
//!     pipeline.ingest(&mut session, "dQw4w9WgXcQ").await?;
//!     let answer = pipeline.ask(&mut session, "What is this video about?").await?;
//!     println!("{}", answer.format_for_display());
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod pipeline;
pub mod rag;
pub mod transcript_source;
pub mod vector_store;

#[cfg(test)]
mod testing;

pub use error::{ErrorKind, Result, TubechatError};
