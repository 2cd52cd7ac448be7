//! Error types for Tubechat.

use thiserror::Error;

/// Broad classification of a failure, used by the presentation layer to decide
/// how to report it and whether a retry makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad text, identifier, argument or configuration supplied by the caller.
    Input,
    /// An external provider (transcripts, embeddings, generation) failed.
    Provider,
    /// The operation is not valid in the current session state.
    State,
    /// Local environment problems: files, config parsing, missing tools.
    System,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Input => write!(f, "input"),
            ErrorKind::Provider => write!(f, "provider"),
            ErrorKind::State => write!(f, "state"),
            ErrorKind::System => write!(f, "system"),
        }
    }
}

/// Library-level error type for Tubechat operations.
#[derive(Error, Debug)]
pub enum TubechatError {
    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Question must not be empty")]
    EmptyQuestion,

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Transcript source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Embedding provider failed: {0}")]
    EmbeddingProvider(String),

    #[error("Generation provider failed: {0}")]
    GenerationProvider(String),

    #[error("No transcript has been indexed yet")]
    EmptyIndex,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl TubechatError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TubechatError::EmptyInput(_)
            | TubechatError::InvalidConfig(_)
            | TubechatError::InvalidArgument(_)
            | TubechatError::EmptyQuestion
            | TubechatError::InvalidIdentifier(_) => ErrorKind::Input,
            TubechatError::SourceUnavailable(_)
            | TubechatError::EmbeddingProvider(_)
            | TubechatError::GenerationProvider(_) => ErrorKind::Provider,
            TubechatError::EmptyIndex => ErrorKind::State,
            TubechatError::Config(_)
            | TubechatError::ToolNotFound(_)
            | TubechatError::Io(_)
            | TubechatError::Json(_)
            | TubechatError::TomlParse(_) => ErrorKind::System,
        }
    }
}

/// Result type alias for Tubechat operations.
pub type Result<T> = std::result::Result<T, TubechatError>;
