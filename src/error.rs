//! Error types for vidqa.

use thiserror::Error;

/// Library-level error type for vidqa operations.
#[derive(Error, Debug)]
pub enum VidqaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No captions available for video {0}")]
    TranscriptNotAvailable(String),

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("Indexing failed: {0}")]
    Indexing(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),
}

/// Coarse classification of a [`VidqaError`], stable across releases.
///
/// Transports map each kind to a distinct outward signal so clients can tell
/// bad input apart from upstream failures and missing sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    TranscriptUnavailable,
    IndexingFailure,
    SessionNotFound,
    GenerationFailure,
    Internal,
}

impl ErrorKind {
    /// Machine-readable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::TranscriptUnavailable => "transcript_unavailable",
            ErrorKind::IndexingFailure => "indexing_failure",
            ErrorKind::SessionNotFound => "session_not_found",
            ErrorKind::GenerationFailure => "generation_failure",
            ErrorKind::Internal => "internal",
        }
    }
}

impl VidqaError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VidqaError::InvalidInput(_) => ErrorKind::InvalidInput,
            VidqaError::TranscriptNotAvailable(_)
            | VidqaError::TranscriptUnavailable(_)
            | VidqaError::ToolNotFound(_) => ErrorKind::TranscriptUnavailable,
            VidqaError::Indexing(_) => ErrorKind::IndexingFailure,
            VidqaError::SessionNotFound(_) => ErrorKind::SessionNotFound,
            VidqaError::Generation(_) => ErrorKind::GenerationFailure,
            _ => ErrorKind::Internal,
        }
    }
}

/// Result type alias for vidqa operations.
pub type Result<T> = std::result::Result<T, VidqaError>;
