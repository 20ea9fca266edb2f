//! Error types for the analysis subsystem.

use thiserror::Error;

use crate::analysis::core::language::Language;
use crate::analysis::generation::backend::GenerationTask;

/// Analysis subsystem error type.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A stored row could not be mapped back into a domain record.
    #[error("invalid stored record: {0}")]
    InvalidRecord(String),
    /// No usable transcript line was found in any requested conversation.
    #[error("no extractable conversation content")]
    NoExtractableContent,
    /// No backend could be initialized for the requested slot.
    #[error("no backend available for {task}/{language}")]
    BackendUnavailable {
        /// Generation task of the missing slot.
        task: GenerationTask,
        /// Language of the missing slot.
        language: Language,
    },
    /// A single generation call failed (model error, malformed output, timeout).
    #[error("generation failed: {0}")]
    Generation(String),
    /// A referenced record does not exist or is not owned by the caller.
    #[error("{0} not found")]
    NotFound(String),
    /// The conversation exists but has no lines to work with.
    #[error("conversation has no lines")]
    NoContent,
    /// `SQLite` storage error (sync).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// `SQLite` storage error (async).
    #[error("tokio-rusqlite error: {0}")]
    TokioSqlite(#[from] tokio_rusqlite::Error),
    /// HTTP client error from Rig.
    #[error("http client error: {0}")]
    HttpClient(#[from] rig::http_client::Error),
    /// Completion error from a generation backend.
    #[error("completion error: {0}")]
    Completion(#[from] rig::completion::CompletionError),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Convenience result alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
