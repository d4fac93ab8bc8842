//! Error taxonomy for the advisor pipeline.
//!
//! Three categories drive recovery policy:
//! - [`AdvisorError::Config`] is fatal: surfaced before any query is accepted.
//! - [`AdvisorError::ContentUnavailable`] is recovered per source: the failed
//!   source is skipped and the corpus proceeds with whatever loaded.
//! - [`AdvisorError::Completion`] is recovered per turn: the session replies
//!   with a fixed fallback message instead of surfacing the error.

use thiserror::Error;

/// Unified error type for the advisor library.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Content unavailable: {0}")]
    ContentUnavailable(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Completion service error: {0}")]
    Completion(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
