//! Error types for the tweet normalization pipeline.

use std::io;

use thiserror::Error;

/// Error type for ingestion, resource loading and rule application failures.
#[derive(Debug, Error)]
pub enum CleanError {
    /// A record could not be read as text.
    #[error("record {index} is not valid text: {reason}")]
    InvalidInput { index: usize, reason: String },

    /// A lexical resource (contraction table, dictionary, word list) failed to load,
    /// or a remote oracle stayed unavailable after all retries.
    #[error("failed to load lexical resource '{resource}': {reason}")]
    ResourceLoad { resource: String, reason: String },

    /// A rule raised on a specific record.
    #[error("rule '{rule}' failed on record {index}: {reason}")]
    RuleApplication {
        rule: &'static str,
        index: usize,
        reason: String,
    },

    /// The caller aborted the run between two stages.
    #[error("pipeline cancelled after {completed} of {total} stages")]
    Cancelled { completed: usize, total: usize },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CleanError {
    pub(crate) fn resource(resource: impl Into<String>, reason: impl ToString) -> Self {
        CleanError::ResourceLoad {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failure reported by a lexical oracle for a single lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The backing service or model was momentarily unavailable; retrying may help.
    #[error("transient oracle failure: {0}")]
    Transient(String),

    /// The oracle refused this token. Retrying will not change the answer.
    #[error("oracle rejected token: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, CleanError>;
