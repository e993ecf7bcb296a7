//! Pipeline configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CleanError, Result};

/// What to do when a single record cannot be ingested or transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// The first failing record fails the whole batch.
    #[default]
    FailBatch,
    /// Failing records are skipped (ingestion) or left untouched for the failing
    /// stage (pipeline), and their indices are reported.
    SkipAndReport,
}

/// Replacement text for the rules that substitute matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Replacements {
    /// Replaces `@username` mentions.
    pub username: String,
    /// Replaces `http(s)://` links.
    pub url: String,
    /// Replaces bare numeric tokens.
    pub number: String,
    /// Appended after each collapsed punctuation run, e.g. `" _PUNCT_REPEATED_"`.
    pub repeated_punctuation: String,
}

/// Main configuration for a preprocessing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub replacements: Replacements,

    /// Runs of identical word characters at least this long collapse to one.
    /// Default: 3 (so "sooooo" becomes "so" and "good" stays).
    pub elongation_min_run: usize,

    /// Run NFC normalization before lowercasing.
    /// Default: false.
    pub unicode_normalization: bool,

    /// Run spelling correction as the last stage. Requires a spelling oracle.
    /// Default: false.
    pub spelling_correction: bool,

    /// Attempts per token for transient spelling oracle failures.
    /// Default: 3.
    pub spelling_max_attempts: u32,

    /// Shard each stage across the rayon thread pool.
    /// Default: false.
    pub parallel: bool,

    pub failure_policy: FailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            replacements: Replacements::default(),
            elongation_min_run: 3,
            unicode_normalization: false,
            spelling_correction: false,
            spelling_max_attempts: 3,
            parallel: false,
            failure_policy: FailurePolicy::FailBatch,
        }
    }
}

impl PipelineConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.elongation_min_run < 2 {
            return Err(CleanError::Configuration(format!(
                "elongation_min_run must be at least 2, got {}",
                self.elongation_min_run
            )));
        }
        if self.spelling_max_attempts == 0 {
            return Err(CleanError::Configuration(
                "spelling_max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
