//! Pipeline orchestration.
//!
//! A [`Preprocessor`] owns the injected lexical resources and runs every stage
//! over the whole corpus before starting the next one. Stage order is fixed;
//! configuration can only switch the opt-in stages on.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{FailurePolicy, PipelineConfig};
use crate::contractions::{ContractionTable, LexicalResource};
use crate::corpus::{Corpus, Record};
use crate::dictionary::{RetryingOracle, SpellingOracle};
use crate::emoji::{EmojiOracle, UnicodeEmojiOracle};
use crate::error::{CleanError, OracleError, Result};
use crate::rules;

/// One normalization rule as a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    NormalizeUnicode,
    Lowercase,
    RemoveUsernames,
    RemoveUrls,
    SplitSlash,
    CollapseRepeatedPunctuation,
    ExpandContractions,
    RemoveMiscNoiseChars,
    RemoveHashtags,
    RemoveNumbers,
    RemoveElongatedCharacters,
    RemoveEmoticons,
    CorrectSpelling,
}

impl Stage {
    /// Stages every run goes through, in order.
    pub const DEFAULT_ORDER: [Stage; 11] = [
        Stage::Lowercase,
        Stage::RemoveUsernames,
        Stage::RemoveUrls,
        Stage::SplitSlash,
        Stage::CollapseRepeatedPunctuation,
        Stage::ExpandContractions,
        Stage::RemoveMiscNoiseChars,
        Stage::RemoveHashtags,
        Stage::RemoveNumbers,
        Stage::RemoveElongatedCharacters,
        Stage::RemoveEmoticons,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::NormalizeUnicode => "normalize_unicode",
            Stage::Lowercase => "lowercase",
            Stage::RemoveUsernames => "remove_usernames",
            Stage::RemoveUrls => "remove_urls",
            Stage::SplitSlash => "split_slash",
            Stage::CollapseRepeatedPunctuation => "collapse_repeated_punctuation",
            Stage::ExpandContractions => "expand_contractions",
            Stage::RemoveMiscNoiseChars => "remove_misc_noise_chars",
            Stage::RemoveHashtags => "remove_hashtags",
            Stage::RemoveNumbers => "remove_numbers",
            Stage::RemoveElongatedCharacters => "remove_elongated_characters",
            Stage::RemoveEmoticons => "remove_emoticons",
            Stage::CorrectSpelling => "correct_spelling",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared flag a caller sets to stop a run at the next stage boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A record a stage could not transform. The record kept its previous text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    /// Original index of the record.
    pub index: usize,
    pub stage: Stage,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub stages_applied: Vec<Stage>,
    pub flagged: Vec<RecordFailure>,
    /// Resource name to version, e.g. `"contractions" -> "builtin-en-1"`.
    pub resource_versions: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Processed {
    pub corpus: Corpus,
    pub report: RunReport,
}

pub struct PreprocessorBuilder {
    config: PipelineConfig,
    contractions: Option<Arc<dyn LexicalResource>>,
    emoji: Option<Arc<dyn EmojiOracle>>,
    spelling: Option<Arc<dyn SpellingOracle>>,
    cancel: Option<CancelToken>,
}

impl PreprocessorBuilder {
    /// Replaces the builtin contraction table.
    pub fn with_contractions<R: LexicalResource + 'static>(mut self, contractions: R) -> Self {
        self.contractions = Some(Arc::new(contractions));
        self
    }

    /// Replaces the default [`UnicodeEmojiOracle`].
    pub fn with_emoji_oracle<O: EmojiOracle + 'static>(mut self, oracle: O) -> Self {
        self.emoji = Some(Arc::new(oracle));
        self
    }

    /// Spelling oracle for the opt-in correction stage. It is wrapped in a
    /// [`RetryingOracle`] bounded by `spelling_max_attempts`.
    pub fn with_spelling<O: SpellingOracle + 'static>(mut self, oracle: O) -> Self {
        self.spelling = Some(Arc::new(oracle));
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn build(self) -> Result<Preprocessor> {
        let config = self.config;
        config.validate()?;

        let spelling: Option<Arc<dyn SpellingOracle>> = if config.spelling_correction {
            let oracle = self.spelling.ok_or_else(|| {
                CleanError::Configuration(
                    "spelling_correction is enabled but no spelling oracle was provided".to_string(),
                )
            })?;
            Some(Arc::new(RetryingOracle::new(oracle, config.spelling_max_attempts)))
        } else {
            if self.spelling.is_some() {
                debug!("spelling oracle provided but spelling_correction is off; ignoring it");
            }
            None
        };

        let mut stages = Vec::with_capacity(Stage::DEFAULT_ORDER.len() + 2);
        if config.unicode_normalization {
            stages.push(Stage::NormalizeUnicode);
        }
        stages.extend_from_slice(&Stage::DEFAULT_ORDER);
        if spelling.is_some() {
            stages.push(Stage::CorrectSpelling);
        }

        Ok(Preprocessor {
            config,
            stages,
            contractions: self
                .contractions
                .unwrap_or_else(|| Arc::new(ContractionTable::builtin())),
            emoji: self.emoji.unwrap_or_else(|| Arc::new(UnicodeEmojiOracle)),
            spelling,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

/// Runs the fixed stage sequence over a corpus.
pub struct Preprocessor {
    config: PipelineConfig,
    stages: Vec<Stage>,
    contractions: Arc<dyn LexicalResource>,
    emoji: Arc<dyn EmojiOracle>,
    spelling: Option<Arc<dyn SpellingOracle>>,
    cancel: CancelToken,
}

impl Preprocessor {
    pub fn builder(config: PipelineConfig) -> PreprocessorBuilder {
        PreprocessorBuilder {
            config,
            contractions: None,
            emoji: None,
            spelling: None,
            cancel: None,
        }
    }

    /// Default configuration with the builtin resources.
    pub fn new() -> Result<Self> {
        Self::builder(PipelineConfig::default()).build()
    }

    /// The stages this preprocessor runs, in order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn resource_versions(&self) -> BTreeMap<String, String> {
        let mut versions = BTreeMap::new();
        versions.insert(
            "contractions".to_string(),
            self.contractions.version().to_string(),
        );
        if let Some(spelling) = &self.spelling {
            versions.insert("spelling".to_string(), spelling.version().to_string());
        }
        versions
    }

    fn apply(&self, stage: Stage, text: &str) -> std::result::Result<String, OracleError> {
        let replacements = &self.config.replacements;
        let text = match stage {
            Stage::NormalizeUnicode => rules::normalize_unicode(text),
            Stage::Lowercase => rules::lowercase(text),
            Stage::RemoveUsernames => rules::remove_usernames(text, &replacements.username),
            Stage::RemoveUrls => rules::remove_urls(text, &replacements.url),
            Stage::SplitSlash => rules::split_slash(text),
            Stage::CollapseRepeatedPunctuation => {
                rules::collapse_repeated_punctuation(text, &replacements.repeated_punctuation)
            }
            Stage::ExpandContractions => rules::expand_contractions(text, &*self.contractions),
            Stage::RemoveMiscNoiseChars => rules::remove_misc_noise_chars(text),
            Stage::RemoveHashtags => rules::remove_hashtags(text),
            Stage::RemoveNumbers => rules::remove_numbers(text, &replacements.number),
            Stage::RemoveElongatedCharacters => {
                rules::remove_elongated_characters(text, self.config.elongation_min_run)
            }
            Stage::RemoveEmoticons => rules::remove_emoticons(text, &*self.emoji),
            Stage::CorrectSpelling => match &self.spelling {
                Some(oracle) => rules::correct_spelling(text, &**oracle)?,
                None => text.to_string(),
            },
        };
        Ok(text)
    }

    fn run_stage(
        &self,
        stage: Stage,
        records: Vec<Record>,
        flagged: &mut Vec<RecordFailure>,
    ) -> Result<Vec<Record>> {
        let outcomes: Vec<_> = if self.config.parallel {
            records
                .par_iter()
                .map(|record| self.apply(stage, record.text()))
                .collect()
        } else {
            records
                .iter()
                .map(|record| self.apply(stage, record.text()))
                .collect()
        };

        let mut next = Vec::with_capacity(records.len());
        for (record, outcome) in records.into_iter().zip(outcomes) {
            match outcome {
                Ok(text) => next.push(record.with_text(text)),
                Err(OracleError::Transient(reason)) => {
                    let resource = self
                        .spelling
                        .as_ref()
                        .map(|s| format!("spelling:{}", s.version()))
                        .unwrap_or_else(|| stage.name().to_string());
                    return Err(CleanError::ResourceLoad { resource, reason });
                }
                Err(OracleError::Rejected(reason)) => match self.config.failure_policy {
                    FailurePolicy::FailBatch => {
                        return Err(CleanError::RuleApplication {
                            rule: stage.name(),
                            index: record.index(),
                            reason,
                        });
                    }
                    FailurePolicy::SkipAndReport => {
                        warn!("{} failed on record {}: {}", stage, record.index(), reason);
                        flagged.push(RecordFailure {
                            index: record.index(),
                            stage,
                            reason,
                        });
                        next.push(record);
                    }
                },
            }
        }
        Ok(next)
    }

    /// Runs every stage over `corpus`. The output has the same records, in the
    /// same order, with their original indices.
    pub fn preprocess(&self, corpus: Corpus) -> Result<Processed> {
        let total = self.stages.len();
        info!(
            "Preprocessing {} records through {} stages (parallel: {})",
            corpus.len(),
            total,
            self.config.parallel
        );

        let mut report = RunReport {
            resource_versions: self.resource_versions(),
            ..RunReport::default()
        };
        let mut records = corpus.into_records();

        for (completed, &stage) in self.stages.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("Cancelled before stage {} ({}/{})", stage, completed, total);
                return Err(CleanError::Cancelled { completed, total });
            }

            let started = Instant::now();
            records = self.run_stage(stage, records, &mut report.flagged)?;
            report.stages_applied.push(stage);
            debug!("Stage {} done in {:?}", stage, started.elapsed());
        }

        info!(
            "Preprocessed {} records, {} flagged",
            records.len(),
            report.flagged.len()
        );
        Ok(Processed {
            corpus: Corpus::from_records(records),
            report,
        })
    }

    /// Cleans a single text with the same stages as [`Preprocessor::preprocess`].
    pub fn clean_text(&self, text: &str) -> Result<String> {
        let processed = self.preprocess(Corpus::from_texts([text]))?;
        Ok(processed.corpus.into_texts().into_iter().next().unwrap_or_default())
    }
}
