//! Tweet text normalization.
//!
//! A fixed sequence of pure text rules (lowercasing, mention/link/hashtag/number
//! stripping, contraction expansion, de-elongation, emoji removal) applied to a
//! corpus of tweets, plus a few corpus-level features computed over the result.
//!
//! ```no_run
//! use tweet_clean::{Corpus, Preprocessor};
//!
//! let preprocessor = Preprocessor::new()?;
//! let processed = preprocessor.preprocess(Corpus::from_texts(["I'm sooo happy!!!"]))?;
//! assert_eq!(processed.corpus.len(), 1);
//! # Ok::<(), tweet_clean::CleanError>(())
//! ```

pub mod config;
pub mod contractions;
pub mod corpus;
pub mod dictionary;
pub mod emoji;
pub mod error;
pub mod ngrams;
pub mod pipeline;
pub mod rules;
pub mod scoring;

#[cfg(feature = "python")]
mod python;

pub use config::{FailurePolicy, PipelineConfig, Replacements};
pub use contractions::{ContractionTable, LexicalResource};
pub use corpus::{Corpus, Ingested, RawRecord, Record};
pub use dictionary::{FrequencyCorrector, HunspellCorrector, RetryingOracle, SpellingOracle};
pub use emoji::{EmojiOracle, UnicodeEmojiOracle};
pub use error::{CleanError, OracleError, Result};
pub use ngrams::top_ngrams;
pub use pipeline::{
    CancelToken, Preprocessor, PreprocessorBuilder, Processed, RecordFailure, RunReport, Stage,
};
pub use scoring::{ReferenceList, TweetInfo, score, tweet_info};
