use std::path::Path;

use lazy_static::lazy_static;
use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::config::PipelineConfig;
use crate::contractions::ContractionTable;
use crate::corpus::{Corpus, RawRecord};
use crate::emoji::UnicodeEmojiOracle;
use crate::error::CleanError;
use crate::pipeline::Preprocessor;
use crate::scoring::{self, ReferenceList};
use crate::{ngrams, rules};

lazy_static! {
    static ref BUILTIN_CONTRACTIONS: ContractionTable = ContractionTable::builtin();
}

fn to_py_err(err: CleanError) -> PyErr {
    match err {
        CleanError::InvalidInput { .. } | CleanError::Configuration(_) | CleanError::Json(_) => {
            PyValueError::new_err(err.to_string())
        }
        CleanError::ResourceLoad { .. } | CleanError::Io(_) => PyIOError::new_err(err.to_string()),
        CleanError::RuleApplication { .. } | CleanError::Cancelled { .. } => {
            PyRuntimeError::new_err(err.to_string())
        }
    }
}

/// Run the full pipeline over a text column. `None` entries are invalid records.
/// Returns: (cleaned texts, skipped indices)
#[pyfunction]
#[pyo3(signature = (texts, config_json=None))]
fn preprocess(
    texts: Vec<Option<String>>,
    config_json: Option<String>,
) -> PyResult<(Vec<String>, Vec<usize>)> {
    let config = match config_json {
        Some(json) => PipelineConfig::from_json_str(&json).map_err(to_py_err)?,
        None => PipelineConfig::default(),
    };
    let policy = config.failure_policy;

    let ingested =
        Corpus::ingest(texts.into_iter().map(RawRecord::from), policy).map_err(to_py_err)?;
    let preprocessor = Preprocessor::builder(config).build().map_err(to_py_err)?;
    let processed = preprocessor.preprocess(ingested.corpus).map_err(to_py_err)?;

    Ok((processed.corpus.into_texts(), ingested.skipped))
}

#[pyfunction]
fn lowercase(text: &str) -> String {
    rules::lowercase(text)
}

#[pyfunction]
#[pyo3(signature = (text, replacement=""))]
fn remove_usernames(text: &str, replacement: &str) -> String {
    rules::remove_usernames(text, replacement)
}

#[pyfunction]
#[pyo3(signature = (text, replacement=""))]
fn remove_urls(text: &str, replacement: &str) -> String {
    rules::remove_urls(text, replacement)
}

#[pyfunction]
fn split_slash(text: &str) -> String {
    rules::split_slash(text)
}

#[pyfunction]
#[pyo3(signature = (text, marker=""))]
fn collapse_repeated_punctuation(text: &str, marker: &str) -> String {
    rules::collapse_repeated_punctuation(text, marker)
}

#[pyfunction]
fn expand_contractions(text: &str) -> String {
    rules::expand_contractions(text, &*BUILTIN_CONTRACTIONS)
}

#[pyfunction]
fn remove_misc_noise_chars(text: &str) -> String {
    rules::remove_misc_noise_chars(text)
}

#[pyfunction]
fn remove_hashtags(text: &str) -> String {
    rules::remove_hashtags(text)
}

#[pyfunction]
#[pyo3(signature = (text, replacement=""))]
fn remove_numbers(text: &str, replacement: &str) -> String {
    rules::remove_numbers(text, replacement)
}

#[pyfunction]
#[pyo3(signature = (text, min_run=3))]
fn remove_elongated_characters(text: &str, min_run: usize) -> PyResult<String> {
    if min_run < 2 {
        return Err(PyValueError::new_err("min_run must be at least 2"));
    }
    Ok(rules::remove_elongated_characters(text, min_run))
}

#[pyfunction]
fn remove_emoticons(text: &str) -> String {
    rules::remove_emoticons(text, &UnicodeEmojiOracle)
}

/// Count medication names per tweet
/// Returns: one count per text, same order
#[pyfunction]
fn medication_score(texts: Vec<String>, reference_path: String) -> PyResult<Vec<usize>> {
    let reference = ReferenceList::load(Path::new(&reference_path)).map_err(to_py_err)?;
    Ok(scoring::score(&Corpus::from_texts(texts), &reference))
}

/// Structural features of one tweet
#[pyclass(name = "TweetInfo")]
#[derive(Clone)]
struct PyTweetInfo {
    #[pyo3(get)]
    length: usize,
    #[pyo3(get)]
    hashtags: usize,
    #[pyo3(get)]
    exclamation_marks: usize,
    #[pyo3(get)]
    question_marks: usize,
    #[pyo3(get)]
    tags: usize,
    #[pyo3(get)]
    punctuations: usize,
    #[pyo3(get)]
    words: usize,
}

impl From<scoring::TweetInfo> for PyTweetInfo {
    fn from(info: scoring::TweetInfo) -> Self {
        Self {
            length: info.length,
            hashtags: info.hashtags,
            exclamation_marks: info.exclamation_marks,
            question_marks: info.question_marks,
            tags: info.tags,
            punctuations: info.punctuations,
            words: info.words,
        }
    }
}

#[pyfunction]
fn tweet_info(texts: Vec<String>) -> Vec<PyTweetInfo> {
    scoring::tweet_info(&Corpus::from_texts(texts))
        .into_iter()
        .map(PyTweetInfo::from)
        .collect()
}

/// Most frequent word n-grams
/// Returns: list of (ngram, count), most frequent first
#[pyfunction]
#[pyo3(signature = (texts, n=1, limit=20, remove_stopwords=true))]
fn top_ngrams(
    texts: Vec<String>,
    n: usize,
    limit: usize,
    remove_stopwords: bool,
) -> PyResult<Vec<(String, usize)>> {
    ngrams::top_ngrams(&texts, n, limit, remove_stopwords).map_err(to_py_err)
}

#[pymodule]
fn tweet_clean(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(preprocess, m)?)?;
    m.add_function(wrap_pyfunction!(lowercase, m)?)?;
    m.add_function(wrap_pyfunction!(remove_usernames, m)?)?;
    m.add_function(wrap_pyfunction!(remove_urls, m)?)?;
    m.add_function(wrap_pyfunction!(split_slash, m)?)?;
    m.add_function(wrap_pyfunction!(collapse_repeated_punctuation, m)?)?;
    m.add_function(wrap_pyfunction!(expand_contractions, m)?)?;
    m.add_function(wrap_pyfunction!(remove_misc_noise_chars, m)?)?;
    m.add_function(wrap_pyfunction!(remove_hashtags, m)?)?;
    m.add_function(wrap_pyfunction!(remove_numbers, m)?)?;
    m.add_function(wrap_pyfunction!(remove_elongated_characters, m)?)?;
    m.add_function(wrap_pyfunction!(remove_emoticons, m)?)?;
    m.add_function(wrap_pyfunction!(medication_score, m)?)?;
    m.add_function(wrap_pyfunction!(tweet_info, m)?)?;
    m.add_function(wrap_pyfunction!(top_ngrams, m)?)?;
    m.add_class::<PyTweetInfo>()?;
    Ok(())
}
