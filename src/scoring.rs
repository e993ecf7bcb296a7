//! Batch feature scoring over a corpus.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::info;
use rayon::prelude::*;
use serde::Serialize;

use crate::corpus::Corpus;
use crate::error::{CleanError, Result};

/// Case-sensitive set of reference words (e.g. medication names).
#[derive(Debug, Clone, Default)]
pub struct ReferenceList {
    words: HashSet<String>,
}

impl ReferenceList {
    /// Loads one word per line. Lines are trimmed; blank lines are ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CleanError::resource(path.display().to_string(), e))?;
        let list = Self::from_words(content.lines());
        info!("Loaded reference list {}: {} words", path.display(), list.len());
        Ok(list)
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of whitespace-delimited tokens of `text` present in the list.
    /// Every occurrence counts.
    pub fn count_matches(&self, text: &str) -> usize {
        text.split_whitespace().filter(|t| self.contains(t)).count()
    }
}

/// One score per record, in corpus order.
pub fn score(corpus: &Corpus, reference: &ReferenceList) -> Vec<usize> {
    corpus
        .records()
        .par_iter()
        .map(|record| reference.count_matches(record.text()))
        .collect()
}

/// Structural counts taken from a raw tweet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TweetInfo {
    /// Length in characters.
    pub length: usize,
    pub hashtags: usize,
    pub exclamation_marks: usize,
    pub question_marks: usize,
    /// `@` mentions.
    pub tags: usize,
    /// Occurrences of `.`, `,`, `:` and `;`.
    pub punctuations: usize,
    pub words: usize,
}

impl TweetInfo {
    pub fn from_text(text: &str) -> Self {
        let mut info = TweetInfo {
            words: text.split_whitespace().count(),
            ..TweetInfo::default()
        };
        for c in text.chars() {
            info.length += 1;
            match c {
                '#' => info.hashtags += 1,
                '!' => info.exclamation_marks += 1,
                '?' => info.question_marks += 1,
                '@' => info.tags += 1,
                '.' | ',' | ':' | ';' => info.punctuations += 1,
                _ => {}
            }
        }
        info
    }
}

/// Structural counts for every record, in corpus order. Run this on the raw
/// corpus: preprocessing removes most of what it counts.
pub fn tweet_info(corpus: &Corpus) -> Vec<TweetInfo> {
    corpus
        .records()
        .par_iter()
        .map(|record| TweetInfo::from_text(record.text()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_score_single_match() {
        let corpus = Corpus::from_texts(["take aspirin now"]);
        let reference = ReferenceList::from_words(["aspirin"]);
        assert_eq!(score(&corpus, &reference), vec![1]);
    }

    #[test]
    fn test_score_is_exact_and_case_sensitive() {
        let corpus = Corpus::from_texts([
            "Aspirin and aspirin, aspirin",
            "no meds",
            "ibuprofen aspirin ibuprofen",
        ]);
        let reference = ReferenceList::from_words(["aspirin", "ibuprofen"]);
        assert_eq!(score(&corpus, &reference), vec![1, 0, 3]);
    }

    #[test]
    fn test_load_reference_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "aspirin").unwrap();
        writeln!(file, "  paracetamol  ").unwrap();
        writeln!(file).unwrap();
        let reference = ReferenceList::load(file.path()).unwrap();
        assert_eq!(reference.len(), 2);
        assert!(reference.contains("paracetamol"));
    }

    #[test]
    fn test_load_missing_reference_list() {
        let err = ReferenceList::load(Path::new("/nonexistent/meds.txt")).unwrap_err();
        assert!(matches!(err, CleanError::ResourceLoad { .. }));
    }

    #[test]
    fn test_tweet_info() {
        let info = TweetInfo::from_text("Wow!! @ana #fun, really? yes.");
        assert_eq!(
            info,
            TweetInfo {
                length: 29,
                hashtags: 1,
                exclamation_marks: 2,
                question_marks: 1,
                tags: 1,
                punctuations: 2,
                words: 5,
            }
        );
    }

    #[test]
    fn test_tweet_info_aligned_with_corpus() {
        let corpus = Corpus::from_texts(["a", "b c", ""]);
        let words: Vec<usize> = tweet_info(&corpus).iter().map(|i| i.words).collect();
        assert_eq!(words, vec![1, 2, 0]);
    }
}
