//! Typed corpus of text records.

use log::warn;

use crate::config::FailurePolicy;
use crate::error::{CleanError, Result};

/// A raw value taken from one row of an input column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    Text(String),
    Bytes(Vec<u8>),
    Missing,
}

impl From<String> for RawRecord {
    fn from(text: String) -> Self {
        RawRecord::Text(text)
    }
}

impl From<&str> for RawRecord {
    fn from(text: &str) -> Self {
        RawRecord::Text(text.to_string())
    }
}

impl From<Vec<u8>> for RawRecord {
    fn from(bytes: Vec<u8>) -> Self {
        RawRecord::Bytes(bytes)
    }
}

impl<T: Into<RawRecord>> From<Option<T>> for RawRecord {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RawRecord::Missing)
    }
}

impl RawRecord {
    fn into_text(self, index: usize) -> Result<String> {
        match self {
            RawRecord::Text(text) => Ok(text),
            RawRecord::Bytes(bytes) => {
                String::from_utf8(bytes).map_err(|e| CleanError::InvalidInput {
                    index,
                    reason: format!("not UTF-8: {}", e),
                })
            }
            RawRecord::Missing => Err(CleanError::InvalidInput {
                index,
                reason: "missing value".to_string(),
            }),
        }
    }
}

/// One tweet, identified by its position in the input column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    index: usize,
    text: String,
}

impl Record {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Position of this record in the original input.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn with_text(&self, text: String) -> Self {
        Self {
            index: self.index,
            text,
        }
    }
}

/// Ordered sequence of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    records: Vec<Record>,
}

/// Result of ingesting a raw column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested {
    pub corpus: Corpus,
    /// Original indices of records that were not valid text.
    pub skipped: Vec<usize>,
}

impl Corpus {
    /// Builds a corpus from values that are already text, indexed from zero.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Record::new(index, text))
            .collect();
        Self { records }
    }

    /// Validates a raw column. Under [`FailurePolicy::SkipAndReport`] invalid records
    /// are left out and their indices reported.
    pub fn ingest<I, R>(records: I, policy: FailurePolicy) -> Result<Ingested>
    where
        I: IntoIterator<Item = R>,
        R: Into<RawRecord>,
    {
        let mut valid = Vec::new();
        let mut skipped = Vec::new();

        for (index, raw) in records.into_iter().enumerate() {
            match raw.into().into_text(index) {
                Ok(text) => valid.push(Record::new(index, text)),
                Err(e) => match policy {
                    FailurePolicy::FailBatch => return Err(e),
                    FailurePolicy::SkipAndReport => {
                        warn!("skipping record {}: {}", index, e);
                        skipped.push(index);
                    }
                },
            }
        }

        Ok(Ingested {
            corpus: Corpus { records: valid },
            skipped,
        })
    }

    /// Picks the text column out of arbitrary rows.
    pub fn select<T, I, F, R>(rows: I, mut selector: F, policy: FailurePolicy) -> Result<Ingested>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(T) -> R,
        R: Into<RawRecord>,
    {
        Self::ingest(rows.into_iter().map(|row| selector(row)), policy)
    }

    pub(crate) fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub(crate) fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.text())
    }

    pub fn into_texts(self) -> Vec<String> {
        self.records.into_iter().map(|r| r.text).collect()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
