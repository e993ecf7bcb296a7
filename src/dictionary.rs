//! Spelling correction oracles.
//!
//! Two local correctors are provided: a frequency-ranked edit-distance
//! corrector and a Hunspell dictionary corrector (via zspell). Remote or
//! model-backed correctors implement [`SpellingOracle`] themselves and can be
//! wrapped in [`RetryingOracle`] to absorb transient failures.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use zspell::Dictionary;

use crate::error::{CleanError, OracleError, Result};

const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

// Edit distance 2 grows quadratically with word length; longer words only get distance 1
const MAX_EDITS2_CHARS: usize = 10;

/// Per-token spelling correction.
pub trait SpellingOracle: Send + Sync {
    /// Identifies the model or dictionary snapshot. Record it alongside results.
    fn version(&self) -> &str;

    /// Corrected form of `token`, or `None` if it should stay as it is.
    fn correct(&self, token: &str) -> std::result::Result<Option<String>, OracleError>;
}

impl<O: SpellingOracle + ?Sized> SpellingOracle for Arc<O> {
    fn version(&self) -> &str {
        (**self).version()
    }

    fn correct(&self, token: &str) -> std::result::Result<Option<String>, OracleError> {
        (**self).correct(token)
    }
}

/// Frequency-ranked corrector: known words stay, otherwise the most frequent
/// known word at edit distance 1 (then 2) wins. Ties go to the
/// lexicographically smallest word.
#[derive(Debug, Clone)]
pub struct FrequencyCorrector {
    version: String,
    counts: HashMap<String, u64>,
}

impl FrequencyCorrector {
    /// Loads a `word count` per line file. A line with only a word counts as 1.
    pub fn load(path: &Path) -> Result<Self> {
        let resource = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| CleanError::resource(&resource, e))?;

        let mut counts = HashMap::new();
        for (line_no, line) in content.lines().enumerate() {
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            let count = match fields.next() {
                Some(raw) => raw.parse::<u64>().map_err(|e| {
                    CleanError::resource(&resource, format!("line {}: {}", line_no + 1, e))
                })?,
                None => 1,
            };
            *counts.entry(word.to_lowercase()).or_insert(0) += count;
        }

        if counts.is_empty() {
            return Err(CleanError::resource(&resource, "word list is empty"));
        }

        info!("Loaded spelling frequencies {}: {} words", resource, counts.len());
        Ok(Self {
            version: format!("{}#{}", resource, counts.len()),
            counts,
        })
    }

    pub fn from_counts<I, S>(version: &str, counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let counts = counts
            .into_iter()
            .map(|(w, c)| (w.as_ref().to_lowercase(), c))
            .collect();
        Self {
            version: version.to_string(),
            counts,
        }
    }

    fn best_of<I: IntoIterator<Item = String>>(&self, candidates: I) -> Option<String> {
        let mut best: Option<(u64, String)> = None;
        for candidate in candidates {
            let Some(&count) = self.counts.get(&candidate) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some((best_count, best_word)) => {
                    count > *best_count || (count == *best_count && candidate < *best_word)
                }
            };
            if better {
                best = Some((count, candidate));
            }
        }
        best.map(|(_, word)| word)
    }
}

impl SpellingOracle for FrequencyCorrector {
    fn version(&self) -> &str {
        &self.version
    }

    fn correct(&self, token: &str) -> std::result::Result<Option<String>, OracleError> {
        let word = token.to_lowercase();
        if self.counts.contains_key(&word) {
            return Ok(None);
        }

        let first = edits1(&word);
        if let Some(best) = self.best_of(first.iter().cloned()) {
            return Ok(Some(best));
        }
        if word.chars().count() > MAX_EDITS2_CHARS {
            return Ok(None);
        }
        Ok(self.best_of(first.iter().flat_map(|e| edits1(e))))
    }
}

/// Hunspell-backed corrector. Words the dictionary accepts stay; otherwise the
/// first accepted word at edit distance 1, in lexicographic order.
pub struct HunspellCorrector {
    name: String,
    dict: Dictionary,
}

impl HunspellCorrector {
    /// Loads `<name>.aff` and `<name>.dic` from `dict_dir`.
    pub fn load(dict_dir: &Path, name: &str) -> Result<Self> {
        let dict = load_dict(dict_dir, name)?;
        Ok(Self {
            name: format!("hunspell:{}", name),
            dict,
        })
    }

    pub fn check(&self, word: &str) -> bool {
        if self.dict.check_word(word) {
            return true;
        }
        let lower = word.to_lowercase();
        lower != word && self.dict.check_word(&lower)
    }
}

impl SpellingOracle for HunspellCorrector {
    fn version(&self) -> &str {
        &self.name
    }

    fn correct(&self, token: &str) -> std::result::Result<Option<String>, OracleError> {
        if self.check(token) {
            return Ok(None);
        }
        let mut candidates: Vec<String> = edits1(&token.to_lowercase())
            .into_iter()
            .filter(|c| self.dict.check_word(c))
            .collect();
        candidates.sort();
        Ok(candidates.into_iter().next())
    }
}

/// Load a single Hunspell dictionary using zspell builder pattern
fn load_dict(dict_dir: &Path, name: &str) -> Result<Dictionary> {
    let aff_path = dict_dir.join(format!("{}.aff", name));
    let dic_path = dict_dir.join(format!("{}.dic", name));

    let aff_content = fs::read_to_string(&aff_path)
        .map_err(|e| CleanError::resource(aff_path.display().to_string(), e))?;
    let dic_content = fs::read_to_string(&dic_path)
        .map_err(|e| CleanError::resource(dic_path.display().to_string(), e))?;

    let dict = zspell::builder()
        .config_str(&aff_content)
        .dict_str(&dic_content)
        .build()
        .map_err(|e| CleanError::resource(name, e))?;

    info!("Loaded dictionary: {}", name);
    Ok(dict)
}

/// Retries transient failures of the wrapped oracle, up to `max_attempts`
/// calls per token. The last transient error is returned once attempts run out.
pub struct RetryingOracle<O> {
    inner: O,
    max_attempts: u32,
}

impl<O: SpellingOracle> RetryingOracle<O> {
    pub fn new(inner: O, max_attempts: u32) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
        }
    }
}

impl<O: SpellingOracle> SpellingOracle for RetryingOracle<O> {
    fn version(&self) -> &str {
        self.inner.version()
    }

    fn correct(&self, token: &str) -> std::result::Result<Option<String>, OracleError> {
        let mut attempt = 1;
        loop {
            match self.inner.correct(token) {
                Err(OracleError::Transient(reason)) if attempt < self.max_attempts => {
                    debug!(
                        "spelling oracle attempt {}/{} failed for {:?}: {}",
                        attempt, self.max_attempts, token, reason
                    );
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

/// All strings one delete, transpose, replace or insert away from `word`.
fn edits1(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut edits = Vec::with_capacity(54 * chars.len() + 25);

    for i in 0..=chars.len() {
        let (left, right) = chars.split_at(i);
        let prefix: String = left.iter().collect();

        if !right.is_empty() {
            let rest: String = right[1..].iter().collect();
            // delete
            edits.push(format!("{}{}", prefix, rest));
            for c in ALPHABET.chars() {
                if c != right[0] {
                    edits.push(format!("{}{}{}", prefix, c, rest));
                }
            }
        }
        if right.len() > 1 {
            let tail: String = right[2..].iter().collect();
            edits.push(format!("{}{}{}{}", prefix, right[1], right[0], tail));
        }
        let suffix: String = right.iter().collect();
        for c in ALPHABET.chars() {
            edits.push(format!("{}{}{}", prefix, c, suffix));
        }
    }

    edits
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn corrector() -> FrequencyCorrector {
        FrequencyCorrector::from_counts(
            "test",
            [("happy", 50), ("hello", 40), ("help", 30), ("world", 20), ("word", 25)],
        )
    }

    #[test]
    fn test_edits1_contains_basic_edits() {
        let edits = edits1("ab");
        assert!(edits.contains(&"b".to_string())); // delete
        assert!(edits.contains(&"ba".to_string())); // transpose
        assert!(edits.contains(&"cb".to_string())); // replace
        assert!(edits.contains(&"abc".to_string())); // insert
    }

    #[test]
    fn test_known_word_untouched() {
        assert_eq!(corrector().correct("hello").unwrap(), None);
        assert_eq!(corrector().correct("Hello").unwrap(), None);
    }

    #[test]
    fn test_distance_one_prefers_frequency() {
        // "wor" -> "word" (25) beats nothing else at distance 1
        assert_eq!(corrector().correct("wor").unwrap(), Some("word".to_string()));
        assert_eq!(corrector().correct("hapy").unwrap(), Some("happy".to_string()));
    }

    #[test]
    fn test_distance_two() {
        assert_eq!(corrector().correct("hpy").unwrap(), Some("happy".to_string()));
    }

    #[test]
    fn test_unknown_far_word() {
        assert_eq!(corrector().correct("zzzzzz").unwrap(), None);
    }

    #[test]
    fn test_load_frequency_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "the 100").unwrap();
        writeln!(file, "cat").unwrap();
        writeln!(file).unwrap();
        let c = FrequencyCorrector::load(file.path()).unwrap();
        assert_eq!(c.correct("teh").unwrap(), Some("the".to_string()));
        assert_eq!(c.correct("cat").unwrap(), None);
    }

    #[test]
    fn test_load_rejects_bad_count() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "the many").unwrap();
        assert!(matches!(
            FrequencyCorrector::load(file.path()),
            Err(CleanError::ResourceLoad { .. })
        ));
    }

    #[test]
    fn test_missing_hunspell_dictionary() {
        let err = HunspellCorrector::load(Path::new("/nonexistent"), "en_US").err().unwrap();
        assert!(matches!(err, CleanError::ResourceLoad { .. }));
    }

    #[test]
    fn test_hunspell_corrector() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tiny.aff"), "SET UTF-8\n").unwrap();
        fs::write(dir.path().join("tiny.dic"), "2\nhappy\nhello\n").unwrap();

        let corrector = HunspellCorrector::load(dir.path(), "tiny").unwrap();
        assert_eq!(corrector.version(), "hunspell:tiny");
        assert!(corrector.check("hello"));
        assert!(corrector.check("Hello"));
        assert_eq!(corrector.correct("Hello").unwrap(), None);
        assert_eq!(corrector.correct("hapy").unwrap(), Some("happy".to_string()));
        assert_eq!(corrector.correct("zzzz").unwrap(), None);
    }

    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    impl SpellingOracle for Flaky {
        fn version(&self) -> &str {
            "flaky"
        }

        fn correct(&self, _token: &str) -> std::result::Result<Option<String>, OracleError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(OracleError::Transient("timeout".to_string()))
            } else {
                Ok(Some("fixed".to_string()))
            }
        }
    }

    #[test]
    fn test_retry_recovers() {
        let oracle = RetryingOracle::new(
            Flaky {
                failures: 2,
                calls: AtomicU32::new(0),
            },
            3,
        );
        assert_eq!(oracle.correct("x").unwrap(), Some("fixed".to_string()));
        assert_eq!(oracle.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_retry_is_bounded() {
        let oracle = RetryingOracle::new(
            Flaky {
                failures: 10,
                calls: AtomicU32::new(0),
            },
            3,
        );
        assert!(matches!(oracle.correct("x"), Err(OracleError::Transient(_))));
        assert_eq!(oracle.inner.calls.load(Ordering::SeqCst), 3);
    }
}
