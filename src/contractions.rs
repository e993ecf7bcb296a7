//! Contraction expansion table.
//!
//! Loaded once, read-only for the whole run. The builtin table covers the
//! common English contractions plus a few informal forms seen in tweets.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::info;

use crate::error::{CleanError, Result};

/// A read-only word → replacement mapping shared by every rule invocation.
pub trait LexicalResource: Send + Sync {
    /// Identifies the snapshot of the resource, for reproducibility.
    fn version(&self) -> &str;

    /// Replacement for `token`, or `None` to keep it unchanged.
    fn lookup(&self, token: &str) -> Option<Cow<'_, str>>;
}

const BUILTIN_VERSION: &str = "builtin-en-1";

// Keys are lowercase with a straight apostrophe
const BUILTIN_CONTRACTIONS: &[(&str, &str)] = &[
    ("ain't", "are not"),
    ("aren't", "are not"),
    ("can't", "cannot"),
    ("can't've", "cannot have"),
    ("'cause", "because"),
    ("could've", "could have"),
    ("couldn't", "could not"),
    ("couldn't've", "could not have"),
    ("didn't", "did not"),
    ("doesn't", "does not"),
    ("don't", "do not"),
    ("hadn't", "had not"),
    ("hasn't", "has not"),
    ("haven't", "have not"),
    ("he'd", "he would"),
    ("he'll", "he will"),
    ("he's", "he is"),
    ("how'd", "how did"),
    ("how'll", "how will"),
    ("how's", "how is"),
    ("i'd", "i would"),
    ("i'd've", "i would have"),
    ("i'll", "i will"),
    ("i'm", "i am"),
    ("i've", "i have"),
    ("isn't", "is not"),
    ("it'd", "it would"),
    ("it'll", "it will"),
    ("it's", "it is"),
    ("let's", "let us"),
    ("ma'am", "madam"),
    ("mayn't", "may not"),
    ("might've", "might have"),
    ("mightn't", "might not"),
    ("must've", "must have"),
    ("mustn't", "must not"),
    ("needn't", "need not"),
    ("o'clock", "of the clock"),
    ("oughtn't", "ought not"),
    ("shan't", "shall not"),
    ("she'd", "she would"),
    ("she'll", "she will"),
    ("she's", "she is"),
    ("should've", "should have"),
    ("shouldn't", "should not"),
    ("that'd", "that would"),
    ("that's", "that is"),
    ("there'd", "there would"),
    ("there's", "there is"),
    ("they'd", "they would"),
    ("they'll", "they will"),
    ("they're", "they are"),
    ("they've", "they have"),
    ("wasn't", "was not"),
    ("we'd", "we would"),
    ("we'll", "we will"),
    ("we're", "we are"),
    ("we've", "we have"),
    ("weren't", "were not"),
    ("what'll", "what will"),
    ("what're", "what are"),
    ("what's", "what is"),
    ("what've", "what have"),
    ("when's", "when is"),
    ("where'd", "where did"),
    ("where's", "where is"),
    ("where've", "where have"),
    ("who'll", "who will"),
    ("who's", "who is"),
    ("who've", "who have"),
    ("why's", "why is"),
    ("won't", "will not"),
    ("would've", "would have"),
    ("wouldn't", "would not"),
    ("y'all", "you all"),
    ("you'd", "you would"),
    ("you'll", "you will"),
    ("you're", "you are"),
    ("you've", "you have"),
    // informal
    ("gonna", "going to"),
    ("gotta", "got to"),
    ("wanna", "want to"),
    ("gimme", "give me"),
    ("lemme", "let me"),
    ("ya'll", "you all"),
    ("yall", "you all"),
    ("dunno", "do not know"),
];

/// Contraction expansions keyed by lowercase contraction.
#[derive(Debug, Clone)]
pub struct ContractionTable {
    version: String,
    entries: HashMap<String, String>,
}

impl ContractionTable {
    /// The bundled English table.
    pub fn builtin() -> Self {
        let entries = BUILTIN_CONTRACTIONS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            version: BUILTIN_VERSION.to_string(),
            entries,
        }
    }

    /// Loads a tab-separated `contraction<TAB>expansion` file. Blank lines and
    /// lines starting with `#` are ignored. The file name becomes the version.
    pub fn load(path: &Path) -> Result<Self> {
        let resource = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| CleanError::resource(&resource, e))?;

        let mut entries = HashMap::new();
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('\t').ok_or_else(|| {
                CleanError::resource(&resource, format!("line {}: expected a tab", line_no + 1))
            })?;
            entries.insert(normalize_key(key.trim()).into_owned(), value.trim().to_string());
        }

        info!("Loaded contraction table {}: {} entries", resource, entries.len());
        Ok(Self {
            version: resource,
            entries,
        })
    }

    pub fn from_entries<I, K, V>(version: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (normalize_key(k.as_ref()).into_owned(), v.into()))
            .collect();
        Self {
            version: version.to_string(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ContractionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LexicalResource for ContractionTable {
    fn version(&self) -> &str {
        &self.version
    }

    fn lookup(&self, token: &str) -> Option<Cow<'_, str>> {
        let key = normalize_key(token);
        self.entries
            .get(key.as_ref())
            .map(|expansion| Cow::Borrowed(expansion.as_str()))
    }
}

/// Lowercase and straighten curly apostrophes.
fn normalize_key(token: &str) -> Cow<'_, str> {
    if token.chars().any(|c| c == '’' || c.is_uppercase()) {
        Cow::Owned(token.replace('’', "'").to_lowercase())
    } else {
        Cow::Borrowed(token)
    }
}
