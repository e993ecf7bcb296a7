//! Rule primitives: pure text-to-text transformations.
//!
//! Every rule takes one tweet and returns its normalized form. Rules are
//! order-sensitive relative to each other; the pipeline in [`crate::pipeline`]
//! fixes the order. Rules that need a lexical resource receive it as an argument
//! and never own it.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{NoExpand, Regex};
use unicode_normalization::UnicodeNormalization;

use crate::contractions::LexicalResource;
use crate::dictionary::SpellingOracle;
use crate::emoji::{self, EmojiOracle};
use crate::error::OracleError;

// Pre-compile all rule patterns at module load time
lazy_static! {
    static ref USERNAME_PATTERN: Regex = Regex::new(r"@\w+").unwrap();
    static ref URL_PATTERN: Regex = Regex::new(r"https?://[A-Za-z.0-9/]*").unwrap();
    static ref HASHTAG_PATTERN: Regex = Regex::new(r"#\S+").unwrap();
    // Optional sign, internal separators: -3.5 1,000 12:30 .5
    static ref NUMBER_PATTERN: Regex = Regex::new(r"[-+]?[.\d]*\d+[:,.\d]*").unwrap();

    // Applied top to bottom. Dot/hyphen splitting must come before hyphen stripping.
    static ref MISC_SUBSTITUTIONS: Vec<(Regex, &'static str)> = {
        vec![
            // word.word -> word . word
            (Regex::new(r"(\w)\.(\w)").unwrap(), "$1 . $2"),
            // word-word -> word - word
            (Regex::new(r"(\w)-(\w)").unwrap(), "$1 - $2"),
            (Regex::new(r"\|").unwrap(), ""),
            (Regex::new(r"'").unwrap(), ""),
            (Regex::new(r"-").unwrap(), ""),
            (Regex::new(r"•").unwrap(), ""),
            (Regex::new(r"[‘’“”~…¿°⌓¬_]").unwrap(), ""),
            // HTML entities
            (Regex::new(r"&amp;").unwrap(), "and"),
            (Regex::new(r"&lt;").unwrap(), "<"),
            (Regex::new(r"&gt;").unwrap(), ">"),
        ]
    };
}

/// Locale-invariant lowercasing. Idempotent.
pub fn lowercase(text: &str) -> String {
    text.to_lowercase()
}

/// Canonical composition (NFC), so that visually equal text compares equal.
pub fn normalize_unicode(text: &str) -> String {
    text.nfc().collect()
}

/// Replaces `@user` mentions.
pub fn remove_usernames(text: &str, replacement: &str) -> String {
    USERNAME_PATTERN
        .replace_all(text, NoExpand(replacement))
        .into_owned()
}

/// Replaces `http(s)://` links made of letters, digits, dots and slashes.
pub fn remove_urls(text: &str, replacement: &str) -> String {
    URL_PATTERN.replace_all(text, NoExpand(replacement)).into_owned()
}

/// Pads every `/` with spaces. Must run after [`remove_urls`], otherwise links
/// are fragmented and no longer match.
pub fn split_slash(text: &str) -> String {
    text.replace('/', " / ")
}

/// Shortens each run of two or more identical `!`, `?` or `.` to a single
/// character followed by `marker`.
///
/// `"wow!!!??"` becomes `"wow!?"` with an empty marker.
pub fn collapse_repeated_punctuation(text: &str, marker: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        result.push(c);
        if !matches!(c, '!' | '?' | '.') {
            continue;
        }
        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        if run >= 2 {
            result.push_str(marker);
        }
    }

    result
}

/// Collapses runs of at least `min_run` identical word characters to one
/// character, word by word. Words are rejoined with single spaces.
///
/// This is a mechanical collapse and not dictionary aware: `"hellooo"` becomes
/// `"helo"` with a `min_run` of 2 and `"hello"` with 3. A `min_run` of 2 also
/// collapses legitimate double letters.
pub fn remove_elongated_characters(text: &str, min_run: usize) -> String {
    text.split_whitespace()
        .map(|word| collapse_runs(word, min_run))
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_runs(word: &str, min_run: usize) -> Cow<'_, str> {
    let chars: Vec<char> = word.chars().collect();
    let mut result = String::with_capacity(word.len());
    let mut changed = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let mut j = i + 1;
        while j < chars.len() && chars[j] == c {
            j += 1;
        }
        let run = j - i;
        if run >= min_run && is_word_char(c) {
            result.push(c);
            changed = true;
        } else {
            result.extend(std::iter::repeat_n(c, run));
        }
        i = j;
    }

    if changed {
        Cow::Owned(result)
    } else {
        Cow::Borrowed(word)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Expands each whitespace-delimited token through `contractions`. Tokens
/// without an entry pass through unchanged. Tokens are rejoined with single
/// spaces.
pub fn expand_contractions(text: &str, contractions: &dyn LexicalResource) -> String {
    text.split_whitespace()
        .map(|token| expand_token(token, contractions))
        .collect::<Vec<_>>()
        .join(" ")
}

fn expand_token<'a>(token: &'a str, contractions: &dyn LexicalResource) -> Cow<'a, str> {
    if let Some(expansion) = contractions.lookup(token) {
        return Cow::Owned(expansion.into_owned());
    }

    // Retry without surrounding punctuation: "i'm," -> "i am,"
    let is_edge = |c: char| !c.is_alphanumeric() && c != '\'' && c != '’';
    let core = token.trim_matches(is_edge);
    if core.is_empty() || core.len() == token.len() {
        return Cow::Borrowed(token);
    }
    match contractions.lookup(core) {
        Some(expansion) => {
            let start = token.len() - token.trim_start_matches(is_edge).len();
            let end = start + core.len();
            Cow::Owned(format!("{}{}{}", &token[..start], expansion, &token[end..]))
        }
        None => Cow::Borrowed(token),
    }
}

/// Splits `word.word` and `word-word`, strips quotes, bullets, pipes and
/// hyphens, and decodes `&amp;`, `&lt;` and `&gt;`.
pub fn remove_misc_noise_chars(text: &str) -> String {
    let mut result = text.to_string();
    for (pattern, replacement) in MISC_SUBSTITUTIONS.iter() {
        if pattern.is_match(&result) {
            result = pattern.replace_all(&result, *replacement).into_owned();
        }
    }
    result
}

/// Removes `#tag` tokens entirely, marker and text.
pub fn remove_hashtags(text: &str) -> String {
    HASHTAG_PATTERN.replace_all(text, "").into_owned()
}

/// Replaces numbers in every space-separated token that does not start with `#`.
///
/// In the default pipeline this runs after [`remove_hashtags`], so the hashtag
/// exception only matters when the rule is used on its own.
pub fn remove_numbers(text: &str, replacement: &str) -> String {
    text.split(' ')
        .map(|word| {
            if word.starts_with('#') {
                Cow::Borrowed(word)
            } else {
                NUMBER_PATTERN.replace_all(word, NoExpand(replacement))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strips emoji and pictographs: first the fixed code point denylist, then
/// whatever `oracle` still recognizes as emoji.
pub fn remove_emoticons(text: &str, oracle: &dyn EmojiOracle) -> String {
    let stripped = emoji::strip_emoji_ranges(text);
    emoji::strip_with_oracle(&stripped, oracle)
}

/// Runs each purely alphabetic token through `oracle`. Other tokens are kept
/// as they are. Tokens are rejoined with single spaces.
pub fn correct_spelling(text: &str, oracle: &dyn SpellingOracle) -> Result<String, OracleError> {
    let mut corrected = Vec::new();
    for token in text.split_whitespace() {
        if token.chars().all(char::is_alphabetic) {
            match oracle.correct(token)? {
                Some(replacement) => corrected.push(Cow::Owned(replacement)),
                None => corrected.push(Cow::Borrowed(token)),
            }
        } else {
            corrected.push(Cow::Borrowed(token));
        }
    }
    Ok(corrected.join(" "))
}
