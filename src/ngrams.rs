//! N-gram frequency over cleaned text.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;

use crate::error::{CleanError, Result};

lazy_static! {
    // Two or more word characters
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\b\w\w+\b").unwrap();

    static ref STOP_WORDS: HashSet<&'static str> = {
        let words = [
            "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
            "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
            "amongst", "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone",
            "anything", "anyway", "anywhere", "are", "around", "as", "at", "back", "be", "became",
            "because", "become", "becomes", "becoming", "been", "before", "beforehand", "behind",
            "being", "below", "beside", "besides", "between", "beyond", "bill", "both", "bottom",
            "but", "by", "call", "can", "cannot", "cant", "co", "con", "could", "couldnt", "cry",
            "de", "describe", "detail", "do", "done", "down", "due", "during", "each", "eg",
            "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc", "even",
            "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen",
            "fifty", "fill", "find", "fire", "first", "five", "for", "former", "formerly", "forty",
            "found", "four", "from", "front", "full", "further", "get", "give", "go", "had", "has",
            "hasnt", "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein",
            "hereupon", "hers", "herself", "him", "himself", "his", "how", "however", "hundred",
            "i", "ie", "if", "in", "inc", "indeed", "interest", "into", "is", "it", "its", "itself",
            "keep", "last", "latter", "latterly", "least", "less", "ltd", "made", "many", "may",
            "me", "meanwhile", "might", "mill", "mine", "more", "moreover", "most", "mostly",
            "move", "much", "must", "my", "myself", "name", "namely", "neither", "never",
            "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
            "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
            "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
            "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem",
            "seemed", "seeming", "seems", "serious", "several", "she", "should", "show", "side",
            "since", "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something",
            "sometime", "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than",
            "that", "the", "their", "them", "themselves", "then", "thence", "there", "thereafter",
            "thereby", "therefore", "therein", "thereupon", "these", "they", "thick", "thin",
            "third", "this", "those", "though", "three", "through", "throughout", "thru", "thus",
            "to", "together", "too", "top", "toward", "towards", "twelve", "twenty", "two", "un",
            "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were",
            "what", "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
            "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while", "whither",
            "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without",
            "would", "yet", "you", "your", "yours", "yourself", "yourselves",
        ];
        words.into_iter().collect()
    };
}

/// Whether `word` is on the English stop word list. Expects lowercase input.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

fn count_text(text: &str, n: usize, remove_stopwords: bool, counts: &mut HashMap<String, usize>) {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = TOKEN_PATTERN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !remove_stopwords || !is_stop_word(t))
        .collect();

    for window in tokens.windows(n) {
        *counts.entry(window.join(" ")).or_insert(0) += 1;
    }
}

/// The `limit` most frequent word n-grams across `texts`, most frequent first.
/// Equal counts are ordered by term. Stop words are dropped before n-grams are
/// formed, so they never bridge two kept words.
pub fn top_ngrams<S>(
    texts: &[S],
    n: usize,
    limit: usize,
    remove_stopwords: bool,
) -> Result<Vec<(String, usize)>>
where
    S: AsRef<str> + Sync,
{
    if n == 0 {
        return Err(CleanError::Configuration("n-gram size must be at least 1".to_string()));
    }

    let counts = texts
        .par_iter()
        .fold(HashMap::new, |mut counts, text| {
            count_text(text.as_ref(), n, remove_stopwords, &mut counts);
            counts
        })
        .reduce(HashMap::new, |mut total, partial| {
            for (term, count) in partial {
                *total.entry(term).or_insert(0) += count;
            }
            total
        });

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unigrams_ranked() {
        let texts = ["Happy happy day", "a sad day", "happy"];
        let top = top_ngrams(&texts, 1, 2, false).unwrap();
        assert_eq!(top, vec![("happy".to_string(), 3), ("day".to_string(), 2)]);
    }

    #[test]
    fn test_single_char_tokens_ignored() {
        let top = top_ngrams(&["a b cc"], 1, 10, false).unwrap();
        assert_eq!(top, vec![("cc".to_string(), 1)]);
    }

    #[test]
    fn test_bigrams_with_stop_words_removed() {
        let texts = ["the pills are working", "pills working again"];
        let top = top_ngrams(&texts, 2, 10, true).unwrap();
        // "are" and "again" are stop words
        assert_eq!(top, vec![("pills working".to_string(), 2)]);
    }

    #[test]
    fn test_ties_sorted_by_term() {
        let top = top_ngrams(&["zeta alpha mid"], 1, 3, false).unwrap();
        let terms: Vec<&str> = top.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(terms, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_zero_n_rejected() {
        assert!(matches!(
            top_ngrams(&["text"], 0, 5, false),
            Err(CleanError::Configuration(_))
        ));
    }
}
