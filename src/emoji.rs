//! Emoji and pictograph stripping.
//!
//! Two passes: a fixed code point denylist compiled into one regex, then an
//! [`EmojiOracle`] consulted per grapheme cluster for anything the ranges miss
//! (mostly BMP symbols such as `©` or `™` that have emoji presentations).

use lazy_static::lazy_static;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

// Inclusive code point ranges
const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x1F600, 0x1F64F), // emoticons
    (0x1F300, 0x1F5FF), // symbols & pictographs
    (0x1F680, 0x1F6FF), // transport & map symbols
    (0x1F1E0, 0x1F1FF), // flags
    (0x2500, 0x2BEF),
    (0x2702, 0x27B0),   // dingbats
    (0x24C2, 0x1F251),  // enclosed characters onwards; also swallows CJK
    (0x1F926, 0x1F937),
    (0x10000, 0x10FFFF),
    (0x2640, 0x2642),
    (0x2600, 0x2B55),
    (0x200D, 0x200D),   // zero width joiner
    (0x23CF, 0x23CF),
    (0x23E9, 0x23E9),
    (0x231A, 0x231A),
    (0x20E3, 0x20E3),   // combining keycap
    (0xFE0F, 0xFE0F),   // variation selector-16
    (0x3030, 0x3030),
];

lazy_static! {
    static ref EMOJI_PATTERN: Regex = {
        let class: String = EMOJI_RANGES
            .iter()
            .map(|(start, end)| format!(r"\x{{{:X}}}-\x{{{:X}}}", start, end))
            .collect();
        Regex::new(&format!("[{}]+", class)).unwrap()
    };
}

/// Decides whether a grapheme cluster is an emoji.
pub trait EmojiOracle: Send + Sync {
    fn is_emoji(&self, grapheme: &str) -> bool;
}

/// Oracle backed by the Unicode emoji data shipped with the `emojis` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeEmojiOracle;

impl EmojiOracle for UnicodeEmojiOracle {
    fn is_emoji(&self, grapheme: &str) -> bool {
        emojis::get(grapheme).is_some()
    }
}

/// Removes every character inside the denylisted ranges.
pub fn strip_emoji_ranges(text: &str) -> String {
    EMOJI_PATTERN.replace_all(text, "").into_owned()
}

/// Removes grapheme clusters the oracle recognizes. ASCII clusters are never
/// offered to the oracle, so `#`, `*` and digits survive.
pub fn strip_with_oracle(text: &str, oracle: &dyn EmojiOracle) -> String {
    text.graphemes(true)
        .filter(|g| g.is_ascii() || !oracle.is_emoji(g))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CopyrightOracle;

    impl EmojiOracle for CopyrightOracle {
        fn is_emoji(&self, grapheme: &str) -> bool {
            grapheme == "©"
        }
    }

    #[test]
    fn test_range_pass() {
        assert_eq!(strip_emoji_ranges("sun ☀️ rain"), "sun  rain");
        assert_eq!(strip_emoji_ranges("flag 🇧🇷!"), "flag !");
        assert_eq!(strip_emoji_ranges("café"), "café");
    }

    #[test]
    fn test_range_pass_is_broad() {
        // The denylist starts at U+24C2 and runs to the end of the BMP and beyond
        assert_eq!(strip_emoji_ranges("ok 你好"), "ok ");
    }

    #[test]
    fn test_oracle_pass_catches_leftovers() {
        let text = "© 2024 ok";
        assert_eq!(strip_emoji_ranges(text), text);
        assert_eq!(strip_with_oracle(text, &CopyrightOracle), " 2024 ok");
    }

    #[test]
    fn test_oracle_never_sees_ascii() {
        struct EverythingOracle;
        impl EmojiOracle for EverythingOracle {
            fn is_emoji(&self, _grapheme: &str) -> bool {
                true
            }
        }
        assert_eq!(strip_with_oracle("#1 *ok* é", &EverythingOracle), "#1 *ok* ");
    }

    #[test]
    fn test_unicode_oracle() {
        assert!(UnicodeEmojiOracle.is_emoji("😀"));
        assert!(!UnicodeEmojiOracle.is_emoji("a"));
    }

    #[test]
    fn test_unicode_oracle_catches_leftovers() {
        // U+00A9 is below every denylisted range
        assert_eq!(strip_emoji_ranges("a©b"), "a©b");
        assert_eq!(strip_with_oracle("a©b", &UnicodeEmojiOracle), "ab");
    }
}
