//! Text normalization applied before verses are tokenized.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Alef Wasla, folded to a plain Alef
const ALEF_WASLA: char = '\u{0671}';
const ALEF: char = '\u{0627}';

/// Harakat and related marks (fathatan through hamza below)
const ARABIC_MARKS: std::ops::RangeInclusive<char> = '\u{064B}'..='\u{0655}';

/// How verse text is folded before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Replace Alef Wasla with Alef and drop diacritics
    pub fold_arabic: bool,
    /// Compare words case-insensitively
    pub ignore_case: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            fold_arabic: true,
            ignore_case: false,
        }
    }
}

/// Fold Arabic spelling variants that readers treat as the same word.
///
/// Text is decomposed first so precomposed letters such as Alef with Hamza
/// Above lose their mark the same way the two-code-point spelling does. The
/// result is recomposed to NFC.
pub fn fold_arabic(text: &str) -> String {
    text.nfd()
        .filter(|c| !ARABIC_MARKS.contains(c))
        .map(|c| if c == ALEF_WASLA { ALEF } else { c })
        .nfc()
        .collect()
}

/// Normalize text for display: optional Arabic folding, NFC, single spaces.
pub fn normalize(text: &str, options: &CompareOptions) -> String {
    let text = text.trim();
    let composed: String = if options.fold_arabic {
        fold_arabic(text)
    } else {
        text.nfc().collect()
    };
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split normalized text into display tokens.
pub fn tokenize(text: &str, options: &CompareOptions) -> Vec<String> {
    normalize(text, options)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Comparison key for a display token.
pub fn token_key(token: &str, options: &CompareOptions) -> String {
    if options.ignore_case {
        token.to_lowercase()
    } else {
        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_is_collapsed() {
        let options = CompareOptions::default();
        assert_eq!(normalize("  roses   are\tred \n", &options), "roses are red");
        assert_eq!(tokenize("roses   are red", &options), vec!["roses", "are", "red"]);
        assert!(tokenize("   ", &options).is_empty());
    }

    #[test]
    fn test_case_is_kept_by_default() {
        let options = CompareOptions::default();
        assert_eq!(token_key("Roses", &options), "Roses");

        let folding = CompareOptions {
            ignore_case: true,
            ..CompareOptions::default()
        };
        assert_eq!(token_key("Roses", &folding), "roses");
    }

    #[test]
    fn test_arabic_folding() {
        // Diacritics removed
        assert_eq!(fold_arabic("بِسْمِ"), "بسم");
        // Alef Wasla becomes Alef
        assert_eq!(fold_arabic("\u{0671}لله"), "\u{0627}لله");
        // Latin text untouched
        assert_eq!(fold_arabic("Roses are red."), "Roses are red.");
    }

    #[test]
    fn test_precomposed_hamza_folds_like_decomposed() {
        // U+0623 and U+0627 U+0654 both fold to a bare Alef
        assert_eq!(fold_arabic("\u{0623}حمد"), "\u{0627}حمد");
        assert_eq!(fold_arabic("\u{0627}\u{0654}حمد"), "\u{0627}حمد");
        // Alef with Madda decomposes to Alef plus a stripped mark
        assert_eq!(fold_arabic("\u{0622}"), "\u{0627}");
        // Latin accents survive the round trip
        assert_eq!(fold_arabic("cafe\u{0301}"), "caf\u{00e9}");
    }

    #[test]
    fn test_arabic_folding_can_be_disabled() {
        let options = CompareOptions {
            fold_arabic: false,
            ignore_case: false,
        };
        assert_eq!(normalize("بِسْمِ", &options), "بِسْمِ");
    }

    #[test]
    fn test_nfc_composition() {
        let options = CompareOptions::default();
        // "e" + combining acute composes to a single code point
        assert_eq!(normalize("cafe\u{0301}", &options), "caf\u{00e9}");
    }
}
