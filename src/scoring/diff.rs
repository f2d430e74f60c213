//! Word diff between a verse and what the user typed.

use serde::{Deserialize, Serialize};
use std::hash::Hash;

use super::matcher::{align, Alignment, MatchBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    /// Typed as in the verse
    Matched,
    /// In the verse, not typed
    Missing,
    /// Typed, not in the verse
    Extra,
}

impl TokenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Missing => "missing",
            Self::Extra => "extra",
        }
    }

    /// CSS class used by the feedback templates
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Matched => "diff-ok",
            Self::Missing => "diff-missing",
            Self::Extra => "diff-extra",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffToken {
    pub token: String,
    pub status: TokenStatus,
}

impl DiffToken {
    fn new(token: &str, status: TokenStatus) -> Self {
        Self {
            token: token.to_string(),
            status,
        }
    }
}

/// Diff two token sequences using the shared alignment.
pub fn diff<T: AsRef<str> + Eq + Hash>(reference: &[T], input: &[T]) -> Vec<DiffToken> {
    render(reference, input, &align(reference, input))
}

/// Classify tokens against an existing alignment.
///
/// At each gap between matched blocks the missing reference tokens come
/// first, then the extra input tokens, then the next matched block.
pub fn render<T: AsRef<str>>(
    reference: &[T],
    input: &[T],
    alignment: &Alignment,
) -> Vec<DiffToken> {
    let mut tokens = Vec::with_capacity(reference.len().max(input.len()));
    let mut ref_pos = 0;
    let mut input_pos = 0;

    let tail = MatchBlock {
        reference_start: reference.len(),
        input_start: input.len(),
        len: 0,
    };

    for block in alignment.blocks.iter().chain(std::iter::once(&tail)) {
        tokens.extend(
            reference[ref_pos..block.reference_start]
                .iter()
                .map(|t| DiffToken::new(t.as_ref(), TokenStatus::Missing)),
        );
        tokens.extend(
            input[input_pos..block.input_start]
                .iter()
                .map(|t| DiffToken::new(t.as_ref(), TokenStatus::Extra)),
        );
        tokens.extend(
            reference[block.reference_start..block.reference_start + block.len]
                .iter()
                .map(|t| DiffToken::new(t.as_ref(), TokenStatus::Matched)),
        );
        ref_pos = block.reference_start + block.len;
        input_pos = block.input_start + block.len;
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    fn tokens_with(diff: &[DiffToken], keep: &[TokenStatus]) -> Vec<String> {
        diff.iter()
            .filter(|t| keep.contains(&t.status))
            .map(|t| t.token.clone())
            .collect()
    }

    #[test]
    fn test_all_matched() {
        let a = words("the quick brown fox");
        let result = diff(&a, &a);
        assert_eq!(result.len(), 4);
        assert!(result.iter().all(|t| t.status == TokenStatus::Matched));
    }

    #[test]
    fn test_missing_tail() {
        let result = diff(&words("roses are red"), &words("roses are"));
        assert_eq!(
            result,
            vec![
                DiffToken::new("roses", TokenStatus::Matched),
                DiffToken::new("are", TokenStatus::Matched),
                DiffToken::new("red", TokenStatus::Missing),
            ]
        );
    }

    #[test]
    fn test_gap_lists_missing_before_extra() {
        let result = diff(&words("roses are red"), &words("roses were red"));
        assert_eq!(
            result,
            vec![
                DiffToken::new("roses", TokenStatus::Matched),
                DiffToken::new("are", TokenStatus::Missing),
                DiffToken::new("were", TokenStatus::Extra),
                DiffToken::new("red", TokenStatus::Matched),
            ]
        );
    }

    #[test]
    fn test_only_extra() {
        let empty: Vec<&str> = vec![];
        let result = diff(&empty, &words("hello there"));
        assert_eq!(tokens_with(&result, &[TokenStatus::Extra]), vec!["hello", "there"]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_reconstructs_both_sides() {
        let pairs = [
            ("roses are red violets are blue", "roses are blue violets red"),
            ("t i d e", "d i e t"),
            ("the cat sat on the mat", "a cat sat on a mat today"),
            ("one", ""),
            ("", "one two"),
        ];
        for (r, i) in pairs {
            let (r, i) = (words(r), words(i));
            let result = diff(&r, &i);
            assert_eq!(
                tokens_with(&result, &[TokenStatus::Matched, TokenStatus::Missing]),
                r,
                "reference side of {:?} / {:?}",
                r,
                i
            );
            assert_eq!(
                tokens_with(&result, &[TokenStatus::Matched, TokenStatus::Extra]),
                i,
                "input side of {:?} / {:?}",
                r,
                i
            );
        }
    }

    #[test]
    fn test_matched_count_agrees_with_score() {
        let r = words("t i d e");
        let i = words("d i e t");
        let result = diff(&r, &i);
        let matched = result.iter().filter(|t| t.status == TokenStatus::Matched).count();
        let expected = super::super::similarity::score(&r, &i) * (r.len() + i.len()) as f64 / 2.0;
        assert_eq!(matched as f64, expected);
    }

    #[test]
    fn test_idempotent() {
        let r = words("shall i compare thee");
        let i = words("shall we compare thee");
        assert_eq!(diff(&r, &i), diff(&r, &i));
    }
}
