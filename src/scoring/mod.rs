//! Verse comparison: similarity ratio, word diff and letter grades.

pub mod diff;
pub mod grade;
pub mod matcher;
pub mod normalize;
pub mod similarity;

use serde::Serialize;

pub use diff::{diff, DiffToken, TokenStatus};
pub use grade::{grade, GradeError, LetterGrade};
pub use matcher::{align, Alignment, MatchBlock};
pub use normalize::{tokenize, CompareOptions};
pub use similarity::{score, to_percent, EMPTY_PAIR_SIMILARITY};

/// Outcome of comparing typed text with a verse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub similarity: f64,
    pub diff: Vec<DiffToken>,
}

/// Compare raw verse text with raw typed text.
///
/// Words are aligned on their comparison keys; the diff shows the tokens as
/// they were written.
pub fn compare(reference: &str, input: &str, options: &CompareOptions) -> Comparison {
    let reference_tokens = tokenize(reference, options);
    let input_tokens = tokenize(input, options);

    let reference_keys: Vec<String> = reference_tokens
        .iter()
        .map(|t| normalize::token_key(t, options))
        .collect();
    let input_keys: Vec<String> = input_tokens
        .iter()
        .map(|t| normalize::token_key(t, options))
        .collect();

    let alignment = align(&reference_keys, &input_keys);

    Comparison {
        similarity: similarity::ratio(&alignment, reference_keys.len(), input_keys.len()),
        diff: diff::render(&reference_tokens, &input_tokens, &alignment),
    }
}
