//! Word-level similarity ratio.

use std::hash::Hash;

use super::matcher::{align, Alignment};

/// Similarity of two empty sequences: typing nothing for an empty verse is
/// a perfect answer.
pub const EMPTY_PAIR_SIMILARITY: f64 = 1.0;

/// Ratio `2 * M / T` where `M` is the number of matched tokens and `T` the
/// total token count of both sequences. Always within `[0.0, 1.0]`.
pub fn score<T: Eq + Hash>(reference: &[T], input: &[T]) -> f64 {
    ratio(&align(reference, input), reference.len(), input.len())
}

/// Ratio for an alignment that was already computed.
pub fn ratio(alignment: &Alignment, reference_len: usize, input_len: usize) -> f64 {
    let total = reference_len + input_len;
    if total == 0 {
        return EMPTY_PAIR_SIMILARITY;
    }
    2.0 * alignment.matched() as f64 / total as f64
}

/// Similarity as a percentage rounded to one decimal place.
pub fn to_percent(similarity: f64) -> f64 {
    (similarity * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_is_one() {
        for text in ["the quick brown fox", "a", "a a a b", "roses are red violets are blue"] {
            let a = words(text);
            assert_eq!(score(&a, &a), 1.0);
        }
    }

    #[test]
    fn test_disjoint_is_zero() {
        assert_eq!(score(&words("one two three"), &words("four five")), 0.0);
        assert_eq!(score(&words("Red"), &words("red")), 0.0);
    }

    #[test]
    fn test_empty_sequences() {
        let empty: Vec<&str> = vec![];
        assert_eq!(score(&empty, &empty), EMPTY_PAIR_SIMILARITY);
        assert_eq!(score(&words("roses"), &empty), 0.0);
        assert_eq!(score(&empty, &words("roses")), 0.0);
    }

    #[test]
    fn test_missing_last_word() {
        let s = score(&words("roses are red"), &words("roses are"));
        assert!(approx(s, 0.8));
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("t i d e", "d i e t"),
            ("roses are red", "roses are"),
            ("a b c d e", "e d c b a"),
            ("the cat sat on the mat", "on the mat the cat sat"),
            ("x y z x y", "y x z y x"),
        ];
        for (a, b) in pairs {
            let (a, b) = (words(a), words(b));
            assert!(approx(score(&a, &b), score(&b, &a)), "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn test_bounds() {
        let samples = [
            "",
            "a",
            "a b",
            "b a",
            "a a a",
            "the quick brown fox",
            "fox brown quick the",
            "the the the fox",
        ];
        for a in samples {
            for b in samples {
                let s = score(&words(a), &words(b));
                assert!((0.0..=1.0).contains(&s), "{} vs {} gave {}", a, b, s);
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let a = words("shall i compare thee to a summers day");
        let b = words("shall i compare you to a summer day");
        assert_eq!(score(&a, &b), score(&a, &b));
    }

    #[test]
    fn test_to_percent() {
        assert_eq!(to_percent(0.8), 80.0);
        assert_eq!(to_percent(2.0 / 3.0), 66.7);
        assert_eq!(to_percent(1.0), 100.0);
        assert_eq!(to_percent(0.0), 0.0);
    }
}
