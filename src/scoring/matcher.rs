//! Ratcliff/Obershelp matching blocks over token sequences.
//!
//! Finds the longest common contiguous run of tokens, then repeats on the
//! unmatched regions to its left and right. The resulting blocks drive both
//! the similarity ratio and the word diff, so the two always agree.

use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// A run of `len` identical tokens at `reference[reference_start..]` and
/// `input[input_start..]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchBlock {
    pub reference_start: usize,
    pub input_start: usize,
    pub len: usize,
}

impl MatchBlock {
    fn swapped(self) -> Self {
        Self {
            reference_start: self.input_start,
            input_start: self.reference_start,
            len: self.len,
        }
    }
}

/// Word alignment between a reference and an input sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment {
    /// Non-overlapping blocks, ascending in both sequences
    pub blocks: Vec<MatchBlock>,
}

impl Alignment {
    /// Total number of tokens covered by matched blocks
    pub fn matched(&self) -> usize {
        self.blocks.iter().map(|b| b.len).sum()
    }
}

/// Align two token sequences.
///
/// The greedy longest-match recursion depends on which sequence drives the
/// search (`t i d e` against `d i e t` matches one token one way and two the
/// other), so both orientations are computed and the one covering more tokens
/// wins. Ties keep the reference-driven alignment.
pub fn align<T: Eq + Hash>(reference: &[T], input: &[T]) -> Alignment {
    let forward = matching_blocks(reference, input);
    let backward = matching_blocks(input, reference);

    let forward_len: usize = forward.iter().map(|b| b.len).sum();
    let backward_len: usize = backward.iter().map(|b| b.len).sum();

    let blocks = if backward_len > forward_len {
        let mut blocks: Vec<MatchBlock> = backward.into_iter().map(MatchBlock::swapped).collect();
        blocks.sort_by_key(|b| (b.reference_start, b.input_start));
        blocks
    } else {
        forward
    };

    Alignment { blocks }
}

/// Matching blocks with `a` driving the longest-match search.
///
/// Blocks come back sorted, with adjacent blocks merged.
pub fn matching_blocks<T: Eq + Hash>(a: &[T], b: &[T]) -> Vec<MatchBlock> {
    let mut b_positions: HashMap<&T, Vec<usize>> = HashMap::new();
    for (j, token) in b.iter().enumerate() {
        b_positions.entry(token).or_default().push(j);
    }

    let mut pending = vec![(0, a.len(), 0, b.len())];
    let mut found = Vec::new();

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let block = longest_match(a, &b_positions, a_lo, a_hi, b_lo, b_hi);
        if block.len == 0 {
            continue;
        }

        if a_lo < block.reference_start && b_lo < block.input_start {
            pending.push((a_lo, block.reference_start, b_lo, block.input_start));
        }
        let a_end = block.reference_start + block.len;
        let b_end = block.input_start + block.len;
        if a_end < a_hi && b_end < b_hi {
            pending.push((a_end, a_hi, b_end, b_hi));
        }

        found.push(block);
    }

    found.sort_by_key(|b| (b.reference_start, b.input_start));
    merge_adjacent(found)
}

/// Longest run of equal tokens inside `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
///
/// Among equally long runs the one starting earliest in `a` wins, then the one
/// starting earliest in `b`.
fn longest_match<T: Eq + Hash>(
    a: &[T],
    b_positions: &HashMap<&T, Vec<usize>>,
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> MatchBlock {
    let mut best = MatchBlock {
        reference_start: a_lo,
        input_start: b_lo,
        len: 0,
    };

    // run_ending_at[j] = length of the run ending at a[i - 1] and b[j]
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

    for (i, token) in a.iter().enumerate().take(a_hi).skip(a_lo) {
        let mut next: HashMap<usize, usize> = HashMap::new();

        if let Some(positions) = b_positions.get(token) {
            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }

                let previous = if j > 0 {
                    run_ending_at.get(&(j - 1)).copied().unwrap_or(0)
                } else {
                    0
                };
                let k = previous + 1;
                next.insert(j, k);

                if k > best.len {
                    best = MatchBlock {
                        reference_start: i + 1 - k,
                        input_start: j + 1 - k,
                        len: k,
                    };
                }
            }
        }

        run_ending_at = next;
    }

    best
}

fn merge_adjacent(blocks: Vec<MatchBlock>) -> Vec<MatchBlock> {
    let mut merged: Vec<MatchBlock> = Vec::with_capacity(blocks.len());
    for block in blocks {
        match merged.last_mut() {
            Some(last)
                if last.reference_start + last.len == block.reference_start
                    && last.input_start + last.len == block.input_start =>
            {
                last.len += block.len;
            }
            _ => merged.push(block),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    #[test]
    fn test_identical_sequences_form_one_block() {
        let a = words("the quick brown fox");
        let blocks = matching_blocks(&a, &a);
        assert_eq!(
            blocks,
            vec![MatchBlock {
                reference_start: 0,
                input_start: 0,
                len: 4
            }]
        );
    }

    #[test]
    fn test_recurses_on_both_sides() {
        let a = words("a x b c y d");
        let b = words("a b c d");
        let blocks = matching_blocks(&a, &b);
        // Longest is "b c", then "a" on the left and "d" on the right
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], MatchBlock { reference_start: 0, input_start: 0, len: 1 });
        assert_eq!(blocks[1], MatchBlock { reference_start: 2, input_start: 1, len: 2 });
        assert_eq!(blocks[2], MatchBlock { reference_start: 5, input_start: 3, len: 1 });
    }

    #[test]
    fn test_prefers_earliest_on_ties() {
        let a = words("x y");
        let b = words("y x");
        let blocks = matching_blocks(&a, &b);
        assert_eq!(blocks, vec![MatchBlock { reference_start: 0, input_start: 1, len: 1 }]);
    }

    #[test]
    fn test_empty_sequences_have_no_blocks() {
        let empty: Vec<&str> = vec![];
        let a = words("one two");
        assert!(matching_blocks(&empty, &a).is_empty());
        assert!(matching_blocks(&a, &empty).is_empty());
        assert!(matching_blocks(&empty, &empty).is_empty());
    }

    #[test]
    fn test_align_picks_better_orientation() {
        let tide = words("t i d e");
        let diet = words("d i e t");
        assert_eq!(matching_blocks(&tide, &diet).iter().map(|b| b.len).sum::<usize>(), 1);
        assert_eq!(matching_blocks(&diet, &tide).iter().map(|b| b.len).sum::<usize>(), 2);

        let alignment = align(&tide, &diet);
        assert_eq!(alignment.matched(), 2);
        // Blocks are expressed in (reference, input) coordinates
        for block in &alignment.blocks {
            for k in 0..block.len {
                assert_eq!(tide[block.reference_start + k], diet[block.input_start + k]);
            }
        }
    }
}
