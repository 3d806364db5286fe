//! Approximate primer matching using rust-bio
//!
//! A match is any substring of the text within `max_cost` edits
//! (substitutions, insertions, deletions) of the primer pattern, where each
//! pattern position accepts the bases of its ambiguity class.

use bio::pattern_matching::myers::long;
use bio::pattern_matching::myers::{Myers, MyersBuilder};

use super::iupac::{is_standard_base, PrimerPattern, AMBIGUITY_EQUIVALENTS};

/// Longest pattern that fits a single 64-bit Myers block
const SINGLE_BLOCK_LENGTH: usize = 64;

/// Finds where a compiled primer pattern binds in a text
pub trait ApproximateMatcher {
    /// Every distinct offset, ascending, at which some match within
    /// `max_cost` edits begins. Equivalent to repeatedly asking for the
    /// leftmost match starting at or after `last_start + 1`.
    fn match_starts(&self, text: &[u8], max_cost: usize) -> Vec<usize>;

    /// Length of the pattern in bases
    fn pattern_len(&self) -> usize;
}

enum Engine {
    Single(Myers<u64>),
    /// Block-based variant for patterns longer than one machine word
    Blocks(long::Myers<u64>),
}

/// Bit-parallel edit distance matcher built from a [`PrimerPattern`] of
/// any length.
///
/// Myers reports match end positions, so the pattern is compiled reversed
/// and run over the reversed text: each reported end is a start in the
/// forward text.
pub struct MyersMatcher {
    reversed: Engine,
    len: usize,
}

impl MyersMatcher {
    pub fn new(pattern: &PrimerPattern) -> Self {
        let mut builder = MyersBuilder::new();
        for (&code, bases) in AMBIGUITY_EQUIVALENTS.iter() {
            builder.ambig(code, bases);
        }
        let mut reversed_codes = pattern.codes();
        reversed_codes.reverse();

        let reversed = if reversed_codes.len() <= SINGLE_BLOCK_LENGTH {
            Engine::Single(builder.build_64(reversed_codes))
        } else {
            Engine::Blocks(builder.build_long_64(reversed_codes))
        };
        Self {
            reversed,
            len: pattern.len(),
        }
    }
}

impl ApproximateMatcher for MyersMatcher {
    fn match_starts(&self, text: &[u8], max_cost: usize) -> Vec<usize> {
        if text.is_empty() || self.len == 0 {
            return Vec::new();
        }
        let last = text.len() - 1;
        let symbols = text.iter().rev().map(|&b| text_symbol(b));

        let ends: Vec<usize> = match &self.reversed {
            Engine::Single(myers) => {
                // a single block never needs more than 64 edits
                let max_dist = u8::try_from(max_cost).unwrap_or(u8::MAX);
                myers.find_all_end(symbols, max_dist).map(|(end, _)| end).collect()
            }
            Engine::Blocks(myers) => myers.find_all_end(symbols, max_cost).map(|(end, _)| end).collect(),
        };
        // reversed-text ends ascend, so forward starts come out descending
        ends.into_iter().rev().map(|end| last - end).collect()
    }

    fn pattern_len(&self) -> usize {
        self.len
    }
}

/// Only the four bases can satisfy a pattern position; anything else in the
/// text (`N`, ambiguity letters, lowercase) becomes a byte no pattern holds.
#[inline]
fn text_symbol(b: u8) -> u8 {
    if is_standard_base(b) {
        b
    } else {
        b'?'
    }
}
