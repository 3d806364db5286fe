//! In-silico PCR: primer binding sites and implied product sizes

use super::error::Result;
use super::iupac::translate_primer;
use super::matcher::{ApproximateMatcher, MyersMatcher};
use super::types::{PrimerOrientation, PrimerPair};

/// Candidate amplicon sizes for a primer pair on `target`.
///
/// Both primers are searched on the same strand of `target`, the reverse
/// primer exactly as given. See [`simulate_oriented`] to reverse-complement it.
pub fn simulate(
    target: &[u8],
    primers: &PrimerPair,
    max_cost: usize,
    max_product: usize,
) -> Result<Vec<usize>> {
    simulate_oriented(target, primers, max_cost, max_product, PrimerOrientation::AsGiven)
}

/// [`simulate`] with an explicit orientation for the reverse primer.
///
/// Fails if either primer holds a character outside the IUPAC alphabet.
pub fn simulate_oriented(
    target: &[u8],
    primers: &PrimerPair,
    max_cost: usize,
    max_product: usize,
    orientation: PrimerOrientation,
) -> Result<Vec<usize>> {
    let forward = translate_primer(&primers.forward)?;
    let mut reverse = translate_primer(&primers.reverse)?;
    if orientation == PrimerOrientation::ReverseComplement {
        reverse = reverse.reverse_complement();
    }
    if forward.is_empty() || reverse.is_empty() {
        return Ok(Vec::new());
    }

    Ok(simulate_with(
        target,
        &MyersMatcher::new(&forward),
        &MyersMatcher::new(&reverse),
        max_cost,
        max_product,
    ))
}

/// Pair every forward binding site with every reverse binding site
/// downstream of it: size is the distance between the two starts plus the
/// reverse primer's length. Sizes are emitted in forward-then-reverse site
/// order, duplicates kept.
pub fn simulate_with<F, R>(
    target: &[u8],
    forward: &F,
    reverse: &R,
    max_cost: usize,
    max_product: usize,
) -> Vec<usize>
where
    F: ApproximateMatcher + ?Sized,
    R: ApproximateMatcher + ?Sized,
{
    let forward_sites = forward.match_starts(target, max_cost);
    let reverse_sites = reverse.match_starts(target, max_cost);
    let reverse_len = reverse.pattern_len();

    let mut sizes = Vec::new();
    for &f in &forward_sites {
        for &r in reverse_sites.iter().filter(|&&r| r > f) {
            let size = r - f + reverse_len;
            if size <= max_product {
                sizes.push(size);
            }
        }
    }
    sizes
}
