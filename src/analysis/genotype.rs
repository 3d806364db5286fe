//! Repeat-length genotyping from aligned reads
//!
//! Reading alignment files is left to an [`AlignmentReader`]; this module
//! only counts repeat units in the reads it is given and calls alleles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::{Result, SsrError};
use super::types::{GenotypeParams, SsrRecord};

/// The parts of an aligned read genotyping needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRead {
    pub mapping_quality: u8,
    pub sequence: String,
}

/// Source of reads overlapping a region
pub trait AlignmentReader {
    /// Reads overlapping the 0-based half-open region `[start, end)` of `chrom`
    fn fetch(&self, chrom: &str, start: usize, end: usize) -> Result<Vec<AlignedRead>>;
}

/// Called alleles (repeat counts), most supported first, with their read support
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genotype {
    pub alleles: Vec<usize>,
    pub support: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenotypeCall {
    /// Repeat count -> number of reads showing it
    pub allele_counts: BTreeMap<usize, usize>,
    /// `None` when fewer reads than the minimum support carry the repeat
    pub genotype: Option<Genotype>,
}

/// Copies of `motif` in the first run of it found in `read` (case-insensitive)
pub fn count_repeat_units(read: &str, motif: &str) -> usize {
    if motif.is_empty() {
        return 0;
    }
    let read = read.to_ascii_uppercase();
    let motif = motif.to_ascii_uppercase();

    let Some(first) = read.find(&motif) else {
        return 0;
    };
    let mut count = 0;
    let mut rest = &read[first..];
    while let Some(tail) = rest.strip_prefix(motif.as_str()) {
        count += 1;
        rest = tail;
    }
    count
}

/// Genotype one SSR from the reads covering it.
///
/// Fails if the SSR has no chromosome. Reads below the mapping-quality cutoff are ignored, as are reads that do
/// not contain the motif at all. At most two alleles are called; ties in
/// support keep the allele seen first.
pub fn genotype_marker<R: AlignmentReader + ?Sized>(
    reader: &R,
    ssr: &SsrRecord,
    params: &GenotypeParams,
) -> Result<GenotypeCall> {
    let chrom = ssr.chrom().ok_or_else(|| SsrError::UnplacedLocus {
        start: ssr.start(),
        end: ssr.end(),
        motif: ssr.motif.clone(),
    })?;
    let reads = reader.fetch(chrom, ssr.start().saturating_sub(1), ssr.end() + 1)?;

    // first-seen order, for tie-breaking
    let mut tally: Vec<(usize, usize)> = Vec::new();
    for read in reads.iter().filter(|r| r.mapping_quality >= params.min_mapq) {
        let units = count_repeat_units(&read.sequence, &ssr.motif);
        if units == 0 {
            continue;
        }
        match tally.iter_mut().find(|(allele, _)| *allele == units) {
            Some((_, n)) => *n += 1,
            None => tally.push((units, 1)),
        }
    }

    let allele_counts: BTreeMap<usize, usize> = tally.iter().copied().collect();
    let total: usize = tally.iter().map(|(_, n)| n).sum();
    if total < params.min_read_support {
        return Ok(GenotypeCall {
            allele_counts,
            genotype: None,
        });
    }

    // stable sort keeps first-seen order among equal counts
    tally.sort_by(|a, b| b.1.cmp(&a.1));
    let top: Vec<(usize, usize)> = tally.into_iter().take(2).collect();

    Ok(GenotypeCall {
        allele_counts,
        genotype: Some(Genotype {
            alleles: top.iter().map(|(allele, _)| *allele).collect(),
            support: top.iter().map(|(_, n)| *n).collect(),
        }),
    })
}
