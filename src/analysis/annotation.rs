//! Per-chromosome interval index over annotation features

use bio::data_structures::interval_tree::ArrayBackedIntervalTree;
use std::collections::HashMap;
use std::ops::Range;

use super::types::{Feature, Locus};

/// Stabbing-query index over half-open intervals tagged with a feature id
pub trait IntervalIndex: Send + Sync {
    /// Ids of every stored interval overlapping `range`, in index order
    fn overlapping(&self, range: Range<usize>) -> Vec<usize>;
}

impl IntervalIndex for ArrayBackedIntervalTree<usize, usize> {
    fn overlapping(&self, range: Range<usize>) -> Vec<usize> {
        self.find(range).iter().map(|entry| *entry.data()).collect()
    }
}

/// Features of one chromosome and the tree indexing them
struct ChromFeatures {
    features: Vec<Feature>,
    tree: ArrayBackedIntervalTree<usize, usize>,
}

impl ChromFeatures {
    fn new(features: Vec<Feature>) -> Self {
        let mut tree = ArrayBackedIntervalTree::new();
        for (id, feature) in features.iter().enumerate() {
            tree.insert(feature.half_open(), id);
        }
        tree.index();
        Self { features, tree }
    }

    /// Among overlapping features pick the smallest span, then the lowest
    /// start, then the one loaded first.
    fn first_overlap(&self, range: Range<usize>) -> Option<&Feature> {
        self.tree
            .overlapping(range)
            .into_iter()
            .min_by_key(|&id| {
                let f = &self.features[id];
                (f.span(), f.start, id)
            })
            .map(|id| &self.features[id])
    }
}

/// Read-only annotation lookup, one interval tree per chromosome.
/// Safe to share across threads once built.
pub struct AnnotationIndex {
    chroms: HashMap<String, ChromFeatures>,
}

impl AnnotationIndex {
    /// Group features by chromosome and index each group.
    /// Features with `start > end` are ignored.
    pub fn build<I>(features: I) -> Self
    where
        I: IntoIterator<Item = (String, Feature)>,
    {
        let mut grouped: HashMap<String, Vec<Feature>> = HashMap::new();
        for (chrom, feature) in features {
            if feature.start > feature.end {
                continue;
            }
            grouped.entry(chrom).or_default().push(feature);
        }

        let chroms = grouped
            .into_iter()
            .map(|(chrom, features)| (chrom, ChromFeatures::new(features)))
            .collect();

        Self { chroms }
    }

    /// An index with no features; every query yields `None`
    pub fn empty() -> Self {
        Self {
            chroms: HashMap::new(),
        }
    }

    /// Best feature overlapping the inclusive range `[start, end]` on `chrom`
    pub fn query(&self, chrom: &str, start: usize, end: usize) -> Option<&Feature> {
        if start > end {
            return None;
        }
        self.chroms.get(chrom)?.first_overlap(start..end + 1)
    }

    /// Best feature overlapping a locus; loci without a chromosome yield `None`
    pub fn query_locus(&self, locus: &Locus) -> Option<&Feature> {
        let chrom = locus.chrom.as_deref()?;
        if locus.start > locus.end {
            return None;
        }
        self.chroms.get(chrom)?.first_overlap(locus.half_open())
    }

    pub fn chromosome_count(&self) -> usize {
        self.chroms.len()
    }

    pub fn feature_count(&self) -> usize {
        self.chroms.values().map(|c| c.features.len()).sum()
    }
}
