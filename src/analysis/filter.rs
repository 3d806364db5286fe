//! Keep only size-polymorphic markers

use std::collections::HashSet;

use super::types::{Marker, MarkerStage};

/// Whether a set of amplicon sizes shows at least two distinct values
pub fn is_polymorphic(amplicon_sizes: &[usize]) -> bool {
    let distinct: HashSet<usize> = amplicon_sizes.iter().copied().collect();
    distinct.len() >= 2
}

/// Final stage of a marker: `Retained` if its amplicon sizes vary,
/// `Discarded` otherwise
pub fn classify_marker(marker: Marker) -> Marker {
    let stage = if is_polymorphic(&marker.amplicon_sizes) {
        MarkerStage::Retained
    } else {
        MarkerStage::Discarded
    };
    Marker { stage, ..marker }
}

/// Markers whose amplicon sizes vary, in input order, marked `Retained`.
/// Discarded markers are dropped.
pub fn filter_markers(markers: Vec<Marker>) -> Vec<Marker> {
    markers
        .into_iter()
        .map(classify_marker)
        .filter(|marker| marker.stage == MarkerStage::Retained)
        .collect()
}
