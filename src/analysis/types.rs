//! Data types for SSR marker discovery

use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::error::{Result, SsrError};

/// Longest repeat unit the scanner looks for
pub const MAX_UNIT_LENGTH: usize = 6;

/// A genomic position range, 1-indexed and inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locus {
    /// Chromosome (sequence record id). `None` until the orchestrator assigns it.
    pub chrom: Option<String>,
    pub start: usize,
    pub end: usize,
}

impl Locus {
    /// The locus as a half-open range `[start, end + 1)`
    pub fn half_open(&self) -> Range<usize> {
        self.start..self.end + 1
    }
}

/// A perfect tandem repeat found by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsrRecord {
    pub locus: Locus,
    pub motif: String,
    pub repeat_count: usize,
    pub raw_sequence: String,
}

impl SsrRecord {
    /// Same record placed on a chromosome
    pub fn on_chrom(mut self, chrom: &str) -> Self {
        self.locus.chrom = Some(chrom.to_string());
        self
    }

    pub fn chrom(&self) -> Option<&str> {
        self.locus.chrom.as_deref()
    }

    pub fn start(&self) -> usize {
        self.locus.start
    }

    pub fn end(&self) -> usize {
        self.locus.end
    }
}

/// One annotation feature. `start` and `end` are kept as written in the
/// annotation (1-indexed, inclusive); [`Feature::half_open`] is what the
/// interval index stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub start: usize,
    pub end: usize,
    pub strand: char,
    pub attributes: String,
}

impl Feature {
    pub fn half_open(&self) -> Range<usize> {
        self.start..self.end + 1
    }

    pub fn span(&self) -> usize {
        self.end - self.start
    }
}

/// Raw primer sequences, IUPAC ambiguity codes allowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimerPair {
    pub forward: String,
    pub reverse: String,
}

/// Primer pair returned by a designer, with the designer's metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimerDesign {
    pub pair: PrimerPair,
    pub product_size: usize,
    pub forward_tm: f64,
    pub reverse_tm: f64,
    pub forward_gc: f64,
    pub reverse_gc: f64,
}

/// Where a marker is in the discovery pipeline. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerStage {
    Discovered,
    Annotated,
    PrimerDesigned,
    Simulated,
    Retained,
    Discarded,
}

/// An SSR candidate together with everything the pipeline learned about it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub ssr: SsrRecord,
    pub annotation: Option<Feature>,
    pub primers: Option<PrimerDesign>,
    pub amplicon_sizes: Vec<usize>,
    pub stage: MarkerStage,
}

impl Marker {
    pub fn discovered(ssr: SsrRecord) -> Self {
        Self {
            ssr,
            annotation: None,
            primers: None,
            amplicon_sizes: Vec::new(),
            stage: MarkerStage::Discovered,
        }
    }

    pub fn with_annotation(self, annotation: Option<Feature>) -> Self {
        Self {
            annotation,
            stage: MarkerStage::Annotated,
            ..self
        }
    }

    pub fn with_primers(self, primers: Option<PrimerDesign>) -> Self {
        let stage = if primers.is_some() {
            MarkerStage::PrimerDesigned
        } else {
            self.stage
        };
        Self {
            primers,
            stage,
            ..self
        }
    }

    pub fn with_amplicons(self, amplicon_sizes: Vec<usize>) -> Self {
        Self {
            amplicon_sizes,
            stage: MarkerStage::Simulated,
            ..self
        }
    }

    pub fn primer_pair(&self) -> Option<&PrimerPair> {
        self.primers.as_ref().map(|design| &design.pair)
    }
}

/// Minimum repeat count per unit length. Zero disables that unit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinRepeats {
    pub mono: usize,
    pub di: usize,
    pub tri: usize,
    pub tetra: usize,
    pub penta: usize,
    pub hexa: usize,
}

impl Default for MinRepeats {
    fn default() -> Self {
        Self {
            mono: 12,
            di: 7,
            tri: 5,
            tetra: 4,
            penta: 4,
            hexa: 4,
        }
    }
}

impl MinRepeats {
    /// All unit lengths disabled
    pub fn none() -> Self {
        Self {
            mono: 0,
            di: 0,
            tri: 0,
            tetra: 0,
            penta: 0,
            hexa: 0,
        }
    }

    /// Threshold for a unit length in `1..=6`; 0 for anything else
    pub fn for_unit_length(&self, unit_length: usize) -> usize {
        match unit_length {
            1 => self.mono,
            2 => self.di,
            3 => self.tri,
            4 => self.tetra,
            5 => self.penta,
            6 => self.hexa,
            _ => 0,
        }
    }

    pub fn with_unit_length(mut self, unit_length: usize, threshold: usize) -> Self {
        match unit_length {
            1 => self.mono = threshold,
            2 => self.di = threshold,
            3 => self.tri = threshold,
            4 => self.tetra = threshold,
            5 => self.penta = threshold,
            6 => self.hexa = threshold,
            _ => {}
        }
        self
    }
}

/// How the reverse primer is oriented before it is searched in the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimerOrientation {
    /// Search the reverse primer exactly as given, on the same strand as the forward primer
    AsGiven,
    /// Reverse-complement the reverse primer before searching
    ReverseComplement,
}

impl Default for PrimerOrientation {
    fn default() -> Self {
        Self::AsGiven
    }
}

/// Thread count configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadCount {
    /// Use all available CPU cores
    Auto,
    /// Use a specific number of threads
    Fixed(usize),
}

impl Default for ThreadCount {
    fn default() -> Self {
        Self::Auto
    }
}

impl ThreadCount {
    /// Get the actual number of threads to use
    pub fn get_count(&self) -> usize {
        match self {
            Self::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            Self::Fixed(n) => (*n).max(1),
        }
    }
}

/// Parameters handed to a primer designer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimerParams {
    pub product_size_min: usize,
    pub product_size_max: usize,
    pub min_size: usize,
    pub opt_size: usize,
    pub max_size: usize,
    pub min_tm: f64,
    pub opt_tm: f64,
    pub max_tm: f64,
    pub min_gc: f64,
    pub max_gc: f64,
    pub max_poly_x: usize,
}

impl Default for PrimerParams {
    fn default() -> Self {
        Self {
            product_size_min: 100,
            product_size_max: 400,
            min_size: 18,
            opt_size: 19,
            max_size: 23,
            min_tm: 52.0,
            opt_tm: 55.0,
            max_tm: 60.0,
            min_gc: 40.0,
            max_gc: 70.0,
            max_poly_x: 4,
        }
    }
}

/// Genome-mode parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub min_repeats: MinRepeats,
    pub max_ssr_length: usize,
    pub flank_size: usize,
    pub max_epcr_cost: usize,
    pub max_epcr_product: usize,
    pub reverse_primer_orientation: PrimerOrientation,
    pub primer: PrimerParams,
    pub thread_count: ThreadCount,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            min_repeats: MinRepeats::default(),
            max_ssr_length: 80,
            flank_size: 100,
            max_epcr_cost: 3,
            max_epcr_product: 1500,
            reverse_primer_orientation: PrimerOrientation::AsGiven,
            primer: PrimerParams::default(),
            thread_count: ThreadCount::Auto,
        }
    }
}

impl PipelineParams {
    /// Reject settings that cannot produce a meaningful run
    pub fn validate(&self) -> Result<()> {
        if self.max_ssr_length == 0 {
            return Err(SsrError::InvalidParams("max_ssr_length must be positive".into()));
        }
        if self.max_epcr_product == 0 {
            return Err(SsrError::InvalidParams("max_epcr_product must be positive".into()));
        }
        let p = &self.primer;
        if p.min_size == 0 || p.min_size > p.max_size {
            return Err(SsrError::InvalidParams(format!(
                "primer size range {}..={} is empty",
                p.min_size, p.max_size
            )));
        }
        if p.product_size_min > p.product_size_max {
            return Err(SsrError::InvalidParams(format!(
                "product size range {}..={} is empty",
                p.product_size_min, p.product_size_max
            )));
        }
        Ok(())
    }
}

/// Genotyping parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenotypeParams {
    pub min_mapq: u8,
    pub min_read_support: usize,
}

impl Default for GenotypeParams {
    fn default() -> Self {
        Self {
            min_mapq: 45,
            min_read_support: 3,
        }
    }
}

/// Progress update during a genome run
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub genome: String,
    pub chrom: String,
    pub chromosomes_done: usize,
    pub total_chromosomes: usize,
    pub message: String,
}
