//! Genome-mode orchestration
//!
//! Scan -> annotate -> design primers -> simulate PCR, per chromosome, then
//! keep the polymorphic markers across every genome.

use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::time::Instant;
use tracing::{debug, info};

use super::amplicon::simulate_oriented;
use super::annotation::AnnotationIndex;
use super::error::Result;
use super::fasta::{read_fasta, SequenceRecord};
use super::filter::filter_markers;
use super::gff::read_annotation;
use super::inputs::GenomeInput;
use super::primer::{PrimerDesigner, PrimerRequest};
use super::scanner::scan;
use super::types::{Marker, PipelineParams, ProgressUpdate};

/// Result of a genome-mode run
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// Markers considered before filtering
    pub total_markers: usize,
    /// Polymorphic markers, in genome, chromosome and scan order
    pub markers: Vec<Marker>,
}

/// One genome held in memory: its sequence records and annotation index
pub struct LoadedGenome {
    pub name: String,
    pub records: Vec<SequenceRecord>,
    pub annotation: AnnotationIndex,
}

/// Read a genome FASTA and its annotation
pub fn load_genome(input: &GenomeInput) -> Result<LoadedGenome> {
    let records = read_fasta(&input.genome)?;
    let annotation = read_annotation(&input.annotation)?;
    if annotation.skipped_lines > 0 {
        debug!(
            "Skipped {} malformed annotation lines in {}",
            annotation.skipped_lines,
            input.annotation.display()
        );
    }
    let index = AnnotationIndex::build(annotation.features);
    info!(
        "Loaded {} sequences and {} features on {} chromosomes from {}",
        records.len(),
        index.feature_count(),
        index.chromosome_count(),
        input.genome.display()
    );

    Ok(LoadedGenome {
        name: input.genome.display().to_string(),
        records,
        annotation: index,
    })
}

/// Every SSR candidate on one chromosome, annotated, with primers and
/// simulated amplicon sizes where primer design succeeded
pub fn process_chromosome(
    record: &SequenceRecord,
    annotation: &AnnotationIndex,
    params: &PipelineParams,
    designer: &dyn PrimerDesigner,
) -> Result<Vec<Marker>> {
    let ssrs = scan(&record.sequence, &params.min_repeats, params.max_ssr_length);
    let target = record.sequence.as_bytes();

    let mut markers = Vec::with_capacity(ssrs.len());
    for ssr in ssrs {
        let ssr = ssr.on_chrom(&record.id);
        let feature = annotation.query_locus(&ssr.locus).cloned();
        let request = PrimerRequest::for_ssr(&ssr, &record.sequence, params.flank_size);
        let marker = Marker::discovered(ssr).with_annotation(feature);

        let design = designer.design(&request, &params.primer);
        if design.is_none() {
            debug!("Primer design failed for {} on {}", request.id, record.id);
        }
        let marker = marker.with_primers(design);

        let marker = match marker.primer_pair() {
            Some(pair) => {
                let sizes = simulate_oriented(
                    target,
                    pair,
                    params.max_epcr_cost,
                    params.max_epcr_product,
                    params.reverse_primer_orientation,
                )?;
                marker.with_amplicons(sizes)
            }
            None => marker,
        };
        markers.push(marker);
    }

    Ok(markers)
}

/// Process every chromosome of a genome in parallel.
/// Markers come back in chromosome order, then scan order.
pub fn run_genome(
    genome: &LoadedGenome,
    params: &PipelineParams,
    designer: &dyn PrimerDesigner,
    progress_tx: Option<&Sender<ProgressUpdate>>,
) -> Result<Vec<Marker>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.thread_count.get_count())
        .build()
        // Fallback to default pool if custom pool fails
        .or_else(|_| rayon::ThreadPoolBuilder::new().build())?;

    let total = genome.records.len();
    let completed = AtomicUsize::new(0);

    let per_chrom: Vec<Vec<Marker>> = pool.install(|| {
        genome
            .records
            .par_iter()
            .map(|record| {
                let markers = process_chromosome(record, &genome.annotation, params, designer)?;

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(tx) = progress_tx {
                    let _ = tx.send(ProgressUpdate {
                        genome: genome.name.clone(),
                        chrom: record.id.clone(),
                        chromosomes_done: done,
                        total_chromosomes: total,
                        message: format!(
                            "{}: chromosome {}/{} ({}) done, {} candidates",
                            genome.name,
                            done,
                            total,
                            record.id,
                            markers.len()
                        ),
                    });
                }
                Ok(markers)
            })
            .collect::<Result<Vec<_>>>()
    })?;

    Ok(per_chrom.into_iter().flatten().collect())
}

/// Run genome mode over every genome/annotation pair, one genome in memory
/// at a time, and keep the polymorphic markers
pub fn run_pipeline(
    inputs: &[GenomeInput],
    params: &PipelineParams,
    designer: &dyn PrimerDesigner,
    progress_tx: Option<&Sender<ProgressUpdate>>,
) -> Result<PipelineSummary> {
    params.validate()?;
    let started = Instant::now();
    let mut all_markers = Vec::new();

    for input in inputs {
        info!("Processing genome: {}", input.genome.display());
        let genome_started = Instant::now();

        let genome = load_genome(input)?;
        let markers = run_genome(&genome, params, designer, progress_tx)?;

        info!(
            "{}: {} SSR candidates in {:.3} s",
            genome.name,
            markers.len(),
            genome_started.elapsed().as_secs_f64()
        );
        all_markers.extend(markers);
    }

    let total_markers = all_markers.len();
    let markers = filter_markers(all_markers);
    info!(
        "Total markers detected: {}; Filtered markers: {} ({:.2} min)",
        total_markers,
        markers.len(),
        started.elapsed().as_secs_f64() / 60.0
    );

    Ok(PipelineSummary {
        total_markers,
        markers,
    })
}
