use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use tracing::{info, warn};

use ssrscreen::{
    pair_genomes_with_annotations, run_pipeline, save_marker_table, FlankPrimerDesigner,
    PipelineParams, PrimerOrientation, ProgressUpdate, ThreadCount,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "ssrscreen", about = "Polymorphic SSR marker discovery")]
struct Cli {
    /// Log filter, e.g. "info" or "ssrscreen=debug".
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find polymorphic SSR markers across a set of annotated genomes.
    Genome {
        /// Directory of genome FASTA files (.fa, .fasta, .fna).
        #[arg(long)]
        genome_dir: PathBuf,
        /// Directory of annotation files (.gff, .gtf, .gff3), paired by file name.
        #[arg(long)]
        annot_dir: PathBuf,
        /// Marker table to write (tab-separated).
        #[arg(long)]
        output: PathBuf,
        /// JSON parameter file; missing keys keep their defaults.
        #[arg(long)]
        params: Option<PathBuf>,
        /// Worker threads (default: all cores).
        #[arg(long)]
        threads: Option<usize>,
        /// Maximum edit distance of a primer binding site.
        #[arg(long)]
        max_cost: Option<usize>,
        /// Maximum simulated product size.
        #[arg(long)]
        max_product: Option<usize>,
        /// Bases either side of an SSR handed to primer design.
        #[arg(long)]
        flank: Option<usize>,
        /// Search the reverse primer's reverse complement on the top strand.
        #[arg(long)]
        reverse_complement: bool,
    },
    /// Print the default parameters as JSON.
    Params,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Genome {
            genome_dir,
            annot_dir,
            output,
            params,
            threads,
            max_cost,
            max_product,
            flank,
            reverse_complement,
        } => {
            let mut params = load_params(params)?;
            if let Some(n) = threads {
                params.thread_count = ThreadCount::Fixed(n);
            }
            if let Some(cost) = max_cost {
                params.max_epcr_cost = cost;
            }
            if let Some(size) = max_product {
                params.max_epcr_product = size;
            }
            if let Some(flank) = flank {
                params.flank_size = flank;
            }
            if reverse_complement {
                params.reverse_primer_orientation = PrimerOrientation::ReverseComplement;
            }
            run_genome_mode(genome_dir, annot_dir, output, params)?
        }
        Commands::Params => {
            let json = serde_json::to_string_pretty(&PipelineParams::default())?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("invalid log level '{}'", level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

fn load_params(path: Option<PathBuf>) -> Result<PipelineParams> {
    let Some(path) = path else {
        return Ok(PipelineParams::default());
    };
    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read parameters from {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse parameters in {}", path.display()))
}

fn run_genome_mode(
    genome_dir: PathBuf,
    annot_dir: PathBuf,
    output: PathBuf,
    params: PipelineParams,
) -> Result<()> {
    let inputs = pair_genomes_with_annotations(&genome_dir, &annot_dir).with_context(|| {
        format!(
            "failed to pair genomes in {} with annotations in {}",
            genome_dir.display(),
            annot_dir.display()
        )
    })?;
    if inputs.is_empty() {
        warn!("No genome/annotation pairs found");
    }

    let (tx, rx) = mpsc::channel::<ProgressUpdate>();
    let reporter = thread::spawn(move || {
        for update in rx {
            info!("{}", update.message);
        }
    });

    let result = run_pipeline(&inputs, &params, &FlankPrimerDesigner, Some(&tx));
    drop(tx);
    join_reporter(reporter);
    let summary = result.context("genome mode failed")?;

    save_marker_table(&output, &summary.markers)
        .with_context(|| format!("failed to write markers to {}", output.display()))?;
    info!(
        "Wrote {} of {} markers to {}",
        summary.markers.len(),
        summary.total_markers,
        output.display()
    );

    Ok(())
}

/// Wait for the progress logger. Returns false, after logging it, if the
/// logger panicked.
fn join_reporter(reporter: JoinHandle<()>) -> bool {
    match reporter.join() {
        Ok(()) => true,
        Err(_) => {
            warn!("Progress reporter thread panicked; some progress messages were lost");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_reporter() {
        assert!(join_reporter(thread::spawn(|| {})));
        assert!(!join_reporter(thread::spawn(|| panic!("reporter failed"))));
    }

    #[test]
    fn test_cli_overrides_parse() {
        let cli = Cli::try_parse_from([
            "ssrscreen",
            "genome",
            "--genome-dir",
            "g",
            "--annot-dir",
            "a",
            "--output",
            "out.tsv",
            "--max-cost",
            "1",
            "--reverse-complement",
        ])
        .unwrap();
        match cli.command {
            Commands::Genome { max_cost, reverse_complement, threads, .. } => {
                assert_eq!(max_cost, Some(1));
                assert!(reverse_complement);
                assert_eq!(threads, None);
            }
            Commands::Params => panic!("expected genome command"),
        }
    }
}
