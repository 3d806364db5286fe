//! Locating genome and annotation files on disk

use std::fs;
use std::path::{Path, PathBuf};

use super::error::{Result, SsrError};

pub const GENOME_EXTENSIONS: [&str; 3] = [".fa", ".fasta", ".fna"];
pub const ANNOTATION_EXTENSIONS: [&str; 3] = [".gff", ".gtf", ".gff3"];

/// A genome FASTA and the annotation that goes with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomeInput {
    pub genome: PathBuf,
    pub annotation: PathBuf,
}

/// Files directly inside `dir`, optionally restricted to the given
/// extensions (case-insensitive), sorted by path
pub fn list_files_in_dir(dir: &Path, extensions: Option<&[&str]>) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| SsrError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SsrError::io(dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        let name = file_name(&path).to_ascii_lowercase();
        let wanted = match extensions {
            Some(exts) => exts.iter().any(|ext| name.ends_with(&ext.to_ascii_lowercase())),
            None => true,
        };
        if wanted {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Pair each genome with the first annotation whose file name contains the
/// genome's file stem. Genomes without an annotation are reported and skipped.
pub fn pair_genomes_with_annotations(genome_dir: &Path, annot_dir: &Path) -> Result<Vec<GenomeInput>> {
    let genomes = list_files_in_dir(genome_dir, Some(&GENOME_EXTENSIONS[..]))?;
    let annotations = list_files_in_dir(annot_dir, Some(&ANNOTATION_EXTENSIONS[..]))?;

    let mut pairs = Vec::new();
    for genome in genomes {
        let stem = genome
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match annotations.iter().find(|a| file_name(a).contains(&stem)) {
            Some(annotation) => pairs.push(GenomeInput {
                genome,
                annotation: annotation.clone(),
            }),
            None => tracing::warn!("No annotation found for genome {}", genome.display()),
        }
    }
    Ok(pairs)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
