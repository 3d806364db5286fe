//! GFF/GTF annotation parsing

use std::fs;
use std::path::Path;

use super::error::{Result, SsrError};
use super::types::Feature;

/// Features parsed from an annotation, with the number of lines skipped
#[derive(Debug, Clone, Default)]
pub struct AnnotationRecords {
    pub features: Vec<(String, Feature)>,
    pub skipped_lines: usize,
}

/// Read and parse a GFF/GTF file
pub fn read_annotation(path: &Path) -> Result<AnnotationRecords> {
    let text = fs::read_to_string(path).map_err(|e| SsrError::io(path, e))?;
    Ok(parse_annotation(&text))
}

/// Parse tab-separated 9-column annotation lines.
///
/// Comment and blank lines are ignored. Lines without exactly nine fields,
/// with non-numeric coordinates, or with `start > end` are skipped and counted.
pub fn parse_annotation(text: &str) -> AnnotationRecords {
    let mut records = AnnotationRecords::default();

    for line in text.lines() {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        match parse_line(line.trim_end_matches(['\r', '\n'])) {
            Some(record) => records.features.push(record),
            None => records.skipped_lines += 1,
        }
    }

    records
}

fn parse_line(line: &str) -> Option<(String, Feature)> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 9 {
        return None;
    }

    let start: usize = fields[3].trim().parse().ok()?;
    let end: usize = fields[4].trim().parse().ok()?;
    if start > end {
        return None;
    }

    Some((
        fields[0].to_string(),
        Feature {
            feature_type: fields[2].to_string(),
            start,
            end,
            strand: fields[6].chars().next().unwrap_or('.'),
            attributes: fields[8].to_string(),
        },
    ))
}
