//! Marker table reading and writing

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use super::error::{Result, SsrError};
use super::types::{Locus, Marker, SsrRecord};

pub const MARKER_TABLE_HEADER: [&str; 8] = [
    "chrom",
    "start",
    "end",
    "motif",
    "repeat_count",
    "annotation",
    "primers",
    "amplicon_sizes",
];

/// Write markers as a tab-separated table with a header row.
///
/// `annotation` and `primers` are JSON objects, empty when absent;
/// `amplicon_sizes` is written as `[a, b, ...]`.
pub fn write_marker_table<W: Write>(mut writer: W, markers: &[Marker]) -> Result<()> {
    writeln!(writer, "{}", MARKER_TABLE_HEADER.join("\t"))?;
    for marker in markers {
        let annotation = marker
            .annotation
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(std::io::Error::from)?
            .unwrap_or_default();
        let primers = marker
            .primers
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(std::io::Error::from)?
            .unwrap_or_default();
        let sizes = marker
            .amplicon_sizes
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t[{}]",
            marker.ssr.chrom().unwrap_or(""),
            marker.ssr.start(),
            marker.ssr.end(),
            marker.ssr.motif,
            marker.ssr.repeat_count,
            annotation,
            primers,
            sizes
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the marker table to `path`, replacing any existing file
pub fn save_marker_table(path: &Path, markers: &[Marker]) -> Result<()> {
    let file = File::create(path).map_err(|e| SsrError::io(path, e))?;
    write_marker_table(BufWriter::new(file), markers)
}

/// Read the locus columns of a marker table back as SSR records.
/// The header row is skipped; blank lines are ignored.
pub fn read_marker_table<R: BufRead>(reader: R) -> Result<Vec<SsrRecord>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_row(&line, idx + 1)?);
    }
    Ok(records)
}

/// Open and read a marker table from `path`
pub fn load_marker_table(path: &Path) -> Result<Vec<SsrRecord>> {
    let file = File::open(path).map_err(|e| SsrError::io(path, e))?;
    read_marker_table(BufReader::new(file))
}

fn parse_row(line: &str, line_no: usize) -> Result<SsrRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 5 {
        return Err(SsrError::MarkerTable {
            line: line_no,
            reason: format!("expected at least 5 columns, found {}", fields.len()),
        });
    }
    let number = |name: &str, value: &str| -> Result<usize> {
        value.trim().parse().map_err(|_| SsrError::MarkerTable {
            line: line_no,
            reason: format!("{} is not a number: '{}'", name, value),
        })
    };

    let start = number("start", fields[1])?;
    let end = number("end", fields[2])?;
    let repeat_count = number("repeat_count", fields[4])?;
    let motif = fields[3].to_string();
    if start > end || motif.is_empty() {
        return Err(SsrError::MarkerTable {
            line: line_no,
            reason: "empty motif or start after end".to_string(),
        });
    }

    Ok(SsrRecord {
        locus: Locus {
            chrom: (!fields[0].is_empty()).then(|| fields[0].to_string()),
            start,
            end,
        },
        raw_sequence: motif.repeat(repeat_count),
        motif,
        repeat_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::{Feature, PrimerDesign, PrimerPair};

    fn marker() -> Marker {
        let ssr = SsrRecord {
            locus: Locus { chrom: Some("chr1".into()), start: 101, end: 120 },
            motif: "AT".into(),
            repeat_count: 10,
            raw_sequence: "AT".repeat(10),
        };
        Marker::discovered(ssr)
            .with_annotation(Some(Feature {
                feature_type: "gene".into(),
                start: 90,
                end: 150,
                strand: '+',
                attributes: "ID=g1".into(),
            }))
            .with_primers(Some(PrimerDesign {
                pair: PrimerPair { forward: "ACGT".into(), reverse: "TTGA".into() },
                product_size: 180,
                forward_tm: 55.0,
                reverse_tm: 56.5,
                forward_gc: 50.0,
                reverse_gc: 45.0,
            }))
            .with_amplicons(vec![180, 184])
    }

    #[test]
    fn test_write_table() {
        let mut buf = Vec::new();
        write_marker_table(&mut buf, &[marker()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "chrom\tstart\tend\tmotif\trepeat_count\tannotation\tprimers\tamplicon_sizes");
        let fields: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(fields.len(), 8);
        assert_eq!(&fields[..5], &["chr1", "101", "120", "AT", "10"]);
        assert!(fields[5].contains("\"type\":\"gene\""));
        assert!(fields[6].contains("\"forward\":\"ACGT\""));
        assert_eq!(fields[7], "[180, 184]");
    }

    #[test]
    fn test_absent_fields_are_empty() {
        let mut m = marker();
        m.annotation = None;
        m.primers = None;
        m.amplicon_sizes.clear();
        let mut buf = Vec::new();
        write_marker_table(&mut buf, &[m]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.ends_with("\t10\t\t\t[]"));
    }

    #[test]
    fn test_read_back_loci() {
        let mut buf = Vec::new();
        write_marker_table(&mut buf, &[marker()]).unwrap();
        let records = read_marker_table(buf.as_slice()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], marker().ssr);
    }

    #[test]
    fn test_malformed_row() {
        let table = "chrom\tstart\tend\tmotif\trepeat_count\nchr1\tten\t20\tAT\t5\n";
        match read_marker_table(table.as_bytes()).unwrap_err() {
            SsrError::MarkerTable { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
