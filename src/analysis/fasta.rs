//! FASTA parsing for genome sequences, streamed record by record with rust-bio

use bio::io::fasta;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use super::error::{Result, SsrError};

/// One sequence record (contig or chromosome)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// First whitespace-delimited token of the header
    pub id: String,
    /// Uppercased sequence
    pub sequence: String,
}

impl From<fasta::Record> for SequenceRecord {
    fn from(record: fasta::Record) -> Self {
        let sequence = record
            .seq()
            .iter()
            .filter(|b| !b.is_ascii_whitespace())
            .map(|b| b.to_ascii_uppercase() as char)
            .collect();
        Self {
            id: record.id().to_string(),
            sequence,
        }
    }
}

/// Read a FASTA file. Open and parse failures both carry the path.
pub fn read_fasta(path: &Path) -> Result<Vec<SequenceRecord>> {
    let file = File::open(path).map_err(|e| SsrError::io(path, e))?;
    parse_fasta(BufReader::new(file)).map_err(|e| SsrError::io(path, e))
}

/// Parse FASTA records from a reader. Sequence lines are concatenated in
/// order and uppercased. Input must start with a `>` header.
pub fn parse_fasta<R: BufRead>(reader: R) -> io::Result<Vec<SequenceRecord>> {
    fasta::Reader::from_bufread(reader)
        .records()
        .map(|record| record.map(SequenceRecord::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn parse(text: &str) -> Vec<SequenceRecord> {
        parse_fasta(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_records() {
        let records = parse(">chr1 assembled chromosome\nACGTac\ngtNN\n>chr2\nTTTT\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "chr1");
        assert_eq!(records[0].sequence, "ACGTACGTNN");
        assert_eq!(records[1].id, "chr2");
        assert_eq!(records[1].sequence, "TTTT");
    }

    #[test]
    fn test_windows_line_endings_and_blank_lines() {
        let records = parse(">ctg1\r\nACGT\r\n\r\nGG\r\n");
        assert_eq!(records[0].sequence, "ACGTGG");
    }

    #[test]
    fn test_text_before_first_header_is_rejected() {
        assert!(parse_fasta("ACGT\n>ctg1\nGG\n".as_bytes()).is_err());
    }

    #[test]
    fn test_empty_record_is_kept() {
        let records = parse(">empty\n>full\nAC\n");
        assert_eq!(records.len(), 2);
        assert!(records[0].sequence.is_empty());
        assert_eq!(records[1].sequence, "AC");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_read_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), ">chr1\nacgt\nAC\n").unwrap();
        let records = read_fasta(file.path()).unwrap();
        assert_eq!(records, vec![SequenceRecord { id: "chr1".into(), sequence: "ACGTAC".into() }]);
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "no header\n").unwrap();
        match read_fasta(file.path()).unwrap_err() {
            SsrError::Io { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = read_fasta(Path::new("/nonexistent/genome.fa")).unwrap_err();
        assert!(matches!(err, SsrError::Io { .. }));
    }
}
