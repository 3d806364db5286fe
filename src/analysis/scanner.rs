//! Perfect tandem repeat detection
//!
//! For each unit length the sequence is scanned left to right. At every
//! offset the unit starting there is extended over as many identical copies
//! as follow it; when the copy count reaches the threshold for that unit
//! length the whole run is reported and scanning resumes right after it.
//! Unit lengths are scanned independently, so one stretch of sequence may be
//! reported under several unit lengths.

use super::types::{Locus, MinRepeats, SsrRecord, MAX_UNIT_LENGTH};

/// Scan `sequence` for tandem repeats of unit length 1 to 6.
///
/// Runs longer than `max_ssr_length` bases are dropped entirely. Output is
/// ordered by unit length, then by start position.
pub fn scan(sequence: &str, min_repeats: &MinRepeats, max_ssr_length: usize) -> Vec<SsrRecord> {
    let seq = sequence.to_ascii_uppercase().into_bytes();
    let mut records = Vec::new();

    for unit_length in 1..=MAX_UNIT_LENGTH {
        let threshold = min_repeats.for_unit_length(unit_length);
        if threshold == 0 {
            continue;
        }
        scan_unit_length(&seq, unit_length, threshold, max_ssr_length, &mut records);
    }

    records
}

fn scan_unit_length(
    seq: &[u8],
    unit_length: usize,
    threshold: usize,
    max_ssr_length: usize,
    records: &mut Vec<SsrRecord>,
) {
    let mut offset = 0;
    while offset + unit_length <= seq.len() {
        let run_end = run_end(seq, offset, unit_length);
        let length = run_end - offset;
        let repeat_count = length / unit_length;

        if repeat_count < threshold {
            offset += 1;
            continue;
        }

        if length <= max_ssr_length {
            records.push(SsrRecord {
                locus: Locus {
                    chrom: None,
                    start: offset + 1,
                    end: offset + length,
                },
                motif: String::from_utf8_lossy(&seq[offset..offset + unit_length]).into_owned(),
                repeat_count,
                raw_sequence: String::from_utf8_lossy(&seq[offset..run_end]).into_owned(),
            });
        }
        // an over-long run is still consumed, so no shorter piece of it is reported
        offset = run_end;
    }
}

/// End (exclusive) of the run of whole copies of the unit at `offset`
#[inline]
fn run_end(seq: &[u8], offset: usize, unit_length: usize) -> usize {
    let mut end = offset + unit_length;
    while end + unit_length <= seq.len()
        && seq[end..end + unit_length] == seq[offset..offset + unit_length]
    {
        end += unit_length;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(unit_length: usize, threshold: usize) -> MinRepeats {
        MinRepeats::none().with_unit_length(unit_length, threshold)
    }

    #[test]
    fn test_dinucleotide_run() {
        let seq = "AT".repeat(10);
        let records = scan(&seq, &only(2, 7), 80);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.motif, "AT");
        assert_eq!((r.start(), r.end()), (1, 20));
        assert_eq!(r.repeat_count, 10);
        assert_eq!(r.raw_sequence, seq);
        assert_eq!(r.chrom(), None);
    }

    #[test]
    fn test_mono_threshold_is_inclusive() {
        let seq = "A".repeat(12);
        let records = scan(&seq, &only(1, 12), 80);
        assert_eq!(records.len(), 1);
        assert_eq!((records[0].start(), records[0].end()), (1, 12));

        assert!(scan(&seq, &only(1, 13), 80).is_empty());
    }

    #[test]
    fn test_overlong_run_is_dropped_not_truncated() {
        let seq = format!("GC{}GC", "AG".repeat(50));
        let records = scan(&seq, &only(2, 7), 80);
        assert!(records.is_empty());

        // the same run is reported once the limit allows it
        let records = scan(&seq, &only(2, 7), 100);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].repeat_count, 50);
        assert_eq!(records[0].start(), 3);
    }

    #[test]
    fn test_lowercase_input_reports_uppercase_motif() {
        let records = scan("ccc", &only(1, 3), 80);
        assert_eq!(records[0].motif, "C");
        assert_eq!(records[0].raw_sequence, "CCC");
    }

    #[test]
    fn test_run_is_maximal_and_positioned() {
        // 3 flanking bases, then 6 CAG copies, then a partial copy
        let seq = format!("TTA{}CA", "CAG".repeat(6));
        let records = scan(&seq, &only(3, 5), 80);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].motif, "CAG");
        assert_eq!((records[0].start(), records[0].end()), (4, 21));
        assert_eq!(records[0].repeat_count, 6);
    }

    #[test]
    fn test_unit_lengths_are_not_merged() {
        // a mono run also satisfies the di threshold
        let seq = "A".repeat(14);
        let thresholds = only(1, 12).with_unit_length(2, 7);
        let records = scan(&seq, &thresholds, 80);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].motif, "A");
        assert_eq!(records[1].motif, "AA");
        assert_eq!(records[1].repeat_count, 7);
    }

    #[test]
    fn test_order_is_unit_length_then_position() {
        let seq = format!("{}GGG{}GGG{}", "TC".repeat(8), "A".repeat(12), "TC".repeat(8));
        let thresholds = only(1, 12).with_unit_length(2, 7);
        let records = scan(&seq, &thresholds, 80);
        let summary: Vec<(String, usize)> = records.iter().map(|r| (r.motif.clone(), r.start())).collect();
        assert_eq!(
            summary,
            vec![("A".to_string(), 20), ("TC".to_string(), 1), ("TC".to_string(), 35)]
        );
    }

    #[test]
    fn test_adjacent_runs_after_a_match() {
        // scanning resumes at the end of the first run
        let seq = format!("{}{}", "A".repeat(12), "C".repeat(12));
        let records = scan(&seq, &only(1, 12), 80);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].start(), 13);
    }

    #[test]
    fn test_scan_is_deterministic() {
        let seq = format!("{}ACGT{}TT{}", "AT".repeat(9), "GATA".repeat(5), "A".repeat(13));
        let first = scan(&seq, &MinRepeats::default(), 80);
        let second = scan(&seq, &MinRepeats::default(), 80);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_sequence() {
        assert!(scan("", &MinRepeats::default(), 80).is_empty());
        assert!(scan("ACG", &MinRepeats::default(), 80).is_empty());
    }
}
