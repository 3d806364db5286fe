//! Primer design around an SSR
//!
//! Thermodynamic primer design is delegated to whatever implements
//! [`PrimerDesigner`]. [`FlankPrimerDesigner`] is a simple built-in binding
//! that screens flank k-mers by length, GC content, basic melting
//! temperature and homopolymer runs.

use super::iupac::reverse_complement;
use super::types::{PrimerDesign, PrimerPair, PrimerParams, SsrRecord};

/// Template handed to a primer designer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimerRequest {
    pub id: String,
    pub template: String,
    /// 0-based offset of the SSR inside `template`
    pub target_offset: usize,
    pub target_length: usize,
}

impl PrimerRequest {
    /// Cut `flank` bases either side of the SSR out of its chromosome,
    /// clamped at the chromosome ends.
    pub fn for_ssr(ssr: &SsrRecord, chromosome: &str, flank: usize) -> Self {
        let ssr_offset = ssr.start().saturating_sub(1);
        let window_start = ssr_offset.saturating_sub(flank);
        let window_end = (ssr.end() + flank).min(chromosome.len());
        let template = chromosome
            .get(window_start..window_end)
            .unwrap_or_default()
            .to_string();

        Self {
            id: format!("SSR_{}_{}", ssr.start(), ssr.end()),
            template,
            target_offset: ssr_offset - window_start,
            target_length: ssr.end() + 1 - ssr.start(),
        }
    }
}

/// External primer-design service. `None` means no acceptable pair was found.
pub trait PrimerDesigner: Send + Sync {
    fn design(&self, request: &PrimerRequest, params: &PrimerParams) -> Option<PrimerDesign>;
}

/// Melting temperature: Wallace rule below 14 bases, basic GC formula above
pub fn melting_temperature(seq: &[u8]) -> f64 {
    let len = seq.len() as f64;
    let gc = gc_count(seq) as f64;
    if seq.len() < 14 {
        2.0 * (len - gc) + 4.0 * gc
    } else {
        64.9 + 41.0 * (gc - 16.4) / len
    }
}

/// GC content in percent
pub fn gc_percent(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    gc_count(seq) as f64 / seq.len() as f64 * 100.0
}

fn gc_count(seq: &[u8]) -> usize {
    seq.iter().filter(|&&b| b == b'G' || b == b'C').count()
}

/// Length of the longest single-base run
pub fn longest_homopolymer(seq: &[u8]) -> usize {
    let mut longest = 0;
    let mut run = 0;
    let mut last = None;
    for &b in seq {
        if Some(b) == last {
            run += 1;
        } else {
            last = Some(b);
            run = 1;
        }
        longest = longest.max(run);
    }
    longest
}

/// A primer that passed screening, on the template's top strand
#[derive(Debug, Clone, Copy)]
struct Candidate {
    start: usize,
    len: usize,
    tm: f64,
    gc: f64,
    penalty: f64,
}

/// Built-in designer picking the lowest-penalty pair from the two flanks.
///
/// Penalty per primer is `|Tm - opt_tm| + |len - opt_size|`. Ties go to the
/// leftmost forward primer, then the leftmost reverse primer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlankPrimerDesigner;

impl FlankPrimerDesigner {
    fn screen(seq: &[u8], start: usize, params: &PrimerParams) -> Option<Candidate> {
        if !seq.iter().all(|&b| matches!(b, b'A' | b'C' | b'G' | b'T')) {
            return None;
        }
        let gc = gc_percent(seq);
        let tm = melting_temperature(seq);
        if gc < params.min_gc || gc > params.max_gc {
            return None;
        }
        if tm < params.min_tm || tm > params.max_tm {
            return None;
        }
        if longest_homopolymer(seq) > params.max_poly_x {
            return None;
        }
        let penalty = (tm - params.opt_tm).abs() + (seq.len() as f64 - params.opt_size as f64).abs();
        Some(Candidate {
            start,
            len: seq.len(),
            tm,
            gc,
            penalty,
        })
    }

    /// Best candidate per anchor position in `region` (forward primers are
    /// anchored on their start, reverse primers on their end)
    fn best_per_anchor(
        template: &[u8],
        region: std::ops::Range<usize>,
        params: &PrimerParams,
        anchor_on_end: bool,
    ) -> Vec<Candidate> {
        let mut best: Vec<Candidate> = Vec::new();
        for start in region.clone() {
            for len in params.min_size..=params.max_size {
                let end = start + len;
                if end > region.end {
                    break;
                }
                let Some(candidate) = Self::screen(&template[start..end], start, params) else {
                    continue;
                };
                let anchor = if anchor_on_end { end } else { start };
                match best.iter_mut().find(|c| {
                    let a = if anchor_on_end { c.start + c.len } else { c.start };
                    a == anchor
                }) {
                    Some(existing) if candidate.penalty < existing.penalty => *existing = candidate,
                    Some(_) => {}
                    None => best.push(candidate),
                }
            }
        }
        best
    }
}

impl PrimerDesigner for FlankPrimerDesigner {
    fn design(&self, request: &PrimerRequest, params: &PrimerParams) -> Option<PrimerDesign> {
        let template = request.template.as_bytes();
        let target_end = request.target_offset + request.target_length;
        if target_end > template.len() || params.min_size == 0 || params.min_size > params.max_size {
            return None;
        }

        let forwards = Self::best_per_anchor(template, 0..request.target_offset, params, false);
        let reverses = Self::best_per_anchor(template, target_end..template.len(), params, true);

        let mut chosen: Option<(Candidate, Candidate, f64)> = None;
        for f in &forwards {
            for r in &reverses {
                let product = r.start + r.len - f.start;
                if product < params.product_size_min || product > params.product_size_max {
                    continue;
                }
                let penalty = f.penalty + r.penalty;
                if chosen.map_or(true, |(_, _, best)| penalty < best) {
                    chosen = Some((*f, *r, penalty));
                }
            }
        }

        let (f, r, _) = chosen?;
        let forward = String::from_utf8_lossy(&template[f.start..f.start + f.len]).into_owned();
        let reverse_top = String::from_utf8_lossy(&template[r.start..r.start + r.len]).into_owned();

        Some(PrimerDesign {
            pair: PrimerPair {
                forward,
                reverse: reverse_complement(&reverse_top),
            },
            product_size: r.start + r.len - f.start,
            forward_tm: f.tm,
            reverse_tm: r.tm,
            forward_gc: f.gc,
            reverse_gc: r.gc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::Locus;

    const LEFT_FLANK: &str = "TGACCTGAAGGCTTCAGTCACGTTGCAAGCTGACCTGAGCATTCGATGCCAGTACTTGACGGATCTGCAAGTCCAGTGATCGTACCAGTTGAGCATGCA";
    const RIGHT_FLANK: &str = "GGATCCAGTTCAGCTTGCAGTCATCGGTACCTGACTTGAGCAAGTCGCATGGTTCAGCTGAACGTCAAGGCTTACGATCGGACTTGCATCAGGTACCTG";

    fn ssr_at(start: usize, motif: &str, count: usize) -> SsrRecord {
        SsrRecord {
            locus: Locus {
                chrom: Some("chr1".into()),
                start,
                end: start + motif.len() * count - 1,
            },
            motif: motif.to_string(),
            repeat_count: count,
            raw_sequence: motif.repeat(count),
        }
    }

    #[test]
    fn test_request_window() {
        let chromosome = format!("{}{}{}", "C".repeat(150), "AT".repeat(10), "G".repeat(150));
        let ssr = ssr_at(151, "AT", 10);
        let request = PrimerRequest::for_ssr(&ssr, &chromosome, 100);
        assert_eq!(request.id, "SSR_151_170");
        assert_eq!(request.template.len(), 220);
        assert_eq!(request.target_offset, 100);
        assert_eq!(request.target_length, 20);
        assert_eq!(&request.template[100..120], "AT".repeat(10));
    }

    #[test]
    fn test_request_window_clamped_at_chromosome_ends() {
        let chromosome = format!("{}{}{}", "C".repeat(30), "AT".repeat(10), "G".repeat(40));
        let ssr = ssr_at(31, "AT", 10);
        let request = PrimerRequest::for_ssr(&ssr, &chromosome, 100);
        assert_eq!(request.template, chromosome);
        assert_eq!(request.target_offset, 30);
        assert_eq!(&request.template[30..50], "AT".repeat(10));
    }

    #[test]
    fn test_melting_temperature() {
        // Wallace rule: 2 per A/T, 4 per G/C
        assert_eq!(melting_temperature(b"ACGT"), 12.0);
        let tm = melting_temperature(b"ACGTACGTACGTACGTACGT");
        assert!((tm - (64.9 + 41.0 * (10.0 - 16.4) / 20.0)).abs() < 1e-9);
    }

    #[test]
    fn test_sequence_metrics() {
        assert_eq!(gc_percent(b"GGCCAATT"), 50.0);
        assert_eq!(gc_percent(b""), 0.0);
        assert_eq!(longest_homopolymer(b"ACGGGGTA"), 4);
        assert_eq!(longest_homopolymer(b""), 0);
    }

    #[test]
    fn test_designs_pair_from_flanks() {
        let template = format!("{}{}{}", LEFT_FLANK, "AT".repeat(10), RIGHT_FLANK);
        let request = PrimerRequest {
            id: "SSR_101_120".into(),
            template,
            target_offset: LEFT_FLANK.len(),
            target_length: 20,
        };
        let params = PrimerParams::default();
        let design = FlankPrimerDesigner.design(&request, &params).expect("flanks hold primers");

        assert!(LEFT_FLANK.contains(&design.pair.forward));
        assert!(RIGHT_FLANK.contains(&reverse_complement(&design.pair.reverse)));
        assert!(design.product_size >= params.product_size_min);
        assert!(design.product_size <= params.product_size_max);
        for (primer, tm, gc) in [
            (&design.pair.forward, design.forward_tm, design.forward_gc),
            (&design.pair.reverse, design.reverse_tm, design.reverse_gc),
        ] {
            assert!(primer.len() >= params.min_size && primer.len() <= params.max_size);
            assert!(tm >= params.min_tm && tm <= params.max_tm);
            assert!(gc >= params.min_gc && gc <= params.max_gc);
            assert!(longest_homopolymer(primer.as_bytes()) <= params.max_poly_x);
        }
    }

    #[test]
    fn test_design_is_deterministic() {
        let template = format!("{}{}{}", LEFT_FLANK, "AT".repeat(10), RIGHT_FLANK);
        let request = PrimerRequest {
            id: "SSR".into(),
            template,
            target_offset: LEFT_FLANK.len(),
            target_length: 20,
        };
        let params = PrimerParams::default();
        assert_eq!(
            FlankPrimerDesigner.design(&request, &params),
            FlankPrimerDesigner.design(&request, &params)
        );
    }

    #[test]
    fn test_no_design_without_usable_flanks() {
        let template = format!("{}{}{}", "N".repeat(100), "AT".repeat(10), "N".repeat(100));
        let request = PrimerRequest {
            id: "SSR".into(),
            template,
            target_offset: 100,
            target_length: 20,
        };
        assert!(FlankPrimerDesigner.design(&request, &PrimerParams::default()).is_none());
    }
}
