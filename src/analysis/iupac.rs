//! IUPAC ambiguity codes and primer pattern translation

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

use super::error::{Result, SsrError};

/// Standard DNA bases
pub const STANDARD_BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

// Bitmask representation: bit 0 = A, bit 1 = C, bit 2 = G, bit 3 = T

/// Lookup table: 4-bit bitmask index -> IUPAC code byte.
/// Index 0 (no bases) maps to b'?' and should not occur with valid DNA data.
pub const IUPAC_FROM_MASK: [u8; 16] = [
    b'?', // 0b0000 - no bases (invalid)
    b'A', // 0b0001
    b'C', // 0b0010
    b'M', // 0b0011 - A|C
    b'G', // 0b0100
    b'R', // 0b0101 - A|G
    b'S', // 0b0110 - C|G
    b'V', // 0b0111 - A|C|G
    b'T', // 0b1000
    b'W', // 0b1001 - A|T
    b'Y', // 0b1010 - C|T
    b'H', // 0b1011 - A|C|T
    b'K', // 0b1100 - G|T
    b'D', // 0b1101 - A|G|T
    b'B', // 0b1110 - C|G|T
    b'N', // 0b1111 - A|C|G|T
];

/// Bases each multi-base code stands for, in A, C, G, T order.
/// Used to teach the approximate matcher which text bytes a code accepts.
pub static AMBIGUITY_EQUIVALENTS: Lazy<HashMap<u8, Vec<u8>>> = Lazy::new(|| {
    IUPAC_FROM_MASK
        .iter()
        .enumerate()
        .filter(|(mask, _)| (*mask as u8).count_ones() > 1)
        .map(|(mask, &code)| (code, mask_to_bases(mask as u8)))
        .collect()
});

/// Convert an IUPAC code byte to a bitmask of the bases it represents.
/// `X` is accepted as a synonym of `N`. Returns 0 for unrecognized bytes.
#[inline]
pub fn iupac_to_mask(b: u8) -> u8 {
    match b.to_ascii_uppercase() {
        b'A' => 0b0001,
        b'C' => 0b0010,
        b'G' => 0b0100,
        b'T' => 0b1000,
        b'R' => 0b0101,
        b'Y' => 0b1010,
        b'S' => 0b0110,
        b'W' => 0b1001,
        b'K' => 0b1100,
        b'M' => 0b0011,
        b'B' => 0b1110,
        b'D' => 0b1101,
        b'H' => 0b1011,
        b'V' => 0b0111,
        b'N' | b'X' => 0b1111,
        _ => 0,
    }
}

/// Bases in a mask, in A, C, G, T order
pub fn mask_to_bases(mask: u8) -> Vec<u8> {
    STANDARD_BASES
        .iter()
        .enumerate()
        .filter(|(bit, _)| mask & (1 << bit) != 0)
        .map(|(_, &base)| base)
        .collect()
}

/// Complement of a mask: A<->T, C<->G on every set bit
#[inline]
fn complement_mask(mask: u8) -> u8 {
    ((mask & 0b0001) << 3) | ((mask & 0b0010) << 1) | ((mask & 0b0100) >> 1) | ((mask & 0b1000) >> 3)
}

/// Check if a byte is a standard DNA base
#[inline]
pub fn is_standard_base(b: u8) -> bool {
    matches!(b, b'A' | b'C' | b'G' | b'T')
}

/// A primer translated into one base class per position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimerPattern {
    masks: Vec<u8>,
}

impl PrimerPattern {
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Canonical IUPAC byte per position (`X` comes back as `N`)
    pub fn codes(&self) -> Vec<u8> {
        self.masks.iter().map(|&m| IUPAC_FROM_MASK[m as usize]).collect()
    }

    /// Reverse complement, ambiguity classes included
    pub fn reverse_complement(&self) -> Self {
        Self {
            masks: self.masks.iter().rev().map(|&m| complement_mask(m)).collect(),
        }
    }
}

impl fmt::Display for PrimerPattern {
    /// Literal bases as themselves, ambiguity codes as character classes
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &mask in &self.masks {
            if mask.count_ones() == 1 {
                write!(f, "{}", IUPAC_FROM_MASK[mask as usize] as char)?;
            } else {
                let bases = String::from_utf8_lossy(&mask_to_bases(mask)).into_owned();
                write!(f, "[{}]", bases)?;
            }
        }
        Ok(())
    }
}

/// Translate a primer into a pattern. Any character outside the IUPAC
/// nucleotide alphabet is a fatal error.
pub fn translate_primer(primer: &str) -> Result<PrimerPattern> {
    let masks = primer
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let mask = if c.is_ascii() { iupac_to_mask(c as u8) } else { 0 };
            if mask == 0 {
                Err(SsrError::UnknownNucleotideCode {
                    primer: primer.to_string(),
                    code: c,
                    position: i + 1,
                })
            } else {
                Ok(mask)
            }
        })
        .collect::<Result<Vec<u8>>>()?;
    Ok(PrimerPattern { masks })
}

/// Compute the reverse complement of a plain DNA sequence.
/// Characters other than A, C, G, T are kept as they are.
pub fn reverse_complement(seq: &str) -> String {
    seq.bytes()
        .rev()
        .map(|b| match b {
            b'A' => 'T',
            b'T' => 'A',
            b'C' => 'G',
            b'G' => 'C',
            other => other as char,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmask_roundtrip() {
        let codes = b"ACGTRYSWKMBDHVN";
        for &code in codes {
            let mask = iupac_to_mask(code);
            assert_eq!(
                IUPAC_FROM_MASK[mask as usize], code,
                "Roundtrip failed for '{}'", code as char
            );
        }
    }

    #[test]
    fn test_translate_two_base_codes() {
        let pattern = translate_primer("ACGTRYSWKM").unwrap();
        assert_eq!(pattern.to_string(), "ACGT[AG][CT][CG][AT][GT][AC]");
    }

    #[test]
    fn test_translate_three_and_four_base_codes() {
        let pattern = translate_primer("BDHVNX").unwrap();
        assert_eq!(pattern.to_string(), "[CGT][AGT][ACT][ACG][ACGT][ACGT]");
        assert_eq!(pattern.codes(), b"BDHVNN".to_vec());
    }

    #[test]
    fn test_translate_is_case_insensitive() {
        assert_eq!(translate_primer("acgtn").unwrap(), translate_primer("ACGTN").unwrap());
    }

    #[test]
    fn test_translate_rejects_unknown_code() {
        let err = translate_primer("ACGZT").unwrap_err();
        match err {
            SsrError::UnknownNucleotideCode { code, position, .. } => {
                assert_eq!(code, 'Z');
                assert_eq!(position, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(translate_primer("AC-GT").is_err());
    }

    #[test]
    fn test_pattern_reverse_complement() {
        let pattern = translate_primer("AACR").unwrap();
        assert_eq!(pattern.reverse_complement().codes(), b"YGTT".to_vec());
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement("ATGCGT"), "ACGCAT");
    }

    #[test]
    fn test_ambiguity_equivalents() {
        assert_eq!(AMBIGUITY_EQUIVALENTS[&b'R'], b"AG".to_vec());
        assert_eq!(AMBIGUITY_EQUIVALENTS[&b'N'], b"ACGT".to_vec());
        assert!(!AMBIGUITY_EQUIVALENTS.contains_key(&b'A'));
    }
}
