//! Sequence-context helpers.
//!
//! The core never reads reference files itself. Anything that needs bases
//! beyond the record goes through a [`SequenceProvider`], implemented by the
//! FASTA accessors in `vartk-fasta`.
use std::sync::Arc;

use crate::errors::SequenceError;

/// IUPAC complement of every ASCII byte; unknown symbols become `N`.
const COMPLEMENT_ARRAY: [u8; 256] = {
    let mut arr = [b'N'; 256];
    let pairs: [(u8, u8); 16] = [
        (b'A', b'T'),
        (b'C', b'G'),
        (b'G', b'C'),
        (b'T', b'A'),
        (b'U', b'A'),
        (b'R', b'Y'),
        (b'Y', b'R'),
        (b'S', b'S'),
        (b'W', b'W'),
        (b'K', b'M'),
        (b'M', b'K'),
        (b'B', b'V'),
        (b'V', b'B'),
        (b'D', b'H'),
        (b'H', b'D'),
        (b'N', b'N'),
    ];
    let mut i = 0;
    while i < pairs.len() {
        let (base, comp) = pairs[i];
        arr[base as usize] = comp;
        arr[base.to_ascii_lowercase() as usize] = comp.to_ascii_lowercase();
        i += 1;
    }
    arr[b'-' as usize] = b'-';
    arr[b'.' as usize] = b'.';
    arr[b'*' as usize] = b'*';
    arr
};

///
/// Complement of one IUPAC nucleotide symbol, preserving case.
///
#[inline]
pub fn complement(base: u8) -> u8 {
    COMPLEMENT_ARRAY[base as usize]
}

///
/// Reverse complement of a nucleotide sequence over the IUPAC alphabet.
///
pub fn reverse_complement<T: AsRef<[u8]>>(bases: T) -> Vec<u8> {
    bases.as_ref().iter().rev().map(|b| complement(*b)).collect()
}

///
/// String form of [`reverse_complement`].
///
pub fn reverse_complement_str(bases: &str) -> String {
    String::from_utf8_lossy(&reverse_complement(bases)).into_owned()
}

///
/// Random access to reference bases.
///
/// Coordinates are 1-based and inclusive. Implementations are shared across
/// worker threads for read-only lookups.
///
pub trait SequenceProvider: Send + Sync {
    ///
    /// Bases of `contig` from `start` to `end`, both inclusive.
    ///
    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<Vec<u8>, SequenceError>;

    ///
    /// Length of `contig`, `None` if the provider does not know it.
    ///
    fn contig_length(&self, contig: &str) -> Option<u64>;
}

impl<P: SequenceProvider + ?Sized> SequenceProvider for &P {
    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<Vec<u8>, SequenceError> {
        (**self).fetch(contig, start, end)
    }

    fn contig_length(&self, contig: &str) -> Option<u64> {
        (**self).contig_length(contig)
    }
}

impl<P: SequenceProvider + ?Sized> SequenceProvider for Arc<P> {
    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<Vec<u8>, SequenceError> {
        (**self).fetch(contig, start, end)
    }

    fn contig_length(&self, contig: &str) -> Option<u64> {
        (**self).contig_length(contig)
    }
}

///
/// Validate a 1-based inclusive range against a contig length.
///
pub fn check_range(
    contig: &str,
    start: u64,
    end: u64,
    length: Option<u64>,
) -> Result<(), SequenceError> {
    let out_of_range = |reason: String| SequenceError::OutOfRange {
        contig: contig.to_string(),
        start,
        end,
        reason,
    };
    let length = length.ok_or_else(|| out_of_range("unknown contig".to_string()))?;
    if start == 0 {
        return Err(out_of_range("coordinates are 1-based".to_string()));
    }
    if start > end {
        return Err(out_of_range("start is past end".to_string()));
    }
    if end > length {
        return Err(out_of_range(format!("contig length is {}", length)));
    }
    Ok(())
}

const CONTEXT_WINDOW: u64 = 64;

/// Lazily fetched reference bases to the left of a variant.
struct LeftContext<'a, P: SequenceProvider + ?Sized> {
    provider: &'a P,
    contig: &'a str,
    start: u64,
    bases: Vec<u8>,
}

impl<'a, P: SequenceProvider + ?Sized> LeftContext<'a, P> {
    fn new(provider: &'a P, contig: &'a str) -> Self {
        LeftContext {
            provider,
            contig,
            start: 0,
            bases: Vec::new(),
        }
    }

    fn base(&mut self, at: u64) -> Result<u8, SequenceError> {
        let end = self.start + self.bases.len() as u64;
        if self.bases.is_empty() || at < self.start || at >= end {
            let start = at.saturating_sub(CONTEXT_WINDOW - 1).max(1);
            self.bases = self.provider.fetch(self.contig, start, at)?;
            self.start = start;
        }
        Ok(self.bases[(at - self.start) as usize].to_ascii_uppercase())
    }
}

///
/// Shift an indel to its left-most equivalent position.
///
/// Shared trailing bases are dropped and the reference base to the left is
/// prepended whenever one side runs empty, then redundant leading bases are
/// trimmed while one anchor base remains. Substitutions are returned
/// unchanged (upper-cased).
///
/// # Arguments
/// - provider: reference bases for `contig`
/// - position: 1-based position of the first reference base
///
/// # Returns
/// - the normalized `(position, reference, alternate)`
///
pub fn left_align<P: SequenceProvider + ?Sized>(
    provider: &P,
    contig: &str,
    position: u64,
    reference: &str,
    alternate: &str,
) -> Result<(u64, String, String), SequenceError> {
    let mut r = reference.to_ascii_uppercase().into_bytes();
    let mut a = alternate.to_ascii_uppercase().into_bytes();
    let mut pos = position;

    if r.len() != a.len() {
        let mut context = LeftContext::new(provider, contig);
        while !r.is_empty() && !a.is_empty() && r.last() == a.last() {
            if (r.len() == 1 || a.len() == 1) && pos == 1 {
                break;
            }
            r.pop();
            a.pop();
            if r.is_empty() || a.is_empty() {
                pos -= 1;
                let base = context.base(pos)?;
                r.insert(0, base);
                a.insert(0, base);
            }
        }
        while r.len() >= 2 && a.len() >= 2 && r[0] == a[0] {
            r.remove(0);
            a.remove(0);
            pos += 1;
        }
    }

    Ok((
        pos,
        String::from_utf8_lossy(&r).into_owned(),
        String::from_utf8_lossy(&a).into_owned(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use rstest::*;

    struct MapProvider {
        contigs: HashMap<String, Vec<u8>>,
        calls: AtomicUsize,
    }

    impl SequenceProvider for MapProvider {
        fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<Vec<u8>, SequenceError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            check_range(contig, start, end, self.contig_length(contig))?;
            Ok(self.contigs[contig][(start - 1) as usize..end as usize].to_vec())
        }

        fn contig_length(&self, contig: &str) -> Option<u64> {
            self.contigs.get(contig).map(|s| s.len() as u64)
        }
    }

    #[fixture]
    fn provider() -> MapProvider {
        // 1-based: T=1, A=2..5, G=6, C=7, A=8, G=9
        let mut contigs = HashMap::new();
        contigs.insert("chr1".to_string(), b"TAAAAGCAG".to_vec());
        MapProvider {
            contigs,
            calls: AtomicUsize::new(0),
        }
    }

    #[rstest]
    #[case("ACGTRYKMN", "NKMRYACGT")]
    #[case("acgtn", "nacgt")]
    #[case("SWBVDH", "DHBVWS")]
    #[case("A-C", "G-T")]
    #[case("AXG", "CNT")]
    fn test_reverse_complement(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(reverse_complement_str(input), expected);
    }

    #[rstest]
    fn test_reverse_complement_is_an_involution() {
        let seq = b"ACGTRYSWKMBDHVN";
        assert_eq!(reverse_complement(reverse_complement(seq)), seq.to_vec());
    }

    #[rstest]
    fn test_check_range() {
        assert!(check_range("chr1", 1, 9, Some(9)).is_ok());
        assert!(check_range("chr1", 0, 3, Some(9)).is_err());
        assert!(check_range("chr1", 5, 4, Some(9)).is_err());
        assert!(check_range("chr1", 5, 10, Some(9)).is_err());
        assert!(check_range("chrZ", 1, 1, None).is_err());
    }

    #[rstest]
    fn test_left_align_insertion_in_repeat(provider: MapProvider) {
        // inserting an A after the last A of the run moves to the base before it
        let aligned = left_align(&provider, "chr1", 5, "A", "AA").unwrap();
        assert_eq!(aligned, (1, "T".to_string(), "TA".to_string()));
    }

    #[rstest]
    fn test_left_align_deletion_in_repeat(provider: MapProvider) {
        let aligned = left_align(&provider, "chr1", 4, "AAG", "AG").unwrap();
        assert_eq!(aligned, (1, "TA".to_string(), "T".to_string()));
    }

    #[rstest]
    fn test_left_align_leaves_substitutions(provider: MapProvider) {
        let aligned = left_align(&provider, "chr1", 6, "g", "c").unwrap();
        assert_eq!(aligned, (6, "G".to_string(), "C".to_string()));
        assert_eq!(provider.calls.load(Ordering::Relaxed), 0);
    }

    #[rstest]
    fn test_left_align_already_normalized(provider: MapProvider) {
        let aligned = left_align(&provider, "chr1", 7, "CAG", "C").unwrap();
        assert_eq!(aligned, (7, "CAG".to_string(), "C".to_string()));
    }

    #[rstest]
    fn test_left_align_unknown_contig(provider: MapProvider) {
        let err = left_align(&provider, "chr9", 5, "A", "AA").unwrap_err();
        assert!(matches!(err, SequenceError::OutOfRange { .. }));
    }
}
