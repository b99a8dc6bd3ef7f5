//! Allele derivation.
//!
//! Every alternate of a [`Variant`] is trimmed against the reference into a
//! minimal representation under two positional conventions:
//!
//! - **native** (VCF): indels keep one shared anchor base, the common suffix
//!   is stripped before the common prefix.
//! - **Annovar**: the full common prefix is stripped first, then the full
//!   common suffix; deletions are reported with an observed allele of `-`
//!   and insertions sit on the last shared base.
//!
//! Bases are compared case-insensitively. Derivation is a pure function of
//! `(position, reference, alternate)`.
use std::fmt::{self, Display};

use crate::errors::{Result, VariantError};
use crate::variant::Variant;

/// Placeholder Annovar uses for an empty reference or alternate.
pub const ANNOVAR_GAP: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlleleType {
    Snp,
    Insertion,
    Deletion,
    Complex,
}

impl Display for AlleleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlleleType::Snp => write!(f, "SNP"),
            AlleleType::Insertion => write!(f, "INS"),
            AlleleType::Deletion => write!(f, "DEL"),
            AlleleType::Complex => write!(f, "COMPLEX"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    Native,
    Annovar,
}

///
/// An allele rendered in the Annovar convention.
///
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnovarAllele {
    pub start: u64,
    pub end: u64,
    pub reference: String,
    pub observed: String,
}

///
/// One alternate of a variant, trimmed to its minimal representation.
///
/// `start`/`end` are 1-based inclusive positions in the native convention.
/// For SNPs and complex substitutions `deleted`/`inserted` hold the replaced
/// and replacing bases; for indels one of them is empty.
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Allele {
    /// 1-based index into the variant's alternates
    pub index: usize,
    pub kind: AlleleType,
    pub start: u64,
    pub end: u64,
    pub inserted: String,
    pub deleted: String,
    /// The alternate spells the reference exactly
    pub degenerate: bool,
    /// Annovar rendering of the full reference/alternate pair
    pub annovar: AnnovarAllele,
    /// Annovar rendering of the minimal anchored record, which differs from
    /// `annovar` when the allele sits in a repeat shared by other alternates
    pub anchored_annovar: AnnovarAllele,
}

impl Allele {
    ///
    /// Derive an allele from one reference/alternate pair.
    ///
    /// # Arguments
    /// - index: 1-based alternate index
    /// - position: 1-based position of the first reference base
    /// - reference: reference bases
    /// - alternate: alternate bases
    ///
    pub fn derive(index: usize, position: u64, reference: &str, alternate: &str) -> Allele {
        let r = reference.to_ascii_uppercase();
        let a = alternate.to_ascii_uppercase();
        let annovar = annovar_trim(position, r.as_bytes(), a.as_bytes());

        if r == a {
            let kind = if r.len() == 1 {
                AlleleType::Snp
            } else {
                AlleleType::Complex
            };
            return Allele {
                index,
                kind,
                start: position,
                end: position + r.len().saturating_sub(1) as u64,
                inserted: String::new(),
                deleted: String::new(),
                degenerate: true,
                anchored_annovar: annovar.clone(),
                annovar,
            };
        }

        let trimmed = native_trim(position, r.as_bytes(), a.as_bytes());
        let mut allele = Allele {
            index,
            kind: trimmed.kind,
            start: trimmed.start,
            end: trimmed.end,
            inserted: trimmed.inserted,
            deleted: trimmed.deleted,
            degenerate: false,
            anchored_annovar: annovar.clone(),
            annovar,
        };
        let (p, minimal_ref, minimal_alt) = allele.native_record(position, &r, &a);
        allele.anchored_annovar = annovar_from_vcf(p, &minimal_ref, &minimal_alt);
        allele
    }

    ///
    /// Whether an Annovar-style `(start, observed)` pair describes this allele,
    /// either as rendered from the full record or from its minimal anchored form.
    ///
    pub fn equals_annovar(&self, start: u64, observed: &str) -> bool {
        if self.degenerate {
            return false;
        }
        (self.annovar.start == start && self.annovar.observed == observed)
            || (self.anchored_annovar.start == start && self.anchored_annovar.observed == observed)
    }

    ///
    /// Start and end of this allele under the requested convention.
    ///
    pub fn span(&self, convention: Convention) -> (u64, u64) {
        match convention {
            Convention::Native => (self.start, self.end),
            Convention::Annovar => (self.annovar.start, self.annovar.end),
        }
    }

    ///
    /// Native anchored representation `(position, ref, alt)`, as it would be
    /// written in a bi-allelic record.
    ///
    pub fn native_record(&self, variant_position: u64, reference: &str, alternate: &str) -> (u64, String, String) {
        if self.degenerate {
            return (variant_position, reference.to_string(), alternate.to_string());
        }
        match self.kind {
            AlleleType::Snp | AlleleType::Complex => {
                (self.start, self.deleted.clone(), self.inserted.clone())
            }
            AlleleType::Insertion => {
                let anchor = anchor_base(variant_position, reference, self.start);
                (self.start, anchor.to_string(), format!("{}{}", anchor, self.inserted))
            }
            AlleleType::Deletion => {
                let anchor_pos = self.start - 1;
                let anchor = anchor_base(variant_position, reference, anchor_pos);
                (anchor_pos, format!("{}{}", anchor, self.deleted), anchor.to_string())
            }
        }
    }
}

fn anchor_base(variant_position: u64, reference: &str, at: u64) -> char {
    let offset = (at - variant_position) as usize;
    reference
        .as_bytes()
        .get(offset)
        .map(|b| b.to_ascii_uppercase() as char)
        .unwrap_or('N')
}

struct NativeTrim {
    kind: AlleleType,
    start: u64,
    end: u64,
    inserted: String,
    deleted: String,
}

/// Length of the common prefix of `a` and `b`, leaving at least `keep` bases on each.
fn common_prefix(a: &[u8], b: &[u8], keep: usize) -> usize {
    let limit = a.len().min(b.len()).saturating_sub(keep);
    let mut trimmed = 0;
    while trimmed < limit && a[trimmed] == b[trimmed] {
        trimmed += 1;
    }
    trimmed
}

/// Length of the common suffix of `a` and `b`, leaving at least `keep` bases on each.
fn common_suffix(a: &[u8], b: &[u8], keep: usize) -> usize {
    let limit = a.len().min(b.len()).saturating_sub(keep);
    let mut trimmed = 0;
    while trimmed < limit && a[a.len() - 1 - trimmed] == b[b.len() - 1 - trimmed] {
        trimmed += 1;
    }
    trimmed
}

fn to_string(bases: &[u8]) -> String {
    String::from_utf8_lossy(bases).into_owned()
}

fn native_trim(position: u64, reference: &[u8], alternate: &[u8]) -> NativeTrim {
    let suffix = common_suffix(reference, alternate, 1);
    let r = &reference[..reference.len() - suffix];
    let a = &alternate[..alternate.len() - suffix];

    let prefix = common_prefix(r, a, 1);
    let r = &r[prefix..];
    let a = &a[prefix..];
    let p = position + prefix as u64;

    if r.len() == 1 && a.len() == 1 {
        NativeTrim {
            kind: AlleleType::Snp,
            start: p,
            end: p,
            inserted: to_string(a),
            deleted: to_string(r),
        }
    } else if r.first() == a.first() && r.len() == 1 {
        NativeTrim {
            kind: AlleleType::Insertion,
            start: p,
            end: p,
            inserted: to_string(&a[1..]),
            deleted: String::new(),
        }
    } else if r.first() == a.first() && a.len() == 1 {
        NativeTrim {
            kind: AlleleType::Deletion,
            start: p + 1,
            end: p + r.len() as u64 - 1,
            inserted: String::new(),
            deleted: to_string(&r[1..]),
        }
    } else {
        NativeTrim {
            kind: AlleleType::Complex,
            start: p,
            end: p + r.len().saturating_sub(1) as u64,
            inserted: to_string(a),
            deleted: to_string(r),
        }
    }
}

fn annovar_trim(position: u64, reference: &[u8], alternate: &[u8]) -> AnnovarAllele {
    let prefix = common_prefix(reference, alternate, 0);
    let r = &reference[prefix..];
    let a = &alternate[prefix..];
    let suffix = common_suffix(r, a, 0);
    let r = &r[..r.len() - suffix];
    let a = &a[..a.len() - suffix];
    let start = position + prefix as u64;

    match (r.is_empty(), a.is_empty()) {
        (true, false) => {
            // zero-width insertion sits on the last shared base
            let at = start.saturating_sub(1).max(1);
            AnnovarAllele {
                start: at,
                end: at,
                reference: ANNOVAR_GAP.to_string(),
                observed: to_string(a),
            }
        }
        (false, true) => AnnovarAllele {
            start,
            end: start + r.len() as u64 - 1,
            reference: to_string(r),
            observed: ANNOVAR_GAP.to_string(),
        },
        (false, false) => AnnovarAllele {
            start,
            end: start + r.len() as u64 - 1,
            reference: to_string(r),
            observed: to_string(a),
        },
        (true, true) => AnnovarAllele {
            start: position,
            end: position,
            reference: to_string(reference),
            observed: to_string(reference),
        },
    }
}

///
/// Render one VCF-style allele in the Annovar convention without building a
/// [`Variant`].
///
pub fn annovar_from_vcf(position: u64, reference: &str, alternate: &str) -> AnnovarAllele {
    annovar_trim(
        position,
        reference.to_ascii_uppercase().as_bytes(),
        alternate.to_ascii_uppercase().as_bytes(),
    )
}

impl Variant {
    ///
    /// All alleles of this record, derived on first access and cached.
    ///
    pub fn alleles(&self) -> &[Allele] {
        self.alleles.get_or_init(|| {
            self.alternates
                .iter()
                .enumerate()
                .map(|(i, alt)| Allele::derive(i + 1, self.position, &self.reference, alt))
                .collect()
        })
    }

    ///
    /// One allele by its 1-based index.
    ///
    pub fn allele(&self, index: usize) -> Result<&Allele> {
        let alleles = self.alleles();
        if index == 0 || index > alleles.len() {
            return Err(VariantError::AlleleIndexOutOfRange {
                index,
                count: alleles.len(),
            });
        }
        Ok(&alleles[index - 1])
    }
}
