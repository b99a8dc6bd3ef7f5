//! # Variant records and allele conventions
//!
//! Core model for vartk:
//!
//! - VCF-style record parsing and rendering ([`Variant`])
//! - Per-allele normalization under the native and Annovar conventions
//! - Matching Annovar-style descriptions back to an allele index
//! - Genotype dosage, FORMAT reordering and multi-allelic decomposition
//! - Reverse complement and left alignment against a [`SequenceProvider`]

pub mod allele;
pub mod decompose;
pub mod equivalence;
pub mod errors;
pub mod genotype;
pub mod sequence;
pub mod variant;
pub mod vcf;

pub use allele::{Allele, AlleleType, AnnovarAllele, Convention, annovar_from_vcf};
pub use equivalence::{AnnovarQuery, MatchOutcome};
pub use errors::{Result, SequenceError, VariantError};
pub use genotype::{Dosage, GT_KEY, Genotype};
pub use sequence::{SequenceProvider, left_align, reverse_complement, reverse_complement_str};
pub use variant::{InfoValue, SampleFields, Variant};
pub use vcf::{VcfHeader, VcfReader};
