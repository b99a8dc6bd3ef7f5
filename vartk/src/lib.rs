//! Umbrella crate re-exporting the vartk libraries behind feature flags.
//!
//! - `core`: variant records, alleles, equivalence and genotypes
//! - `fasta`: indexed and in-memory reference access
//! - `io`: delimited tables, sample sheets and pedigrees

#[cfg(feature = "core")]
#[doc(inline)]
pub use vartk_core as core;

#[cfg(feature = "fasta")]
#[doc(inline)]
pub use vartk_fasta as fasta;

#[cfg(feature = "io")]
#[doc(inline)]
pub use vartk_io as io;
