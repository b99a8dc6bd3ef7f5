//! # FASTA access for vartk
//!
//! Reference bases behind the [`SequenceProvider`](vartk_core::SequenceProvider)
//! trait: memory-mapped indexed access, whole-file in-memory loading and an
//! LRU cache that wraps either.

pub mod cache;
pub mod errors;
pub mod index;
pub mod indexed;
pub mod memory;
pub mod strand;

pub use cache::CachedProvider;
pub use errors::{FastaError, Result};
pub use index::{FaiRecord, compute_fai, fai_path};
pub use indexed::IndexedFasta;
pub use memory::InMemoryFasta;
pub use strand::{Strand, fetch_stranded};
