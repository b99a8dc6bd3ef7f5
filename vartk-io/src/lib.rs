//! # Tabular inputs for vartk
//!
//! Delimited tables, sample sheets with coded metadata columns, and PED
//! pedigrees with the family-graph queries used to pick trios and
//! unrelated representatives.

pub mod codes;
pub mod errors;
pub mod legacy;
pub mod pedigree;
pub mod samples;
pub mod table;

pub use codes::{AffectionStatus, GeneCategory, Sex, decode_gene_category, decode_sex, decode_status};
pub use errors::{DecodeError, IoError, PedigreeError, Result};
pub use pedigree::{Individual, Pedigree};
pub use samples::{Sample, SampleSheet, SampleSheetOptions};
pub use table::{Row, Table, TableOptions};
