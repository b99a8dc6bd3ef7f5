use std::path::PathBuf;

use thiserror::Error;

use vartk_core::SequenceError;

#[derive(Error, Debug)]
pub enum FastaError {
    #[error("{path:?} is compressed; indexed access needs an uncompressed FASTA")]
    Compressed { path: PathBuf },

    #[error("Malformed FASTA index at line {line}: {reason}")]
    MalformedIndex { line: usize, reason: String },

    #[error("Malformed FASTA: {0}")]
    MalformedFasta(String),

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FastaError>;
