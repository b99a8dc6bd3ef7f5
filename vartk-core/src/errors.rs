use thiserror::Error;

#[derive(Error, Debug)]
pub enum VariantError {
    #[error("Malformed record (column {column}): {reason}\n  line: {line}")]
    MalformedRecord {
        line: String,
        column: usize,
        reason: String,
    },

    #[error("Format key `{key}` is missing from the target field order")]
    MissingField { key: String },

    #[error("Malformed genotype `{genotype}`: {reason}")]
    MalformedGenotype { genotype: String, reason: String },

    #[error("Sample index {index} is out of range ({count} samples)")]
    SampleIndexOutOfRange { index: usize, count: usize },

    #[error("Allele index {index} is out of range ({count} alternates)")]
    AlleleIndexOutOfRange { index: usize, count: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VariantError {
    pub(crate) fn malformed(line: &str, column: usize, reason: impl Into<String>) -> Self {
        VariantError::MalformedRecord {
            line: line.to_string(),
            column,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SequenceError {
    #[error("Range {contig}:{start}-{end} is out of range: {reason}")]
    OutOfRange {
        contig: String,
        start: u64,
        end: u64,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VariantError>;
