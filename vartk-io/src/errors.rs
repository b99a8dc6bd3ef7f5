use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("Row at line {line} has {found} cells; the header declares {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Input has no header line")]
    MissingHeader,

    #[error("Column `{0}` not found")]
    UnknownColumn(String),

    #[error("Data row {row}: {source}")]
    Decode {
        row: usize,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum DecodeError {
    #[error("Unknown sex code `{0}`")]
    Sex(String),

    #[error("Unknown affection status code `{0}`")]
    Status(String),

    #[error("Unknown gene category code `{0}`")]
    GeneCategory(String),
}

#[derive(Error, Debug)]
pub enum PedigreeError {
    #[error("Line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Individual `{0}` is listed more than once")]
    DuplicateIndividual(String),

    #[error("Individual `{individual}` names unknown parent `{parent}`")]
    UnknownParent { individual: String, parent: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IoError>;
