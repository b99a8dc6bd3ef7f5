use std::fmt::{self, Display};
use std::str::FromStr;

use vartk_core::SequenceError;
use vartk_core::sequence::{SequenceProvider, reverse_complement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
}

impl FromStr for Strand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" | "forward" | "plus" => Ok(Strand::Forward),
            "-" | "reverse" | "minus" => Ok(Strand::Reverse),
            other => Err(format!("unknown strand `{}`", other)),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

///
/// Fetch a range and reverse-complement it when it lies on the minus strand.
///
pub fn fetch_stranded<P: SequenceProvider + ?Sized>(
    provider: &P,
    contig: &str,
    start: u64,
    end: u64,
    strand: Strand,
) -> Result<Vec<u8>, SequenceError> {
    let bases = provider.fetch(contig, start, end)?;
    Ok(match strand {
        Strand::Forward => bases,
        Strand::Reverse => reverse_complement(&bases),
    })
}
