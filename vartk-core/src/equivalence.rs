//! Cross-convention equivalence between a variant and an Annovar-style
//! `(contig, start, observed)` description.
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::VariantError;
use crate::variant::Variant;

///
/// Outcome of comparing a query against every allele of a variant.
///
/// `NoMatch` and `Ambiguous` are ordinary outcomes, not errors.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    NoMatch,
    Match(usize),
    /// More than one allele matched; `first` is the lowest matching index
    Ambiguous { first: usize, count: usize },
}

impl MatchOutcome {
    ///
    /// The matching allele index, taking the first one when ambiguous.
    ///
    pub fn index(&self) -> Option<usize> {
        match self {
            MatchOutcome::NoMatch => None,
            MatchOutcome::Match(i) => Some(*i),
            MatchOutcome::Ambiguous { first, .. } => Some(*first),
        }
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, MatchOutcome::NoMatch)
    }

    pub fn count(&self) -> usize {
        match self {
            MatchOutcome::NoMatch => 0,
            MatchOutcome::Match(_) => 1,
            MatchOutcome::Ambiguous { count, .. } => *count,
        }
    }
}

impl Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOutcome::NoMatch => write!(f, "."),
            MatchOutcome::Match(i) => write!(f, "{}", i),
            MatchOutcome::Ambiguous { first, count } => write!(f, "{}({} matches)", first, count),
        }
    }
}

///
/// A variant described the way Annovar reports it.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnovarQuery {
    pub contig: String,
    pub start: u64,
    pub observed: String,
}

impl AnnovarQuery {
    pub fn new(contig: &str, start: u64, observed: &str) -> Self {
        AnnovarQuery {
            contig: contig.to_string(),
            start,
            observed: observed.to_ascii_uppercase(),
        }
    }
}

impl Display for AnnovarQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.contig, self.start, self.observed)
    }
}

impl FromStr for AnnovarQuery {
    type Err = VariantError;

    ///
    /// Parse `contig:start:observed` or three tab-separated columns.
    ///
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parts: Vec<&str> = if s.contains('\t') {
            s.split('\t').collect()
        } else {
            s.rsplitn(3, ':').collect::<Vec<&str>>().into_iter().rev().collect()
        };
        if parts.len() < 3 {
            return Err(VariantError::malformed(
                s,
                parts.len(),
                "expected contig, start and observed bases",
            ));
        }
        let start = parts[1].parse::<u64>().map_err(|_| {
            VariantError::malformed(s, 1, format!("start `{}` is not an integer", parts[1]))
        })?;
        Ok(AnnovarQuery::new(parts[0], start, parts[2]))
    }
}

impl Variant {
    ///
    /// Find the allele whose Annovar rendering equals the query.
    ///
    /// Each allele is compared through its Annovar rendering of the full
    /// record and of its minimal anchored record, so a query built from
    /// either convention of the same allele finds it. Alleles are scanned in
    /// declaration order and the first match wins; the outcome records how
    /// many alleles matched in total.
    ///
    pub fn matches(&self, contig: &str, position: u64, observed: &str) -> MatchOutcome {
        if contig != self.contig {
            return MatchOutcome::NoMatch;
        }
        let observed = observed.to_ascii_uppercase();

        let mut hits = self
            .alleles()
            .iter()
            .filter(|a| a.equals_annovar(position, &observed))
            .map(|a| a.index);

        match hits.next() {
            None => MatchOutcome::NoMatch,
            Some(first) => {
                let rest = hits.count();
                if rest == 0 {
                    MatchOutcome::Match(first)
                } else {
                    MatchOutcome::Ambiguous {
                        first,
                        count: rest + 1,
                    }
                }
            }
        }
    }

    pub fn matches_query(&self, query: &AnnovarQuery) -> MatchOutcome {
        self.matches(&query.contig, query.start, &query.observed)
    }
}
