//! Closed code sets shared by sample sheets and pedigrees.
use std::fmt::{self, Display};

use crate::errors::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AffectionStatus {
    Unaffected,
    Affected,
    #[default]
    Unknown,
}

///
/// How strongly a sample's candidate gene is tied to disease.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GeneCategory {
    /// established disease gene
    Known,
    /// reported in the literature, not yet established
    Candidate,
    /// first reported in this cohort
    Novel,
    #[default]
    Unclassified,
}

// ASCII-only trim: U+00A0 is Unicode whitespace and must survive to the caller
fn normalize(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_ascii_whitespace())
        .to_ascii_lowercase()
}

///
/// Decode a sex code: PED numbers (`1`, `2`, `0`) or letters/words, any case.
///
pub fn decode_sex(raw: &str) -> Result<Sex, DecodeError> {
    match normalize(raw).as_str() {
        "1" | "m" | "male" => Ok(Sex::Male),
        "2" | "f" | "female" => Ok(Sex::Female),
        "" | "0" | "u" | "unknown" | "." | "na" => Ok(Sex::Unknown),
        _ => Err(DecodeError::Sex(raw.to_string())),
    }
}

///
/// Decode an affection status: PED numbers (`1` unaffected, `2` affected,
/// `0`/`-9` unknown) or words.
///
pub fn decode_status(raw: &str) -> Result<AffectionStatus, DecodeError> {
    match normalize(raw).as_str() {
        "1" | "unaffected" | "control" => Ok(AffectionStatus::Unaffected),
        "2" | "affected" | "case" => Ok(AffectionStatus::Affected),
        "" | "0" | "-9" | "unknown" | "." | "na" => Ok(AffectionStatus::Unknown),
        _ => Err(DecodeError::Status(raw.to_string())),
    }
}

pub fn decode_gene_category(raw: &str) -> Result<GeneCategory, DecodeError> {
    match normalize(raw).as_str() {
        "k" | "1" | "known" => Ok(GeneCategory::Known),
        "c" | "2" | "candidate" => Ok(GeneCategory::Candidate),
        "n" | "3" | "novel" => Ok(GeneCategory::Novel),
        "" | "0" | "." | "na" | "unclassified" => Ok(GeneCategory::Unclassified),
        _ => Err(DecodeError::GeneCategory(raw.to_string())),
    }
}

impl Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl Display for AffectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AffectionStatus::Unaffected => "unaffected",
            AffectionStatus::Affected => "affected",
            AffectionStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl Display for GeneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GeneCategory::Known => "known",
            GeneCategory::Candidate => "candidate",
            GeneCategory::Novel => "novel",
            GeneCategory::Unclassified => "unclassified",
        };
        write!(f, "{}", s)
    }
}
