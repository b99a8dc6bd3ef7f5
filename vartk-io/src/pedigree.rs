//! PED pedigree loading and family-graph queries.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use fxhash::FxHashMap;

use crate::codes::{AffectionStatus, Sex, decode_sex, decode_status};
use crate::errors::PedigreeError;

const UNKNOWN_PARENT: &str = "0";

#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub family: String,
    pub id: String,
    pub father: Option<String>,
    pub mother: Option<String>,
    pub sex: Sex,
    pub status: AffectionStatus,
}

impl Individual {
    pub fn is_founder(&self) -> bool {
        self.father.is_none() && self.mother.is_none()
    }

    pub fn is_affected(&self) -> bool {
        self.status == AffectionStatus::Affected
    }

    fn has_parent(&self, id: &str) -> bool {
        self.father.as_deref() == Some(id) || self.mother.as_deref() == Some(id)
    }
}

///
/// Individuals of one or more families, keyed by individual id.
///
/// Individual ids must be unique across the whole file. Every named parent
/// must itself appear as an individual.
///
#[derive(Debug, Clone, Default)]
pub struct Pedigree {
    individuals: Vec<Individual>,
    lookup: FxHashMap<String, usize>,
}

fn parent(raw: &str) -> Option<String> {
    match raw {
        UNKNOWN_PARENT | "" | "." => None,
        id => Some(id.to_string()),
    }
}

impl Pedigree {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Pedigree, PedigreeError> {
        Pedigree::from_reader(BufReader::new(File::open(path)?))
    }

    ///
    /// Parse whitespace-separated PED lines:
    /// `family individual father mother sex phenotype`.
    ///
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Pedigree, PedigreeError> {
        let mut individuals = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 6 {
                return Err(PedigreeError::Malformed {
                    line: i + 1,
                    reason: format!("expected 6 columns, found {}", cols.len()),
                });
            }
            individuals.push(Individual {
                family: cols[0].to_string(),
                id: cols[1].to_string(),
                father: parent(cols[2]),
                mother: parent(cols[3]),
                sex: decode_sex(cols[4])?,
                status: decode_status(cols[5])?,
            });
        }
        Pedigree::new(individuals)
    }

    pub fn new(individuals: Vec<Individual>) -> Result<Pedigree, PedigreeError> {
        let mut lookup = FxHashMap::default();
        for (i, ind) in individuals.iter().enumerate() {
            if lookup.insert(ind.id.clone(), i).is_some() {
                return Err(PedigreeError::DuplicateIndividual(ind.id.clone()));
            }
        }
        for ind in &individuals {
            for p in ind.father.iter().chain(ind.mother.iter()) {
                if !lookup.contains_key(p) {
                    return Err(PedigreeError::UnknownParent {
                        individual: ind.id.clone(),
                        parent: p.clone(),
                    });
                }
            }
        }
        Ok(Pedigree {
            individuals,
            lookup,
        })
    }

    pub fn get(&self, id: &str) -> Option<&Individual> {
        self.lookup.get(id).map(|i| &self.individuals[*i])
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    ///
    /// Family ids in order of first appearance.
    ///
    pub fn families(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for ind in &self.individuals {
            if !seen.contains(&ind.family.as_str()) {
                seen.push(&ind.family);
            }
        }
        seen
    }

    pub fn family(&self, family: &str) -> Vec<&Individual> {
        self.individuals
            .iter()
            .filter(|i| i.family == family)
            .collect()
    }

    ///
    /// `(father, mother)` of an individual; either may be unknown.
    ///
    pub fn parents(&self, id: &str) -> (Option<&Individual>, Option<&Individual>) {
        match self.get(id) {
            None => (None, None),
            Some(ind) => (
                ind.father.as_deref().and_then(|f| self.get(f)),
                ind.mother.as_deref().and_then(|m| self.get(m)),
            ),
        }
    }

    pub fn children(&self, id: &str) -> Vec<&Individual> {
        self.individuals.iter().filter(|i| i.has_parent(id)).collect()
    }

    ///
    /// Individuals sharing at least one known parent with `id`.
    ///
    pub fn siblings(&self, id: &str) -> Vec<&Individual> {
        let Some(ind) = self.get(id) else {
            return Vec::new();
        };
        self.individuals
            .iter()
            .filter(|other| other.id != ind.id)
            .filter(|other| {
                ind.father.iter().chain(ind.mother.iter()).any(|p| other.has_parent(p))
            })
            .collect()
    }

    pub fn founders(&self) -> Vec<&Individual> {
        self.individuals.iter().filter(|i| i.is_founder()).collect()
    }

    ///
    /// `(child, father, mother)` when both parents of `id` are known.
    ///
    pub fn trio(&self, id: &str) -> Option<(&Individual, &Individual, &Individual)> {
        let child = self.get(id)?;
        match self.parents(id) {
            (Some(father), Some(mother)) => Some((child, father, mother)),
            _ => None,
        }
    }

    ///
    /// Every complete trio, in file order of the child.
    ///
    pub fn trios(&self) -> Vec<(&Individual, &Individual, &Individual)> {
        self.individuals
            .iter()
            .filter_map(|i| self.trio(&i.id))
            .collect()
    }

    ///
    /// Parents, children and siblings of `id`, each listed once.
    ///
    pub fn first_degree(&self, id: &str) -> Vec<&Individual> {
        let (father, mother) = self.parents(id);
        let mut relatives: Vec<&Individual> = father.into_iter().chain(mother).collect();
        for rel in self.children(id).into_iter().chain(self.siblings(id)) {
            if !relatives.iter().any(|r| r.id == rel.id) {
                relatives.push(rel);
            }
        }
        relatives
    }

    ///
    /// One representative per family: an affected founder if there is one,
    /// otherwise any founder, otherwise the first member listed.
    ///
    pub fn unrelated(&self) -> Vec<&Individual> {
        self.families()
            .into_iter()
            .filter_map(|fam| {
                let members = self.family(fam);
                members
                    .iter()
                    .find(|i| i.is_founder() && i.is_affected())
                    .or_else(|| members.iter().find(|i| i.is_founder()))
                    .or_else(|| members.first())
                    .copied()
            })
            .collect()
    }
}
