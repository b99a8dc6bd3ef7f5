//! Genotype parsing, allele dosage and FORMAT reordering.
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::{Result, VariantError};
use crate::variant::{MISSING, SampleFields, Variant};

/// FORMAT key holding the called genotype.
pub const GT_KEY: &str = "GT";

///
/// A called genotype such as `0/1`, `1|2` or `./.`.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genotype {
    /// Allele indices per chromosome copy; `None` is an uncalled copy
    pub alleles: Vec<Option<usize>>,
    pub phased: bool,
}

impl Genotype {
    pub fn is_called(&self) -> bool {
        !self.alleles.is_empty() && self.alleles.iter().all(Option::is_some)
    }

    pub fn ploidy(&self) -> usize {
        self.alleles.len()
    }

    ///
    /// Count copies of `allele`; `Unknown` as soon as one copy is uncalled.
    ///
    pub fn dosage(&self, allele: usize) -> Dosage {
        if !self.is_called() {
            return Dosage::Unknown;
        }
        let n = self.alleles.iter().filter(|a| **a == Some(allele)).count();
        Dosage::Called(n as u32)
    }

    ///
    /// Highest allele index named by this genotype.
    ///
    pub fn max_allele(&self) -> Option<usize> {
        self.alleles.iter().flatten().copied().max()
    }
}

impl FromStr for Genotype {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self> {
        let phased = s.contains('|');
        let mut alleles = Vec::new();
        for part in s.split(['/', '|']) {
            if part == MISSING {
                alleles.push(None);
                continue;
            }
            let idx = part
                .parse::<usize>()
                .map_err(|_| VariantError::MalformedGenotype {
                    genotype: s.to_string(),
                    reason: format!("`{}` is not an allele index", part),
                })?;
            alleles.push(Some(idx));
        }
        Ok(Genotype { alleles, phased })
    }
}

impl Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.phased { "|" } else { "/" };
        let parts: Vec<String> = self
            .alleles
            .iter()
            .map(|a| match a {
                Some(i) => i.to_string(),
                None => MISSING.to_string(),
            })
            .collect();
        write!(f, "{}", parts.join(sep))
    }
}

///
/// Number of copies of an allele in one sample's genotype.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dosage {
    Called(u32),
    Unknown,
}

impl Dosage {
    pub fn value(&self) -> Option<u32> {
        match self {
            Dosage::Called(n) => Some(*n),
            Dosage::Unknown => None,
        }
    }
}

impl Display for Dosage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dosage::Called(n) => write!(f, "{}", n),
            Dosage::Unknown => write!(f, "NA"),
        }
    }
}

impl Variant {
    ///
    /// The parsed GT of one sample, `None` when the sample carries no GT value.
    ///
    pub fn genotype(&self, sample: usize) -> Result<Option<Genotype>> {
        let fields = self
            .samples
            .get(sample)
            .ok_or(VariantError::SampleIndexOutOfRange {
                index: sample,
                count: self.samples.len(),
            })?;
        match fields.get(GT_KEY) {
            None => Ok(None),
            Some(raw) if raw.is_empty() || raw == MISSING => Ok(None),
            Some(raw) => {
                let genotype: Genotype = raw.parse()?;
                if let Some(max) = genotype.max_allele() {
                    if max > self.alternates.len() {
                        return Err(VariantError::MalformedGenotype {
                            genotype: raw.clone(),
                            reason: format!(
                                "allele {} exceeds the {} declared alternates",
                                max,
                                self.alternates.len()
                            ),
                        });
                    }
                }
                Ok(Some(genotype))
            }
        }
    }

    ///
    /// Copies of `allele` (0 = reference) in one sample's genotype.
    ///
    pub fn dosage(&self, sample: usize, allele: usize) -> Result<Dosage> {
        if allele > self.alternates.len() {
            return Err(VariantError::AlleleIndexOutOfRange {
                index: allele,
                count: self.alternates.len(),
            });
        }
        Ok(self
            .genotype(sample)?
            .map(|gt| gt.dosage(allele))
            .unwrap_or(Dosage::Unknown))
    }

    ///
    /// Dosage of `allele` for every sample, in sample order.
    ///
    pub fn dosages(&self, allele: usize) -> Result<Vec<Dosage>> {
        (0..self.samples.len())
            .map(|sample| self.dosage(sample, allele))
            .collect()
    }

    ///
    /// Re-order the FORMAT keys and every sample's subfields into `canonical`.
    ///
    /// This mutates the record. Every observed FORMAT key must appear in
    /// `canonical`; otherwise `MissingField` is returned and the record is left
    /// as it was. Canonical keys that were never observed are not added.
    ///
    pub fn reorder_fields<S: AsRef<str>>(&mut self, canonical: &[S]) -> Result<()> {
        if let Some(key) = self
            .format_keys
            .iter()
            .find(|k| !canonical.iter().any(|c| c.as_ref() == k.as_str()))
        {
            return Err(VariantError::MissingField { key: key.clone() });
        }

        let format_keys: Vec<String> = canonical
            .iter()
            .map(|c| c.as_ref())
            .filter(|c| self.format_keys.iter().any(|k| k.as_str() == *c))
            .map(str::to_string)
            .collect();

        let samples: Vec<SampleFields> = self
            .samples
            .iter()
            .map(|fields| {
                format_keys
                    .iter()
                    .filter_map(|k| fields.get(k).map(|v| (k.clone(), v.clone())))
                    .collect()
            })
            .collect();

        self.format_keys = format_keys;
        self.samples = samples;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn record(format: &str, samples: &[&str]) -> Variant {
        let mut line = format!("chr1\t100\t.\tA\tC,G\t.\tPASS\t.\t{}", format);
        for s in samples {
            line.push('\t');
            line.push_str(s);
        }
        line.parse().unwrap()
    }

    #[rstest]
    #[case("0/1", vec![Some(0), Some(1)], false)]
    #[case("1|2", vec![Some(1), Some(2)], true)]
    #[case("./.", vec![None, None], false)]
    #[case("1", vec![Some(1)], false)]
    #[case("0/.", vec![Some(0), None], false)]
    fn test_parse_genotype(
        #[case] raw: &str,
        #[case] alleles: Vec<Option<usize>>,
        #[case] phased: bool,
    ) {
        let gt: Genotype = raw.parse().unwrap();
        assert_eq!(gt.alleles, alleles);
        assert_eq!(gt.phased, phased);
        assert_eq!(gt.to_string(), raw);
    }

    #[rstest]
    fn test_parse_genotype_rejects_garbage() {
        assert!("0/x".parse::<Genotype>().is_err());
    }

    #[rstest]
    #[case("1/2", 1, Dosage::Called(1))]
    #[case("1/2", 2, Dosage::Called(1))]
    #[case("2/2", 1, Dosage::Called(0))]
    #[case("2/2", 2, Dosage::Called(2))]
    #[case("0|0", 0, Dosage::Called(2))]
    #[case("./1", 1, Dosage::Unknown)]
    #[case(".", 1, Dosage::Unknown)]
    fn test_dosage(#[case] gt: &str, #[case] allele: usize, #[case] expected: Dosage) {
        let v = record("GT:DP", &[&format!("{}:12", gt)]);
        assert_eq!(v.dosage(0, allele).unwrap(), expected);
    }

    #[rstest]
    fn test_dosage_without_gt_key_is_unknown() {
        let v = record("DP", &["12"]);
        assert_eq!(v.dosage(0, 1).unwrap(), Dosage::Unknown);
    }

    #[rstest]
    fn test_dosage_index_errors() {
        let v = record("GT", &["0/1"]);

        assert!(matches!(
            v.dosage(3, 1),
            Err(VariantError::SampleIndexOutOfRange { index: 3, count: 1 })
        ));
        assert!(matches!(
            v.dosage(0, 3),
            Err(VariantError::AlleleIndexOutOfRange { index: 3, count: 2 })
        ));
    }

    #[rstest]
    fn test_genotype_beyond_alternates_is_malformed() {
        let v = record("GT", &["0/3"]);
        assert!(matches!(v.dosage(0, 1), Err(VariantError::MalformedGenotype { .. })));
    }

    #[rstest]
    fn test_dosages_for_all_samples() {
        let v = record("GT", &["1/2", "2/2", "./.", "0/1"]);
        assert_eq!(
            v.dosages(2).unwrap(),
            vec![
                Dosage::Called(1),
                Dosage::Called(2),
                Dosage::Unknown,
                Dosage::Called(0)
            ]
        );
        assert_eq!(v.dosages(2).unwrap(), v.dosages(2).unwrap());
    }

    #[rstest]
    fn test_reorder_already_canonical_is_noop() {
        let mut v = record("GT:AD:DP:GQ:PL", &["0/1:.:40:80:80,0,255"]);
        let before = v.clone();

        v.reorder_fields(&["GT", "AD", "DP", "GQ", "PL"]).unwrap();

        assert_eq!(v, before);
        assert_eq!(v.sample_string(0).unwrap(), "0/1:.:40:80:80,0,255");
    }

    #[rstest]
    fn test_reorder_reproduces_canonical_string() {
        let mut v = record("DP:PL:GT:GQ:AD", &["40:80,0,255:0/1:80:."]);

        v.reorder_fields(&["GT", "AD", "DP", "GQ", "PL"]).unwrap();

        assert_eq!(v.format_keys, vec!["GT", "AD", "DP", "GQ", "PL"]);
        assert_eq!(v.sample_string(0).unwrap(), "0/1:.:40:80:80,0,255");
    }

    #[rstest]
    fn test_reorder_skips_unobserved_canonical_keys() {
        let mut v = record("DP:GT", &["7:1/1", "3:0/1"]);

        v.reorder_fields(&["GT", "AD", "DP"]).unwrap();

        assert_eq!(v.format_keys, vec!["GT", "DP"]);
        assert_eq!(v.sample_string(1).unwrap(), "0/1:3");
    }

    #[rstest]
    fn test_reorder_missing_key_leaves_record_untouched() {
        let mut v = record("GT:FT:DP", &["0/1:PASS:4", "1/1:PASS:9"]);
        let before = v.to_string();

        let err = v.reorder_fields(&["GT", "DP"]).unwrap_err();

        assert!(matches!(err, VariantError::MissingField { ref key } if key == "FT"));
        assert_eq!(v.to_string(), before);
    }
}
