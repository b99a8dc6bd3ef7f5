use std::cell::OnceCell;
use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::allele::Allele;
use crate::errors::{Result, VariantError};

/// Per-sample genotype subfields, keyed by FORMAT key in FORMAT order.
pub type SampleFields = IndexMap<String, String>;

pub(crate) const MISSING: &str = ".";

const COL_CONTIG: usize = 0;
const COL_POSITION: usize = 1;
const COL_ID: usize = 2;
const COL_REF: usize = 3;
const COL_ALT: usize = 4;
const COL_QUAL: usize = 5;
const COL_FILTER: usize = 6;
const COL_INFO: usize = 7;
const COL_FORMAT: usize = 8;
const COL_FIRST_SAMPLE: usize = 9;

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("valid integer pattern"));
static FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?([0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)([eE][+-]?[0-9]+)?$")
        .expect("valid float pattern")
});

///
/// A typed INFO value, decided from the raw token when the record is parsed.
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InfoValue {
    Flag,
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl InfoValue {
    ///
    /// Classify a raw INFO value token.
    ///
    pub fn from_token(raw: &str) -> InfoValue {
        if raw.contains(',') {
            return InfoValue::List(raw.split(',').map(str::to_string).collect());
        }
        if INTEGER_RE.is_match(raw) {
            if let Ok(v) = raw.parse::<i64>() {
                return InfoValue::Integer(v);
            }
        }
        if FLOAT_RE.is_match(raw) {
            if let Ok(v) = raw.parse::<f64>() {
                return InfoValue::Float(v);
            }
        }
        InfoValue::Text(raw.to_string())
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, InfoValue::Flag)
    }
}

impl Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoValue::Flag => Ok(()),
            InfoValue::Integer(v) => write!(f, "{}", v),
            // Debug keeps the trailing `.0` so `AF=1.0` stays a float on output
            InfoValue::Float(v) => write!(f, "{:?}", v),
            InfoValue::Text(v) => write!(f, "{}", v),
            InfoValue::List(v) => write!(f, "{}", v.join(",")),
        }
    }
}

///
/// QUAL and INFO values exactly as they were written in the input line.
///
/// Numbers such as `50.00` or `DP=007` are rendered from this text as long
/// as the typed value has not been changed since parsing.
///
#[derive(Debug, Clone, Default)]
pub(crate) struct RawTokens {
    quality: Option<String>,
    info: IndexMap<String, String>,
}

///
/// One parsed variant record.
///
/// Alleles are derived from `reference`/`alternates` the first time they are
/// requested and cached for the lifetime of the record. A `Variant` is meant
/// to be owned by one worker at a time: it is `Send` but not `Sync`.
///
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variant {
    pub contig: String,
    /// 1-based position of the first reference base
    pub position: u64,
    pub id: Option<String>,
    pub reference: String,
    pub alternates: Vec<String>,
    pub quality: Option<f64>,
    pub filter: Option<String>,
    pub info: IndexMap<String, InfoValue>,
    pub format_keys: Vec<String>,
    pub samples: Vec<SampleFields>,

    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) raw: RawTokens,

    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) alleles: OnceCell<Vec<Allele>>,
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.contig == other.contig
            && self.position == other.position
            && self.id == other.id
            && self.reference == other.reference
            && self.alternates == other.alternates
            && self.quality == other.quality
            && self.filter == other.filter
            && self.info == other.info
            && self.format_keys == other.format_keys
            && self.samples == other.samples
    }
}

impl Variant {
    ///
    /// Create a sites-only variant with no INFO and no samples.
    ///
    pub fn new(contig: &str, position: u64, reference: &str, alternates: &[&str]) -> Self {
        Variant {
            contig: contig.to_string(),
            position,
            reference: reference.to_string(),
            alternates: alternates.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    ///
    /// Number of per-sample genotype columns.
    ///
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_multiallelic(&self) -> bool {
        self.alternates.len() > 1
    }

    ///
    /// Look up one subfield of one sample.
    ///
    pub fn sample_value(&self, sample: usize, key: &str) -> Option<&str> {
        self.samples
            .get(sample)
            .and_then(|fields| fields.get(key))
            .map(String::as_str)
    }

    ///
    /// Join one sample's values in FORMAT order, rendering absent values as `.`.
    ///
    pub fn sample_string(&self, sample: usize) -> Result<String> {
        let fields = self
            .samples
            .get(sample)
            .ok_or(VariantError::SampleIndexOutOfRange {
                index: sample,
                count: self.samples.len(),
            })?;
        Ok(join_sample(&self.format_keys, fields))
    }

    fn quality_string(&self) -> String {
        match (self.quality, &self.raw.quality) {
            (None, _) => MISSING.to_string(),
            (Some(q), Some(raw)) if raw.parse::<f64>().ok() == Some(q) => raw.clone(),
            (Some(q), _) => q.to_string(),
        }
    }

    fn info_string(&self) -> String {
        if self.info.is_empty() {
            return MISSING.to_string();
        }
        self.info
            .iter()
            .map(|(k, v)| match v {
                InfoValue::Flag => k.clone(),
                _ => match self.raw.info.get(k) {
                    Some(raw) if InfoValue::from_token(raw) == *v => format!("{}={}", k, raw),
                    _ => format!("{}={}", k, v),
                },
            })
            .collect::<Vec<String>>()
            .join(";")
    }
}

pub(crate) fn join_sample(format_keys: &[String], fields: &SampleFields) -> String {
    format_keys
        .iter()
        .map(|k| fields.get(k).map(String::as_str).unwrap_or(MISSING))
        .collect::<Vec<&str>>()
        .join(":")
}

fn optional(cell: Option<&str>) -> Option<String> {
    match cell {
        None | Some("") | Some(MISSING) => None,
        Some(s) => Some(s.to_string()),
    }
}

fn parse_info(cell: &str) -> (IndexMap<String, InfoValue>, IndexMap<String, String>) {
    let mut info = IndexMap::new();
    let mut raw = IndexMap::new();
    if cell.is_empty() || cell == MISSING {
        return (info, raw);
    }
    for token in cell.split(';') {
        match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                info.insert(key.to_string(), InfoValue::from_token(value));
                raw.insert(key.to_string(), value.to_string());
            }
            Some(_) => continue,
            None if token.is_empty() => continue,
            // anything that is not key=value is kept as a flag
            None => {
                info.insert(token.to_string(), InfoValue::Flag);
                raw.shift_remove(token);
            }
        }
    }
    (info, raw)
}

impl FromStr for Variant {
    type Err = VariantError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let fields: Vec<&str> = line.split('\t').collect();

        if fields.len() <= COL_ALT {
            return Err(VariantError::malformed(
                line,
                fields.len(),
                format!("expected at least {} columns, found {}", COL_ALT + 1, fields.len()),
            ));
        }

        let contig = fields[COL_CONTIG];
        if contig.is_empty() || contig == MISSING {
            return Err(VariantError::malformed(line, COL_CONTIG, "missing contig"));
        }

        let position = fields[COL_POSITION]
            .parse::<u64>()
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| {
                VariantError::malformed(
                    line,
                    COL_POSITION,
                    format!("position `{}` is not a positive integer", fields[COL_POSITION]),
                )
            })?;

        let reference = fields[COL_REF];
        if reference.is_empty() || reference == MISSING {
            return Err(VariantError::malformed(line, COL_REF, "missing reference allele"));
        }

        let alternates: Vec<String> = match fields[COL_ALT] {
            "" => {
                return Err(VariantError::malformed(line, COL_ALT, "missing alternate alleles"));
            }
            MISSING => Vec::new(),
            alts => alts.split(',').map(str::to_string).collect(),
        };
        if alternates.iter().any(|a| a.is_empty()) {
            return Err(VariantError::malformed(line, COL_ALT, "empty alternate allele"));
        }

        let raw_quality = optional(fields.get(COL_QUAL).copied());
        let quality = match &raw_quality {
            None => None,
            Some(q) => Some(q.parse::<f64>().map_err(|_| {
                VariantError::malformed(line, COL_QUAL, format!("quality `{}` is not numeric", q))
            })?),
        };

        let (info, raw_info) = fields
            .get(COL_INFO)
            .map(|cell| parse_info(cell))
            .unwrap_or_default();

        let format_keys: Vec<String> = match optional(fields.get(COL_FORMAT).copied()) {
            Some(format) => format.split(':').map(str::to_string).collect(),
            None => Vec::new(),
        };
        if let Some((i, key)) = format_keys
            .iter()
            .enumerate()
            .find(|(i, k)| format_keys[..*i].contains(*k))
        {
            return Err(VariantError::malformed(
                line,
                COL_FORMAT,
                format!("FORMAT key `{}` is repeated at position {}", key, i + 1),
            ));
        }

        let sample_cells = fields.get(COL_FIRST_SAMPLE..).unwrap_or(&[]);
        if !sample_cells.is_empty() && format_keys.is_empty() {
            return Err(VariantError::malformed(
                line,
                COL_FORMAT,
                "sample columns present without a FORMAT column",
            ));
        }

        let mut samples = Vec::with_capacity(sample_cells.len());
        for (i, cell) in sample_cells.iter().enumerate() {
            let values: Vec<&str> = cell.split(':').collect();
            if values.len() > format_keys.len() {
                return Err(VariantError::malformed(
                    line,
                    COL_FIRST_SAMPLE + i,
                    format!(
                        "sample has {} values but FORMAT declares {} keys",
                        values.len(),
                        format_keys.len()
                    ),
                ));
            }
            // trailing values may be dropped, so zip stops at the shorter side
            let fields: SampleFields = format_keys
                .iter()
                .zip(values)
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect();
            samples.push(fields);
        }

        Ok(Variant {
            contig: contig.to_string(),
            position,
            id: optional(Some(fields[COL_ID])),
            reference: reference.to_string(),
            alternates,
            quality,
            filter: optional(fields.get(COL_FILTER).copied()),
            info,
            format_keys,
            samples,
            raw: RawTokens {
                quality: raw_quality,
                info: raw_info,
            },
            alleles: OnceCell::new(),
        })
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alts = if self.alternates.is_empty() {
            MISSING.to_string()
        } else {
            self.alternates.join(",")
        };
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.contig,
            self.position,
            self.id.as_deref().unwrap_or(MISSING),
            self.reference,
            alts,
            self.quality_string(),
            self.filter.as_deref().unwrap_or(MISSING),
            self.info_string(),
        )?;
        if !self.format_keys.is_empty() {
            write!(f, "\t{}", self.format_keys.join(":"))?;
            for fields in &self.samples {
                write!(f, "\t{}", join_sample(&self.format_keys, fields))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn multi_sample_line() -> &'static str {
        "chr1\t40503520\trs1\tACTGCTG\tACTGCTGCTGCTGCTG,A\t50\tPASS\tDP=40;AF=0.5,0.25;DB;SOURCE=gatk\tGT:AD:DP:GQ:PL\t1/2:.:40:80:80,0,255\t0/0:10,0,0:10:30:0,30,300"
    }

    #[rstest]
    fn test_parse_all_columns(multi_sample_line: &str) {
        let v: Variant = multi_sample_line.parse().unwrap();

        assert_eq!(v.contig, "chr1");
        assert_eq!(v.position, 40503520);
        assert_eq!(v.id.as_deref(), Some("rs1"));
        assert_eq!(v.reference, "ACTGCTG");
        assert_eq!(v.alternates, vec!["ACTGCTGCTGCTGCTG", "A"]);
        assert_eq!(v.quality, Some(50.0));
        assert_eq!(v.filter.as_deref(), Some("PASS"));
        assert_eq!(v.format_keys, vec!["GT", "AD", "DP", "GQ", "PL"]);
        assert_eq!(v.sample_count(), 2);
        assert_eq!(v.sample_value(0, "GT"), Some("1/2"));
        assert_eq!(v.sample_value(1, "AD"), Some("10,0,0"));
    }

    #[rstest]
    fn test_parse_info_types(multi_sample_line: &str) {
        let v: Variant = multi_sample_line.parse().unwrap();

        assert_eq!(v.info.get("DP"), Some(&InfoValue::Integer(40)));
        assert_eq!(
            v.info.get("AF"),
            Some(&InfoValue::List(vec!["0.5".to_string(), "0.25".to_string()]))
        );
        assert_eq!(v.info.get("DB"), Some(&InfoValue::Flag));
        assert_eq!(v.info.get("SOURCE"), Some(&InfoValue::Text("gatk".to_string())));
    }

    #[rstest]
    #[case("12", InfoValue::Integer(12))]
    #[case("-3", InfoValue::Integer(-3))]
    #[case("0.25", InfoValue::Float(0.25))]
    #[case("1e-5", InfoValue::Float(1e-5))]
    #[case("A,B", InfoValue::List(vec!["A".to_string(), "B".to_string()]))]
    #[case("frameshift", InfoValue::Text("frameshift".to_string()))]
    fn test_info_value_from_token(#[case] raw: &str, #[case] expected: InfoValue) {
        assert_eq!(InfoValue::from_token(raw), expected);
    }

    #[rstest]
    fn test_round_trip_display(multi_sample_line: &str) {
        let v: Variant = multi_sample_line.parse().unwrap();
        assert_eq!(v.to_string(), multi_sample_line);
    }

    #[rstest]
    fn test_display_keeps_number_text() {
        let line = "chr1\t5\t.\tA\tT\t50.00\tPASS\tAF=1.000;DP=007;X=1e-05;DB\tGT\t0/1";
        let v: Variant = line.parse().unwrap();

        assert_eq!(v.quality, Some(50.0));
        assert_eq!(v.info.get("DP"), Some(&InfoValue::Integer(7)));
        assert_eq!(v.to_string(), line);
    }

    #[rstest]
    fn test_display_renders_changed_values() {
        let mut v: Variant = "chr1\t5\t.\tA\tT\t50.00\tPASS\tDP=007".parse().unwrap();

        v.quality = Some(12.5);
        v.info.insert("DP".to_string(), InfoValue::Integer(9));

        assert_eq!(v.to_string(), "chr1\t5\t.\tA\tT\t12.5\tPASS\tDP=9");
    }

    #[rstest]
    fn test_sites_only_record() {
        let v: Variant = "chr2\t5\t.\tG\tA,T".parse().unwrap();

        assert_eq!(v.id, None);
        assert_eq!(v.quality, None);
        assert!(v.info.is_empty());
        assert!(v.format_keys.is_empty());
        assert_eq!(v.to_string(), "chr2\t5\t.\tG\tA,T\t.\t.\t.");
    }

    #[rstest]
    fn test_non_numeric_position_is_malformed() {
        let err = "chr1\tabc\t.\tA\tT".parse::<Variant>().unwrap_err();
        match err {
            VariantError::MalformedRecord { column, line, .. } => {
                assert_eq!(column, 1);
                assert_eq!(line, "chr1\tabc\t.\tA\tT");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    #[case("chr1\t0\t.\tA\tT", 1)]
    #[case("chr1\t10\t.\tA", 4)]
    #[case("chr1\t10", 2)]
    #[case(".\t10\t.\tA\tT", 0)]
    #[case("chr1\t10\t.\t.\tT", 3)]
    #[case("chr1\t10\t.\tA\t", 4)]
    #[case("chr1\t10\t.\tA\tT\tlow", 5)]
    #[case("chr1\t10\t.\tA\tT\t.\t.\t.\tGT\t0/1:35", 9)]
    #[case("chr1\t10\t.\tA\tT\t.\t.\t.\t.\t0/1", 8)]
    #[case("chr1\t10\t.\tA\tT\t.\t.\t.\tGT:GT\t0/1:1/1", 8)]
    fn test_malformed_columns(#[case] line: &str, #[case] expected_column: usize) {
        match line.parse::<Variant>() {
            Err(VariantError::MalformedRecord { column, .. }) => {
                assert_eq!(column, expected_column)
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[rstest]
    fn test_reference_site_has_no_alternates() {
        let v: Variant = "chr1\t10\t.\tA\t.".parse().unwrap();
        assert!(v.alternates.is_empty());
        assert_eq!(v.to_string(), "chr1\t10\t.\tA\t.\t.\t.\t.");
    }

    #[rstest]
    fn test_dropped_trailing_sample_values() {
        let v: Variant = "chr1\t10\t.\tA\tT\t.\t.\t.\tGT:DP:GQ\t0/1".parse().unwrap();

        assert_eq!(v.sample_value(0, "GT"), Some("0/1"));
        assert_eq!(v.sample_value(0, "DP"), None);
        assert_eq!(v.sample_string(0).unwrap(), "0/1:.:.");
    }

    #[rstest]
    fn test_partial_info_entries_become_flags() {
        let v: Variant = "chr1\t10\t.\tA\tT\t.\t.\tDP=3;;SOMATIC;=x".parse().unwrap();

        assert_eq!(v.info.len(), 2);
        assert!(v.info["SOMATIC"].is_flag());
    }
}
