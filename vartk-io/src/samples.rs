//! Sample sheet loading.
use std::path::Path;

use fxhash::FxHashMap;

use crate::codes::{
    AffectionStatus, GeneCategory, Sex, decode_gene_category, decode_sex, decode_status,
};
use crate::errors::{DecodeError, IoError, Result};
use crate::legacy::strip_nbsp;
use crate::table::{Row, Table, TableOptions};

pub const SAMPLE_COL: &str = "sample";
pub const FAMILY_COL: &str = "family";
pub const SEX_COL: &str = "sex";
pub const STATUS_COL: &str = "status";
pub const GENE_CATEGORY_COL: &str = "gene_category";

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: String,
    pub family: Option<String>,
    pub sex: Sex,
    pub status: AffectionStatus,
    pub gene_category: GeneCategory,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSheetOptions {
    pub table: TableOptions,
    /// Strip leading non-breaking spaces from code cells (legacy exports only)
    pub legacy_nbsp: bool,
}

///
/// Per-sample metadata keyed by sample id.
///
/// Only the `sample` column is required; absent code columns decode to their
/// unknown value.
///
#[derive(Debug, Clone, Default)]
pub struct SampleSheet {
    samples: Vec<Sample>,
    lookup: FxHashMap<String, usize>,
}

impl SampleSheet {
    pub fn read<P: AsRef<Path>>(path: P, options: &SampleSheetOptions) -> Result<SampleSheet> {
        let table = Table::read(path, &options.table)?;
        SampleSheet::from_table(&table, options)
    }

    pub fn from_table(table: &Table, options: &SampleSheetOptions) -> Result<SampleSheet> {
        if !table.has_column(SAMPLE_COL) {
            return Err(IoError::UnknownColumn(SAMPLE_COL.to_string()));
        }

        let mut sheet = SampleSheet::default();
        for (i, row) in table.rows.iter().enumerate() {
            let sample = parse_row(row, options).map_err(|source| IoError::Decode {
                row: i + 1,
                source,
            })?;
            if sheet.lookup.contains_key(&sample.id) {
                log::warn!("Sample {} listed twice; keeping the later row", sample.id);
                let idx = sheet.lookup[&sample.id];
                sheet.samples[idx] = sample;
                continue;
            }
            sheet.lookup.insert(sample.id.clone(), sheet.samples.len());
            sheet.samples.push(sample);
        }
        Ok(sheet)
    }

    pub fn get(&self, id: &str) -> Option<&Sample> {
        self.lookup.get(id).map(|i| &self.samples[*i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn affected(&self) -> impl Iterator<Item = &Sample> {
        self.samples
            .iter()
            .filter(|s| s.status == AffectionStatus::Affected)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn code_cell<'a>(row: &'a Row, col: &str, options: &SampleSheetOptions) -> &'a str {
    let raw = row.get(col).map(String::as_str).unwrap_or("");
    if options.legacy_nbsp {
        strip_nbsp(raw)
    } else {
        raw
    }
}

fn parse_row(row: &Row, options: &SampleSheetOptions) -> std::result::Result<Sample, DecodeError> {
    let family = row
        .get(FAMILY_COL)
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(str::to_string);

    Ok(Sample {
        id: row
            .get(SAMPLE_COL)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        family,
        sex: decode_sex(code_cell(row, SEX_COL, options))?,
        status: decode_status(code_cell(row, STATUS_COL, options))?,
        gene_category: decode_gene_category(code_cell(row, GENE_CATEGORY_COL, options))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn table(bytes: &[u8]) -> Table {
        Table::from_reader(Cursor::new(bytes.to_vec()), &TableOptions::default()).unwrap()
    }

    #[rstest]
    fn test_sample_sheet() {
        let t = table(b"sample\tfamily\tsex\tstatus\tgene_category\nP1\tF1\t2\t2\tK\nM1\tF1\tF\t1\t\nX9\t\t0\t0\tnovel\n");
        let sheet = SampleSheet::from_table(&t, &SampleSheetOptions::default()).unwrap();

        assert_eq!(sheet.len(), 3);
        assert_eq!(
            sheet.get("P1").unwrap(),
            &Sample {
                id: "P1".to_string(),
                family: Some("F1".to_string()),
                sex: Sex::Female,
                status: AffectionStatus::Affected,
                gene_category: GeneCategory::Known,
            }
        );
        assert_eq!(sheet.get("M1").unwrap().gene_category, GeneCategory::Unclassified);
        assert_eq!(sheet.get("X9").unwrap().family, None);
        assert_eq!(sheet.affected().count(), 1);
    }

    #[rstest]
    fn test_missing_optional_columns() {
        let sheet =
            SampleSheet::from_table(&table(b"sample\nA\nB\n"), &SampleSheetOptions::default()).unwrap();
        assert_eq!(sheet.get("B").unwrap().sex, Sex::Unknown);
    }

    #[rstest]
    fn test_missing_sample_column() {
        let err = SampleSheet::from_table(&table(b"id\nA\n"), &SampleSheetOptions::default())
            .unwrap_err();
        assert!(matches!(err, IoError::UnknownColumn(c) if c == "sample"));
    }

    #[rstest]
    fn test_legacy_nbsp_requires_opt_in() {
        let raw = b"sample\tgene_category\nP1\t\xa0C\n";

        let strict = SampleSheet::from_table(&table(raw), &SampleSheetOptions::default());
        assert!(matches!(
            strict,
            Err(IoError::Decode {
                row: 1,
                source: DecodeError::GeneCategory(_)
            })
        ));

        let legacy = SampleSheetOptions {
            legacy_nbsp: true,
            ..Default::default()
        };
        let sheet = SampleSheet::from_table(&table(raw), &legacy).unwrap();
        assert_eq!(sheet.get("P1").unwrap().gene_category, GeneCategory::Candidate);
    }
}
