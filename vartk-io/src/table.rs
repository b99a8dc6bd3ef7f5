//! Delimited text tables with a header line.
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use indexmap::IndexMap;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::errors::{IoError, Result};
use crate::legacy::decode_line;

/// One data row keyed by column name, in header order.
pub type Row = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    pub delimiter: char,
    /// Lines starting with this character are skipped
    pub comment: Option<char>,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            delimiter: '\t',
            comment: Some('#'),
        }
    }
}

impl TableOptions {
    pub fn csv() -> Self {
        TableOptions {
            delimiter: ',',
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    ///
    /// Read a delimited file; `.gz` inputs are decompressed on the fly.
    ///
    pub fn read<P: AsRef<Path>>(path: P, options: &TableOptions) -> Result<Table> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader: Box<dyn Read> = if path.extension() == Some(OsStr::new("gz")) {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Table::from_reader(BufReader::new(reader), options)
    }

    ///
    /// Parse a table from any buffered reader.
    ///
    /// The first line that is neither blank nor a comment is the header.
    /// Every following row must have exactly as many cells as the header.
    ///
    pub fn from_reader<R: BufRead>(reader: R, options: &TableOptions) -> Result<Table> {
        let mut table = Table::default();
        let mut has_header = false;

        for (i, line) in reader.split(b'\n').enumerate() {
            let line = decode_line(line?);
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            if options.comment.is_some_and(|c| line.starts_with(c)) {
                continue;
            }

            let cells: Vec<&str> = line.split(options.delimiter).collect();
            if !has_header {
                table.columns = cells.iter().map(|c| c.trim().to_string()).collect();
                has_header = true;
                continue;
            }
            if cells.len() != table.columns.len() {
                return Err(IoError::RaggedRow {
                    line: i + 1,
                    expected: table.columns.len(),
                    found: cells.len(),
                });
            }
            table.rows.push(
                table
                    .columns
                    .iter()
                    .zip(cells)
                    .map(|(k, v)| (k.clone(), v.to_string()))
                    .collect(),
            );
        }

        if !has_header {
            return Err(IoError::MissingHeader);
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    ///
    /// Values of one column, top to bottom.
    ///
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        if !self.has_column(name) {
            return Err(IoError::UnknownColumn(name.to_string()));
        }
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(name).map(String::as_str).unwrap_or(""))
            .collect())
    }

    ///
    /// A new table holding only `columns`, in the order given.
    ///
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Result<Table> {
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        if let Some(missing) = columns.iter().find(|c| !self.has_column(c)) {
            return Err(IoError::UnknownColumn(missing.clone()));
        }
        let rows = self
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| (c.clone(), row.get(c).cloned().unwrap_or_default()))
                    .collect()
            })
            .collect();
        Ok(Table { columns, rows })
    }

    pub fn write<W: Write>(&self, mut out: W, delimiter: char) -> Result<()> {
        let sep = delimiter.to_string();
        writeln!(out, "{}", self.columns.join(&sep))?;
        for row in &self.rows {
            let cells: Vec<&str> = self
                .columns
                .iter()
                .map(|c| row.get(c).map(String::as_str).unwrap_or(""))
                .collect();
            writeln!(out, "{}", cells.join(&sep))?;
        }
        Ok(())
    }

    ///
    /// Pretty, column-aligned text for terminals.
    ///
    pub fn render(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.columns.clone());
        for row in &self.rows {
            builder.push_record(
                self.columns
                    .iter()
                    .map(|c| row.get(c).cloned().unwrap_or_default()),
            );
        }
        builder.build().with(Style::psql()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn table() -> Table {
        let text = "# exported\nsample\tfamily\tsex\nNA1\tF1\t1\n\nNA2\tF1\t2\r\n";
        Table::from_reader(Cursor::new(text), &TableOptions::default()).unwrap()
    }

    #[rstest]
    fn test_read_rows(table: Table) {
        assert_eq!(table.columns, vec!["sample", "family", "sex"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1]["sex"], "2");
        assert_eq!(table.column("sample").unwrap(), vec!["NA1", "NA2"]);
    }

    #[rstest]
    fn test_ragged_row() {
        let err = Table::from_reader(Cursor::new("a,b\n1,2\n3\n"), &TableOptions::csv()).unwrap_err();
        assert!(matches!(
            err,
            IoError::RaggedRow {
                line: 3,
                expected: 2,
                found: 1
            }
        ));
    }

    #[rstest]
    fn test_missing_header() {
        let err = Table::from_reader(Cursor::new("# only\n\n"), &TableOptions::default()).unwrap_err();
        assert!(matches!(err, IoError::MissingHeader));
    }

    #[rstest]
    fn test_select(table: Table) {
        let picked = table.select(&["sex", "sample"]).unwrap();
        assert_eq!(picked.columns, vec!["sex", "sample"]);
        assert_eq!(picked.rows[0].values().collect::<Vec<_>>(), vec!["1", "NA1"]);

        assert!(matches!(
            table.select(&["status"]),
            Err(IoError::UnknownColumn(c)) if c == "status"
        ));
    }

    #[rstest]
    fn test_write_csv(table: Table) {
        let mut out = Vec::new();
        table.write(&mut out, ',').unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "sample,family,sex\nNA1,F1,1\nNA2,F1,2\n"
        );
    }

    #[rstest]
    fn test_render_contains_cells(table: Table) {
        let text = table.render();
        assert!(text.contains("sample"));
        assert!(text.contains("NA2"));
        assert_eq!(text.lines().count(), 4);
    }

    #[rstest]
    fn test_gzipped_input() {
        use flate2::Compression;
        use flate2::write::GzEncoder;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tsv.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(b"x\ty\n1\t2\n").unwrap();
        enc.finish().unwrap();

        let table = Table::read(&path, &TableOptions::default()).unwrap();
        assert_eq!(table.rows[0]["y"], "2");
    }
}
