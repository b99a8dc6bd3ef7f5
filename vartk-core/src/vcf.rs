//! Line-oriented VCF reading.
//!
//! Reads plain or gzipped VCF text, collects the header and hands back record
//! lines one at a time. Parsing is left to the caller so that one malformed
//! record never aborts a batch.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::errors::{Result, VariantError};
use crate::variant::Variant;

const BUFFER_CAPACITY: usize = 256 * 1024;

/// Number of fixed columns before the first sample column.
pub const FIXED_COLUMNS: usize = 9;

///
/// Meta lines and column header of a VCF.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VcfHeader {
    /// `##` lines, without the line terminator
    pub meta: Vec<String>,
    /// Column names from the `#CHROM` line
    pub columns: Vec<String>,
}

impl VcfHeader {
    ///
    /// Sample names, in column order.
    ///
    pub fn samples(&self) -> &[String] {
        self.columns.get(FIXED_COLUMNS..).unwrap_or(&[])
    }

    pub fn sample_index(&self, name: &str) -> Option<usize> {
        self.samples().iter().position(|s| s == name)
    }

    ///
    /// Header text as it would be written back out.
    ///
    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.meta.clone();
        if !self.columns.is_empty() {
            lines.push(format!("#{}", self.columns.join("\t")));
        }
        lines
    }

    ///
    /// Add a meta line before the column header unless it is already present.
    ///
    pub fn push_meta(&mut self, line: &str) {
        if !self.meta.iter().any(|m| m == line) {
            self.meta.push(line.to_string());
        }
    }
}

///
/// Streaming reader over the records of a VCF.
///
pub struct VcfReader {
    reader: Box<dyn BufRead>,
    header: VcfHeader,
    pending: Option<(usize, Vec<u8>)>,
    line_number: usize,
}

impl VcfReader {
    ///
    /// Open a VCF, auto-detecting gzip/bgzf compression from the extension.
    ///
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let is_gzipped = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e == "gz" || e == "bgz")
            .unwrap_or(false);
        let reader: Box<dyn BufRead> = if is_gzipped {
            Box::new(BufReader::with_capacity(
                BUFFER_CAPACITY,
                MultiGzDecoder::new(file),
            ))
        } else {
            Box::new(BufReader::with_capacity(BUFFER_CAPACITY, file))
        };
        Self::from_reader(reader)
    }

    ///
    /// Wrap an already opened reader; the header is consumed immediately.
    ///
    pub fn from_reader(reader: Box<dyn BufRead>) -> Result<Self> {
        let mut vcf = VcfReader {
            reader,
            header: VcfHeader::default(),
            pending: None,
            line_number: 0,
        };
        vcf.read_header()?;
        log::debug!(
            "VCF header: {} meta lines, {} samples",
            vcf.header.meta.len(),
            vcf.header.samples().len()
        );
        Ok(vcf)
    }

    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    fn next_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        Ok(Some(buf))
    }

    fn read_header(&mut self) -> Result<()> {
        while let Some(bytes) = self.next_line()? {
            if bytes.starts_with(b"#CHROM") {
                let line = String::from_utf8_lossy(&bytes);
                self.header.columns = std::iter::once("CHROM")
                    .chain(line.split('\t').skip(1))
                    .map(str::to_string)
                    .collect();
            } else if bytes.starts_with(b"#") {
                self.header
                    .meta
                    .push(String::from_utf8_lossy(&bytes).into_owned());
            } else if !bytes.is_empty() {
                self.pending = Some((self.line_number, bytes));
                break;
            }
        }
        Ok(())
    }

    ///
    /// Iterate records parsed into [`Variant`]s, each tagged with its line number.
    ///
    pub fn variants(self) -> impl Iterator<Item = (usize, Result<Variant>)> {
        self.map(|item| match item {
            Ok((n, line)) => (n, line.parse::<Variant>()),
            Err(e) => (0, Err(e)),
        })
    }
}

/// A record line that is not UTF-8 is malformed; reading carries on after it.
fn decode_record(line_number: usize, bytes: Vec<u8>) -> Result<(usize, String)> {
    match String::from_utf8(bytes) {
        Ok(line) => Ok((line_number, line)),
        Err(e) => Err(VariantError::malformed(
            &String::from_utf8_lossy(e.as_bytes()),
            0,
            format!("line {} is not valid UTF-8", line_number),
        )),
    }
}

impl Iterator for VcfReader {
    type Item = Result<(usize, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((n, bytes)) = self.pending.take() {
            return Some(decode_record(n, bytes));
        }
        loop {
            match self.next_line() {
                Ok(Some(bytes)) if bytes.is_empty() || bytes.starts_with(b"#") => continue,
                Ok(Some(bytes)) => return Some(decode_record(self.line_number, bytes)),
                Ok(None) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Cursor, Write};

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use rstest::*;

    const VCF: &str = "##fileformat=VCFv4.2\n\
##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Depth\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA001\tNA002\n\
chr1\t5\t.\tA\tT\t.\tPASS\tDP=3\tGT\t0/1\t1/1\n\
\n\
chr1\tx\t.\tA\tT\t.\tPASS\t.\tGT\t0/1\t1/1\n\
chr2\t9\t.\tG\tA,C\t.\tPASS\t.\tGT\t1/2\t./.\n";

    fn reader() -> VcfReader {
        VcfReader::from_reader(Box::new(Cursor::new(VCF.as_bytes().to_vec()))).unwrap()
    }

    #[rstest]
    fn test_header() {
        let vcf = reader();
        let header = vcf.header();

        assert_eq!(header.meta.len(), 2);
        assert_eq!(header.samples(), &["NA001".to_string(), "NA002".to_string()]);
        assert_eq!(header.sample_index("NA002"), Some(1));
        assert_eq!(header.lines().len(), 3);
        assert!(header.lines()[2].starts_with("#CHROM\tPOS"));
    }

    #[rstest]
    fn test_records_keep_line_numbers() {
        let lines: Vec<(usize, String)> = reader().map(|r| r.unwrap()).collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].0, 4);
        assert_eq!(lines[1].0, 6);
        assert_eq!(lines[2].0, 7);
    }

    #[rstest]
    fn test_malformed_record_does_not_stop_iteration() {
        let results: Vec<(usize, Result<Variant>)> = reader().variants().collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(VariantError::MalformedRecord { column: 1, .. })));
        assert_eq!(results[2].1.as_ref().unwrap().alternates.len(), 2);
    }

    #[rstest]
    fn test_non_utf8_record_is_malformed_and_reading_continues() {
        let mut bytes = b"#CHROM\tPOS\tID\tREF\tALT\n".to_vec();
        bytes.extend_from_slice(b"chr1\t1\t.\tA\tT\n");
        bytes.extend_from_slice(b"chr1\t2\t.\tA\tT\t.\t.\tNOTE=caf\xe9\n");
        bytes.extend_from_slice(b"chr1\t3\t.\tA\tT\n");
        let vcf = VcfReader::from_reader(Box::new(Cursor::new(bytes))).unwrap();

        let items: Vec<Result<(usize, String)>> = vcf.collect();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap().0, 2);
        match &items[1] {
            Err(VariantError::MalformedRecord { column, reason, .. }) => {
                assert_eq!(*column, 0);
                assert!(reason.contains("line 3"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
        assert_eq!(items[2].as_ref().unwrap().1, "chr1\t3\t.\tA\tT");
    }

    #[rstest]
    fn test_gzipped_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.vcf.gz");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(VCF.as_bytes()).unwrap();
            encoder.finish().unwrap();
        }

        let vcf = VcfReader::from_path(&path).unwrap();
        assert_eq!(vcf.header().samples().len(), 2);
        assert_eq!(vcf.count(), 3);
    }

    #[rstest]
    fn test_push_meta_is_idempotent() {
        let mut header = reader().header().clone();
        header.push_meta("##INFO=<ID=OLD_MULTIALLELIC>");
        header.push_meta("##INFO=<ID=OLD_MULTIALLELIC>");
        assert_eq!(header.meta.len(), 3);
    }
}
