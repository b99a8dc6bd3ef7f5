//! FASTA index (`.fai`) records: reading, writing and computing them.
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::errors::{FastaError, Result};

///
/// One line of a samtools-style `.fai` index.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaiRecord {
    pub name: String,
    /// number of bases in the sequence
    pub length: u64,
    /// byte offset of the first base
    pub offset: u64,
    /// bases per full line
    pub line_bases: u64,
    /// bytes per full line, line terminator included
    pub line_bytes: u64,
}

impl FaiRecord {
    ///
    /// Byte offset of the 0-based base `pos`.
    ///
    pub fn byte_offset(&self, pos: u64) -> u64 {
        if self.line_bases == 0 {
            return self.offset;
        }
        self.offset + (pos / self.line_bases) * self.line_bytes + pos % self.line_bases
    }
}

///
/// Path of the index belonging to a FASTA: the file name with `.fai` appended.
///
pub fn fai_path<P: AsRef<Path>>(fasta: P) -> PathBuf {
    let mut name = OsString::from(fasta.as_ref().as_os_str());
    name.push(".fai");
    PathBuf::from(name)
}

///
/// Read an existing `.fai` file.
///
pub fn read_fai<P: AsRef<Path>>(path: P) -> Result<Vec<FaiRecord>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut records = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 5 {
            return Err(FastaError::MalformedIndex {
                line: i + 1,
                reason: format!("expected 5 columns, found {}", parts.len()),
            });
        }
        let number = |col: usize| {
            parts[col]
                .parse::<u64>()
                .map_err(|_| FastaError::MalformedIndex {
                    line: i + 1,
                    reason: format!("column {} `{}` is not an integer", col + 1, parts[col]),
                })
        };
        records.push(FaiRecord {
            name: parts[0].to_string(),
            length: number(1)?,
            offset: number(2)?,
            line_bases: number(3)?,
            line_bytes: number(4)?,
        });
    }
    Ok(records)
}

pub fn write_fai<W: Write>(records: &[FaiRecord], mut out: W) -> Result<()> {
    for r in records {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            r.name, r.length, r.offset, r.line_bases, r.line_bytes
        )?;
    }
    Ok(())
}

fn trim_eol(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && (line[end - 1] == b'\n' || line[end - 1] == b'\r') {
        end -= 1;
    }
    &line[..end]
}

///
/// Compute index records by scanning raw, uncompressed FASTA bytes.
///
/// Every sequence line except the last of a record must have the same
/// length, as samtools requires.
///
/// # Arguments
/// - data: the whole FASTA file
///
pub fn compute_fai(data: &[u8]) -> Result<Vec<FaiRecord>> {
    let mut records = Vec::new();
    let mut current: Option<FaiRecord> = None;
    let mut saw_short_line = false;
    let mut offset: u64 = 0;

    for line in data.split_inclusive(|b| *b == b'\n') {
        let line_bytes = line.len() as u64;
        let content = trim_eol(line);

        if content.first() == Some(&b'>') {
            records.extend(current.take());
            let header = std::str::from_utf8(&content[1..])
                .map_err(|_| FastaError::MalformedFasta("header is not valid UTF-8".to_string()))?;
            let name = header.split_whitespace().next().unwrap_or("");
            if name.is_empty() {
                return Err(FastaError::MalformedFasta(format!(
                    "empty sequence name at byte {}",
                    offset
                )));
            }
            current = Some(FaiRecord {
                name: name.to_string(),
                length: 0,
                offset: offset + line_bytes,
                line_bases: 0,
                line_bytes: 0,
            });
            saw_short_line = false;
        } else if let Some(record) = current.as_mut() {
            if !content.is_empty() {
                let bases = content.len() as u64;
                if record.line_bases == 0 {
                    record.line_bases = bases;
                    record.line_bytes = line_bytes;
                } else if saw_short_line || bases > record.line_bases {
                    return Err(FastaError::MalformedFasta(format!(
                        "uneven line lengths in sequence {}",
                        record.name
                    )));
                }
                saw_short_line = bases < record.line_bases;
                record.length += bases;
            }
        } else if !content.is_empty() {
            return Err(FastaError::MalformedFasta(
                "sequence data before the first header".to_string(),
            ));
        }
        offset += line_bytes;
    }
    records.extend(current);
    Ok(records)
}
