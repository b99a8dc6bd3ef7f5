use std::fs::File;
use std::path::{Path, PathBuf};

use fxhash::FxHashMap;
use log::debug;
use memmap2::Mmap;

use vartk_core::SequenceError;
use vartk_core::sequence::{SequenceProvider, check_range};

use crate::errors::{FastaError, Result};
use crate::index::{FaiRecord, compute_fai, fai_path, read_fai, write_fai};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

///
/// Random access into an uncompressed FASTA through its `.fai` index.
///
/// The file is memory-mapped; bases are returned exactly as stored, so
/// soft-masked (lower-case) regions stay lower-case.
///
pub struct IndexedFasta {
    path: PathBuf,
    mmap: Mmap,
    records: Vec<FaiRecord>,
    lookup: FxHashMap<String, usize>,
}

impl IndexedFasta {
    ///
    /// Open a FASTA, reading `<path>.fai` when present and scanning the file
    /// to build the index otherwise.
    ///
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and the file is not modified while open
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.starts_with(&GZIP_MAGIC) {
            return Err(FastaError::Compressed {
                path: path.to_path_buf(),
            });
        }

        let index = fai_path(path);
        let records = if index.exists() {
            debug!("Reading FASTA index {:?}", index);
            read_fai(&index)?
        } else {
            debug!("No index at {:?}; scanning {:?}", index, path);
            compute_fai(&mmap)?
        };

        let lookup = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.clone(), i))
            .collect();

        Ok(IndexedFasta {
            path: path.to_path_buf(),
            mmap,
            records,
            lookup,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    ///
    /// Index records in file order.
    ///
    pub fn contigs(&self) -> &[FaiRecord] {
        &self.records
    }

    pub fn record(&self, contig: &str) -> Option<&FaiRecord> {
        self.lookup.get(contig).map(|i| &self.records[*i])
    }

    ///
    /// Write the index next to the FASTA and return its path.
    ///
    pub fn write_index(&self) -> Result<PathBuf> {
        let index = fai_path(&self.path);
        write_fai(&self.records, File::create(&index)?)?;
        Ok(index)
    }
}

impl SequenceProvider for IndexedFasta {
    fn fetch(&self, contig: &str, start: u64, end: u64) -> std::result::Result<Vec<u8>, SequenceError> {
        let Some(record) = self.record(contig) else {
            return check_range(contig, start, end, None).map(|_| Vec::new());
        };
        check_range(contig, start, end, Some(record.length))?;

        let wanted = (end - start + 1) as usize;
        let mut bases = Vec::with_capacity(wanted);
        let from = record.byte_offset(start - 1) as usize;
        for byte in self.mmap.get(from..).unwrap_or(&[]) {
            if bases.len() == wanted {
                break;
            }
            if *byte != b'\n' && *byte != b'\r' {
                bases.push(*byte);
            }
        }

        if bases.len() < wanted {
            return Err(SequenceError::OutOfRange {
                contig: contig.to_string(),
                start,
                end,
                reason: format!("index for {:?} points past the end of the file", self.path),
            });
        }
        Ok(bases)
    }

    fn contig_length(&self, contig: &str) -> Option<u64> {
        self.record(contig).map(|r| r.length)
    }
}
