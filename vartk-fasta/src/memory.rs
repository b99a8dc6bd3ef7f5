use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use fxhash::FxHashMap;

use vartk_core::SequenceError;
use vartk_core::sequence::{SequenceProvider, check_range};

use crate::errors::{FastaError, Result};

///
/// Whole sequences held in memory, keyed by name.
///
#[derive(Debug, Clone, Default)]
pub struct InMemoryFasta {
    names: Vec<String>,
    sequences: FxHashMap<String, Vec<u8>>,
}

impl InMemoryFasta {
    ///
    /// Load every sequence of a plain or gzipped FASTA.
    ///
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader: Box<dyn Read> = if path.extension() == Some(OsStr::new("gz")) {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Self::from_reader(BufReader::new(reader))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut fasta = InMemoryFasta::default();
        let mut current: Option<(String, Vec<u8>)> = None;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim_end();
            if let Some(header) = line.strip_prefix('>') {
                if let Some((name, seq)) = current.take() {
                    fasta.insert(name, seq);
                }
                let name = header.split_whitespace().next().unwrap_or("");
                if name.is_empty() {
                    return Err(FastaError::MalformedFasta("empty sequence name".to_string()));
                }
                current = Some((name.to_string(), Vec::new()));
            } else if let Some((_, seq)) = current.as_mut() {
                seq.extend_from_slice(line.as_bytes());
            } else if !line.is_empty() {
                return Err(FastaError::MalformedFasta(
                    "sequence data before the first header".to_string(),
                ));
            }
        }
        if let Some((name, seq)) = current {
            fasta.insert(name, seq);
        }
        Ok(fasta)
    }

    ///
    /// Build from `(name, bases)` pairs; a repeated name replaces the earlier sequence.
    ///
    pub fn from_records<I, N, S>(records: I) -> Self
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: AsRef<[u8]>,
    {
        let mut fasta = InMemoryFasta::default();
        for (name, seq) in records {
            fasta.insert(name.into(), seq.as_ref().to_vec());
        }
        fasta
    }

    fn insert(&mut self, name: String, seq: Vec<u8>) {
        if !self.sequences.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.sequences.insert(name, seq);
    }

    ///
    /// Sequence names in the order they were first seen.
    ///
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn sequence(&self, name: &str) -> Option<&[u8]> {
        self.sequences.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl SequenceProvider for InMemoryFasta {
    fn fetch(&self, contig: &str, start: u64, end: u64) -> std::result::Result<Vec<u8>, SequenceError> {
        let seq = self.sequence(contig);
        check_range(contig, start, end, seq.map(|s| s.len() as u64))?;
        Ok(seq
            .map(|s| s[(start - 1) as usize..end as usize].to_vec())
            .unwrap_or_default())
    }

    fn contig_length(&self, contig: &str) -> Option<u64> {
        self.sequence(contig).map(|s| s.len() as u64)
    }
}
