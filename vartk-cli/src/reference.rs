//! Opening a reference FASTA for sequence lookups.
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use vartk_core::SequenceProvider;
use vartk_fasta::{CachedProvider, FastaError, InMemoryFasta, IndexedFasta};

pub type Reference = CachedProvider<Arc<dyn SequenceProvider>>;

///
/// Open `path` with indexed access, loading it into memory when it is compressed.
///
pub fn open_reference(path: &Path, cache_capacity: usize) -> Result<Reference> {
    let provider: Arc<dyn SequenceProvider> = match IndexedFasta::open(path) {
        Ok(fasta) => Arc::new(fasta),
        Err(FastaError::Compressed { .. }) => {
            info!("{:?} is compressed; loading it into memory", path);
            Arc::new(
                InMemoryFasta::from_path(path)
                    .with_context(|| format!("Failed to read FASTA: {:?}", path))?,
            )
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to open FASTA: {:?}", path)),
    };
    Ok(CachedProvider::new(provider, cache_capacity))
}
