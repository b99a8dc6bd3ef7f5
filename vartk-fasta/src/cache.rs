use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use lru::LruCache;

use vartk_core::SequenceError;
use vartk_core::sequence::SequenceProvider;

type RangeKey = (String, u64, u64);

///
/// Memoizes recently fetched ranges of another provider.
///
/// The cache sits behind a mutex so the provider stays shareable across
/// worker threads. The lock is not held while the inner provider fetches.
///
pub struct CachedProvider<P> {
    inner: P,
    cache: Mutex<LruCache<RangeKey, Vec<u8>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<P: SequenceProvider> CachedProvider<P> {
    ///
    /// Wrap `inner`, keeping at most `capacity` ranges (at least one).
    ///
    pub fn new(inner: P, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        CachedProvider {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl<P: SequenceProvider> SequenceProvider for CachedProvider<P> {
    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<Vec<u8>, SequenceError> {
        let key = (contig.to_string(), start, end);
        {
            let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
            if let Some(bases) = cache.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(bases.clone());
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("Sequence cache miss for {}:{}-{}", contig, start, end);
        let bases = self.inner.fetch(contig, start, end)?;
        self.cache
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .put(key, bases.clone());
        Ok(bases)
    }

    fn contig_length(&self, contig: &str) -> Option<u64> {
        self.inner.contig_length(contig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::memory::InMemoryFasta;

    #[fixture]
    fn cached() -> CachedProvider<InMemoryFasta> {
        CachedProvider::new(InMemoryFasta::from_records([("chr1", "ACGTACGTAC")]), 2)
    }

    #[rstest]
    fn test_repeated_range_is_a_hit(cached: CachedProvider<InMemoryFasta>) {
        assert_eq!(cached.fetch("chr1", 2, 4).unwrap(), b"CGT".to_vec());
        assert_eq!(cached.fetch("chr1", 2, 4).unwrap(), b"CGT".to_vec());

        assert_eq!(cached.misses(), 1);
        assert_eq!(cached.hits(), 1);
    }

    #[rstest]
    fn test_least_recent_range_is_evicted(cached: CachedProvider<InMemoryFasta>) {
        cached.fetch("chr1", 1, 1).unwrap();
        cached.fetch("chr1", 2, 2).unwrap();
        cached.fetch("chr1", 3, 3).unwrap();
        cached.fetch("chr1", 1, 1).unwrap();

        assert_eq!(cached.misses(), 4);
        assert_eq!(cached.hits(), 0);
    }

    #[rstest]
    fn test_errors_are_not_cached(cached: CachedProvider<InMemoryFasta>) {
        assert!(cached.fetch("chr1", 9, 20).is_err());
        assert!(cached.fetch("chr1", 9, 20).is_err());
        assert_eq!(cached.misses(), 2);
    }

    #[rstest]
    fn test_zero_capacity_still_caches_one(cached: CachedProvider<InMemoryFasta>) {
        let tiny = CachedProvider::new(cached, 0);
        tiny.fetch("chr1", 1, 2).unwrap();
        tiny.fetch("chr1", 1, 2).unwrap();
        assert_eq!(tiny.hits(), 1);
    }
}
