//! Time-boxed dataset cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use super::model::Dataset;

/// Default staleness window before the dataset is fetched again.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

struct CachedDataset {
    dataset: Arc<Dataset>,
    loaded_at: Instant,
}

/// Holds the last loaded dataset and reloads it once it is older than `ttl`.
pub struct DatasetCache {
    ttl: Duration,
    entry: Option<CachedDataset>,
}

impl DatasetCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached dataset, calling `load` if it is missing or stale.
    pub fn get_or_load<F>(&mut self, load: F) -> Result<Arc<Dataset>>
    where
        F: FnOnce() -> Result<Dataset>,
    {
        self.get_or_load_at(Instant::now(), load)
    }

    /// Same as [`Self::get_or_load`] with an explicit clock reading.
    ///
    /// A failed load leaves the previous entry untouched.
    pub fn get_or_load_at<F>(&mut self, now: Instant, load: F) -> Result<Arc<Dataset>>
    where
        F: FnOnce() -> Result<Dataset>,
    {
        if let Some(entry) = &self.entry {
            if now.saturating_duration_since(entry.loaded_at) < self.ttl {
                return Ok(Arc::clone(&entry.dataset));
            }
            log::debug!("Cached dataset is stale, reloading");
        }

        let dataset = Arc::new(load()?);
        self.entry = Some(CachedDataset {
            dataset: Arc::clone(&dataset),
            loaded_at: now,
        });
        Ok(dataset)
    }

    /// Drop the cached entry so the next call reloads.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use anyhow::anyhow;

    use super::*;
    use crate::data::model::fixtures::small_dataset;

    #[test]
    fn test_fresh_entry_is_reused() {
        let mut cache = DatasetCache::new(Duration::from_secs(60));
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            Ok(small_dataset())
        };
        let t0 = Instant::now();

        let t59 = t0 + Duration::from_secs(59);
        let t60 = t0 + Duration::from_secs(60);

        let a = cache.get_or_load_at(t0, load).unwrap();
        let b = cache.get_or_load_at(t59, load).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));

        let c = cache.get_or_load_at(t60, load).unwrap();
        assert_eq!(calls.get(), 2);
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_failed_reload_keeps_previous_entry() {
        let mut cache = DatasetCache::new(Duration::from_secs(1));
        let t0 = Instant::now();
        let first = cache.get_or_load_at(t0, || Ok(small_dataset())).unwrap();

        let t5 = t0 + Duration::from_secs(5);
        let failed = cache.get_or_load_at(t5, || Err(anyhow!("disk gone")));
        assert!(failed.is_err());

        // Entry is still stale, so a working loader runs again.
        let second = cache.get_or_load_at(t5, || Ok(small_dataset())).unwrap();
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let mut cache = DatasetCache::default();
        assert_eq!(cache.ttl(), DEFAULT_TTL);
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            Ok(small_dataset())
        };
        cache.get_or_load(load).unwrap();
        cache.invalidate();
        cache.get_or_load(load).unwrap();
        assert_eq!(calls.get(), 2);
    }
}
