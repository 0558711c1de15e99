//! Bounded set of request paths known to resolve to nothing.

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;

/// Size at which the negative cache is cleared before the next insert.
pub const MAX_MISSING_PATHS: usize = 1000;

/// Copy-on-write set of missing request paths.
///
/// Lookups are lock-free loads of the current snapshot. Inserts publish a new
/// snapshot; once the set holds `capacity` entries the next insert starts over
/// from an empty set, so memory stays bounded under path-scanning traffic.
/// Exempt paths are never recorded.
#[derive(Debug)]
pub struct NegativeCache {
    missing: ArcSwap<HashSet<String>>,
    exempt: ArcSwap<HashSet<String>>,
    capacity: usize,
}

impl Default for NegativeCache {
    fn default() -> Self {
        Self::with_capacity(MAX_MISSING_PATHS)
    }
}

impl NegativeCache {
    /// Create an empty cache holding up to [`MAX_MISSING_PATHS`] entries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache with a custom reset threshold.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            missing: ArcSwap::from_pointee(HashSet::new()),
            exempt: ArcSwap::from_pointee(HashSet::new()),
            capacity,
        }
    }

    /// True if `path` was recorded as missing.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.missing.load().contains(path)
    }

    /// Record `path` as missing.
    ///
    /// Returns `false` without recording if the path is exempt.
    pub fn record(&self, path: &str) -> bool {
        if self.exempt.load().contains(path) {
            return false;
        }

        let capacity = self.capacity;
        let previous = self.missing.rcu(|current| {
            let mut next = if current.len() >= capacity {
                HashSet::new()
            } else {
                HashSet::clone(current)
            };
            next.insert(path.to_owned());
            next
        });

        if previous.len() >= capacity {
            tracing::info!(capacity, "Negative cache full, cleared");
        }
        true
    }

    /// Replace the set of paths that are never recorded.
    ///
    /// Exempt paths already in the cache are dropped from it.
    pub fn set_exempt(&self, paths: impl IntoIterator<Item = String>) {
        let exempt: HashSet<String> = paths.into_iter().collect();
        self.missing.rcu(|current| {
            current
                .iter()
                .filter(|path| !exempt.contains(*path))
                .cloned()
                .collect::<HashSet<_>>()
        });
        self.exempt.store(Arc::new(exempt));
    }

    /// Number of recorded paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.missing.load().len()
    }

    /// True if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missing.load().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_record_and_contains() {
        let cache = NegativeCache::new();

        assert!(!cache.contains("missing"));
        assert!(cache.record("missing"));
        assert!(cache.contains("missing"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_record_is_idempotent() {
        let cache = NegativeCache::new();

        cache.record("missing");
        cache.record("missing");

        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_resets_when_capacity_reached() {
        let cache = NegativeCache::new();
        for i in 0..MAX_MISSING_PATHS {
            cache.record(&format!("p{i}"));
        }
        assert_eq!(cache.len(), MAX_MISSING_PATHS);

        cache.record("one-more");

        assert_eq!(cache.len(), 1);
        assert!(cache.contains("one-more"));
        assert!(!cache.contains("p0"));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let cache = NegativeCache::with_capacity(10);
        for i in 0..95 {
            cache.record(&format!("p{i}"));
            assert!(cache.len() <= 10);
        }
    }

    #[test]
    fn test_exempt_paths_are_not_recorded() {
        let cache = NegativeCache::new();
        cache.record("about");
        cache.record("other");

        cache.set_exempt(["about".to_owned()]);

        assert!(!cache.contains("about"));
        assert!(cache.contains("other"));
        assert!(!cache.record("about"));
        assert!(!cache.contains("about"));
    }

    #[test]
    fn test_concurrent_records_stay_bounded() {
        let cache = Arc::new(NegativeCache::with_capacity(50));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..200 {
                        cache.record(&format!("t{t}-{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 50);
        assert!(!cache.is_empty());
    }
}
