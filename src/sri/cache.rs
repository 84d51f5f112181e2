//! Per-invocation digest cache.
//!
//! Keyed by the resolved filesystem path, so two references that land on the
//! same file share one entry. The cache never outlives the pipeline that owns
//! it, so every invocation starts empty.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// Hit/miss counters for one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// Resolved path → composed integrity value (`sha384-...`).
#[derive(Debug, Default)]
pub struct DigestCache {
    entries: FxHashMap<PathBuf, String>,
    stats: CacheStats,
}

impl DigestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a path, counting the hit or miss.
    pub fn get(&mut self, path: &Path) -> Option<&str> {
        match self.entries.get(path) {
            Some(value) => {
                self.stats.hits += 1;
                Some(value.as_str())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, path: PathBuf, integrity: String) {
        self.entries.insert(path, integrity);
    }

    pub const fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_get_insert() {
        let mut cache = DigestCache::new();
        let path = PathBuf::from("/site/app.js");

        assert_eq!(cache.get(&path), None);
        cache.insert(path.clone(), "sha256-abc".into());
        assert_eq!(cache.get(&path), Some("sha256-abc"));

        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_cache_keyed_by_exact_path() {
        let mut cache = DigestCache::new();
        cache.insert(PathBuf::from("/a.css"), "sha384-a".into());
        cache.insert(PathBuf::from("/b.css"), "sha384-b".into());

        assert_eq!(cache.get(Path::new("/b.css")), Some("sha384-b"));
        assert_eq!(cache.get(Path::new("/c.css")), None);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }
}
