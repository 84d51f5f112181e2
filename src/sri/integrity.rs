//! Integrity value computation backed by the per-invocation digest cache.

use std::fs;
use std::io;
use std::path::Path;

use super::algorithm::Algorithm;
use super::cache::{CacheStats, DigestCache};

/// Hashes files under one algorithm, reading each path at most once.
#[derive(Debug)]
pub struct IntegrityComputer {
    algorithm: Algorithm,
    cache: DigestCache,
}

impl IntegrityComputer {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            cache: DigestCache::new(),
        }
    }

    /// Integrity value for the file at `path`, e.g. `sha384-oqVu...`.
    ///
    /// A cache hit performs no I/O. Read failures are returned to the caller
    /// and are not cached, so the error repeats for later references.
    pub fn hash_for(&mut self, path: &Path) -> io::Result<String> {
        if let Some(cached) = self.cache.get(path) {
            return Ok(cached.to_string());
        }

        let content = fs::read(path)?;
        let integrity = self.algorithm.integrity(&content);
        self.cache.insert(path.to_path_buf(), integrity.clone());
        Ok(integrity)
    }

    pub const fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
