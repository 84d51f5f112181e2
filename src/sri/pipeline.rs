//! Pipeline adapter: accepts documents one at a time and forwards them.
//!
//! One `SriPipeline` is one invocation. The digest cache lives inside it and
//! starts empty, so nothing survives from a previous run.

use std::path::PathBuf;
use thiserror::Error;

use super::cache::CacheStats;
use super::document::{Contents, Document, ParsedCache};
use super::integrity::IntegrityComputer;
use super::transform::{TransformReport, transform};
use crate::config::{ConfigError, SriConfig, SriOptions};

/// Errors surfaced to the caller of the pipeline.
#[derive(Debug, Error)]
pub enum SriError {
    #[error("Streams are not supported! ({})", .path.display())]
    StreamUnsupported { path: PathBuf },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A document after it went through the pipeline.
#[derive(Debug)]
pub struct Processed {
    pub document: Document,
    pub report: TransformReport,
}

/// Per-invocation pipeline state.
#[derive(Debug)]
pub struct SriPipeline {
    config: SriConfig,
    computer: IntegrityComputer,
    parsed: Option<ParsedCache>,
    totals: TransformReport,
    documents: usize,
}

impl SriPipeline {
    pub fn new(config: SriConfig) -> Self {
        let computer = IntegrityComputer::new(config.algorithm);
        let parsed = config.cache_parsed.then(ParsedCache::new);
        Self {
            config,
            computer,
            parsed,
            totals: TransformReport::default(),
            documents: 0,
        }
    }

    /// Validate raw options and build a pipeline.
    ///
    /// An unsupported algorithm or selector fails here, before any document.
    pub fn from_options(options: &SriOptions) -> Result<Self, SriError> {
        Ok(Self::new(SriConfig::new(options)?))
    }

    pub const fn config(&self) -> &SriConfig {
        &self.config
    }

    /// Process one document.
    ///
    /// Streams are rejected without touching any state; empty documents pass
    /// through as-is; buffers go through the transformer.
    pub fn process(&mut self, mut document: Document) -> Result<Processed, SriError> {
        let report = match document.contents() {
            Contents::Stream(_) => {
                return Err(SriError::StreamUnsupported {
                    path: document.path().to_path_buf(),
                });
            }
            Contents::Empty => TransformReport::default(),
            Contents::Buffer(_) => transform(
                &mut document,
                &self.config,
                &mut self.computer,
                self.parsed.as_mut(),
            ),
        };

        self.documents += 1;
        self.totals += report;
        Ok(Processed { document, report })
    }

    /// Drop whatever the side table still holds for a finished document.
    pub fn release(&mut self, document: &Document) {
        if let Some(parsed) = &mut self.parsed {
            parsed.remove(document.id());
        }
    }

    /// Digest cache statistics for this invocation.
    pub const fn stats(&self) -> CacheStats {
        self.computer.stats()
    }

    /// Accumulated counts over every processed document.
    pub const fn totals(&self) -> TransformReport {
        self.totals
    }

    /// Number of documents forwarded so far.
    pub const fn documents(&self) -> usize {
        self.documents
    }

    #[cfg(test)]
    pub(crate) const fn parsed_cache(&self) -> Option<&ParsedCache> {
        self.parsed.as_ref()
    }
}

// =============================================================================
// Tests
// =============================================================================
