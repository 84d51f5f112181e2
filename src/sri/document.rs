//! Document content model and the parsed-markup side table.

use rustc_hash::FxHashMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::markup::Markup;
use crate::utils::hash;

/// Process-unique document identity, used as the side table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Content payload of a document.
pub enum Contents {
    /// No payload (directory placeholder, missing file). Passed through.
    Empty,
    /// Fully buffered bytes. Processed.
    Buffer(Vec<u8>),
    /// Live, unbuffered stream. Rejected.
    Stream(Box<dyn Read + Send>),
}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Buffer(bytes) => write!(f, "Buffer({} bytes)", bytes.len()),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// A document travelling through the pipeline.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    /// Absolute location on disk.
    path: PathBuf,
    /// Root directory for base-relative resolution.
    base: PathBuf,
    contents: Contents,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, base: impl Into<PathBuf>, contents: Contents) -> Self {
        Self {
            id: DocumentId::next(),
            path: path.into(),
            base: base.into(),
            contents,
        }
    }

    pub fn buffered(path: impl Into<PathBuf>, base: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self::new(path, base, Contents::Buffer(bytes))
    }

    pub fn empty(path: impl Into<PathBuf>, base: impl Into<PathBuf>) -> Self {
        Self::new(path, base, Contents::Empty)
    }

    pub fn stream(
        path: impl Into<PathBuf>,
        base: impl Into<PathBuf>,
        reader: impl Read + Send + 'static,
    ) -> Self {
        Self::new(path, base, Contents::Stream(Box::new(reader)))
    }

    pub const fn id(&self) -> DocumentId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub const fn contents(&self) -> &Contents {
        &self.contents
    }

    /// Buffered bytes, if any.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.contents {
            Contents::Buffer(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) const fn is_stream(&self) -> bool {
        matches!(self.contents, Contents::Stream(_))
    }

    #[cfg(test)]
    pub(crate) const fn is_empty(&self) -> bool {
        matches!(self.contents, Contents::Empty)
    }

    /// Replace the payload with new buffered bytes.
    pub fn set_bytes(&mut self, bytes: Vec<u8>) {
        self.contents = Contents::Buffer(bytes);
    }
}

// =============================================================================
// Parsed side table
// =============================================================================

#[derive(Debug)]
struct ParsedEntry {
    fingerprint: u64,
    markup: Markup,
}

/// Parsed markup remembered per document, so several stages touching the
/// same in-memory document parse it once.
///
/// An entry is only reused while the document's bytes still match the
/// fingerprint taken when it was parsed.
#[derive(Debug, Default)]
pub struct ParsedCache {
    entries: FxHashMap<DocumentId, ParsedEntry>,
}

impl ParsedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached parse of `source` for `id`, parsing on a miss.
    pub fn get_or_parse(&mut self, id: DocumentId, source: &str) -> &Markup {
        let fingerprint = hash::compute(source);
        let entry = self
            .entries
            .entry(id)
            .and_modify(|entry| {
                if entry.fingerprint != fingerprint {
                    *entry = ParsedEntry {
                        fingerprint,
                        markup: Markup::parse(source.to_owned()),
                    };
                }
            })
            .or_insert_with(|| ParsedEntry {
                fingerprint,
                markup: Markup::parse(source.to_owned()),
            });
        &entry.markup
    }

    /// Whether a current parse exists for `id` with these bytes.
    #[cfg(test)]
    pub(crate) fn is_current(&self, id: DocumentId, source: &str) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|entry| entry.fingerprint == hash::compute(source))
    }

    pub fn remove(&mut self, id: DocumentId) {
        self.entries.remove(&id);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
