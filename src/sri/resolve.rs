//! Filesystem resolution of root-relative local paths.

use std::path::{Path, PathBuf};

use super::document::Document;
use crate::utils::path::normalize_lexically;

/// Which directory a local path is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// Against the document's configured base directory (project root).
    #[default]
    Base,
    /// Against the directory containing the document itself.
    Document,
}

impl Resolution {
    #[inline]
    pub const fn from_relative(relative: bool) -> Self {
        if relative { Self::Document } else { Self::Base }
    }
}

/// Produce the absolute path to hash for `local_path`.
///
/// No existence check happens here; a missing file surfaces when it is read.
pub fn resolve_filesystem_path(
    document: &Document,
    local_path: &str,
    resolution: Resolution,
) -> PathBuf {
    let root = match resolution {
        Resolution::Base => document.base(),
        Resolution::Document => document.path().parent().unwrap_or(Path::new("/")),
    };
    join_local(root, local_path)
}

/// Join a root-relative local path onto `root` and normalize.
///
/// The leading separator is stripped first, otherwise `Path::join` would
/// discard `root` entirely.
pub fn join_local(root: &Path, local_path: &str) -> PathBuf {
    normalize_lexically(&root.join(local_path.trim_start_matches('/')))
}
