//! Turning command-line paths into documents.

use anyhow::{Context, Result};
use jwalk::WalkDir;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::sri::Document;
use crate::utils::path::absolutize;

const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// One input document and the root it resolves references against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Absolute document path.
    pub path: PathBuf,
    /// Absolute base directory.
    pub base: PathBuf,
}

impl Source {
    /// Read the document from disk.
    ///
    /// - regular file: buffered
    /// - missing path or directory: empty
    /// - anything else (pipe, device): an unbuffered stream
    pub fn load(&self) -> Result<Document> {
        let Ok(meta) = fs::metadata(&self.path) else {
            return Ok(Document::empty(&self.path, &self.base));
        };
        if meta.is_dir() {
            return Ok(Document::empty(&self.path, &self.base));
        }
        if !meta.is_file() {
            let reader = DeferredFile {
                path: self.path.clone(),
                file: None,
            };
            return Ok(Document::stream(&self.path, &self.base, reader));
        }
        let bytes = fs::read(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        Ok(Document::buffered(&self.path, &self.base, bytes))
    }

    /// Path relative to the base, for mirroring into an output directory.
    pub fn relative_path(&self) -> &Path {
        self.path
            .strip_prefix(&self.base)
            .ok()
            .or_else(|| self.path.file_name().map(Path::new))
            .unwrap_or(self.path.as_path())
    }
}

/// Reader that opens its file on first read, so a pipe without a writer
/// does not block while the document is only being classified.
struct DeferredFile {
    path: PathBuf,
    file: Option<File>,
}

impl Read for DeferredFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.file.is_none() {
            self.file = Some(File::open(&self.path)?);
        }
        self.file.as_mut().map_or(Ok(0), |file| file.read(buf))
    }
}

/// Whether the file has an HTML extension (case-insensitive).
pub fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| HTML_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Collect HTML files under a directory, sorted.
pub fn collect_html_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| is_html(p))
        .collect();
    files.sort();
    files
}

/// Expand command-line paths into sources.
///
/// - directory: every HTML file below it, based on the directory
/// - file: itself, based on its parent
/// - missing: passed through as an empty document
///
/// An explicit `base` overrides the per-argument default.
pub fn collect_sources(paths: &[PathBuf], base: Option<&Path>) -> Vec<Source> {
    let base = base.map(absolutize);
    let mut sources = Vec::new();

    for path in paths {
        let path = absolutize(path);
        if path.is_dir() {
            let root = base.clone().unwrap_or_else(|| path.clone());
            sources.extend(collect_html_files(&path).into_iter().map(|file| Source {
                path: file,
                base: root.clone(),
            }));
        } else {
            let root = base.clone().unwrap_or_else(|| {
                path.parent()
                    .map_or_else(|| PathBuf::from("/"), Path::to_path_buf)
            });
            sources.push(Source { path, base: root });
        }
    }

    sources
}
