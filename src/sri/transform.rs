//! Document transformer: selector → reference → file → integrity attribute.
//!
//! ```text
//! ┌────────────┐   ┌───────────┐   ┌─────────┐   ┌────────────┐
//! │  selector  │──>│ reference │──>│ resolve │──>│ integrity  │──> edit
//! │  (markup)  │   │ (local)   │   │ (fs)    │   │ (cache)    │
//! └────────────┘   └───────────┘   └─────────┘   └────────────┘
//! ```
//!
//! Failures below the selector never escape: a node without a usable
//! reference, or whose file cannot be read, is simply left as it was.

use std::ops::AddAssign;

use super::document::{Document, ParsedCache};
use super::integrity::IntegrityComputer;
use super::markup::{Element, Markup};
use super::reference::resolve_reference;
use super::resolve::resolve_filesystem_path;
use crate::config::SriConfig;
use crate::debug;

/// The only `crossorigin` value left as found.
const USE_CREDENTIALS: &str = "use-credentials";
const ANONYMOUS: &str = "anonymous";

/// Per-document (or accumulated) transformation counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    /// Elements matched by the selector.
    pub candidates: usize,
    /// Elements that received an integrity attribute.
    pub updated: usize,
    /// Candidates without a local reference (missing, empty, remote).
    pub unresolved: usize,
    /// Candidates whose file could not be read.
    pub unreadable: usize,
}

impl TransformReport {
    /// Whether the document's payload was replaced.
    pub const fn changed(&self) -> bool {
        self.updated > 0
    }
}

impl AddAssign for TransformReport {
    fn add_assign(&mut self, rhs: Self) {
        self.candidates += rhs.candidates;
        self.updated += rhs.updated;
        self.unresolved += rhs.unresolved;
        self.unreadable += rhs.unreadable;
    }
}

/// Inject integrity attributes into a buffered document.
///
/// The payload is replaced only if at least one element was updated; in every
/// other case the original bytes are kept as-is. Non-buffered and non-UTF-8
/// documents are returned untouched.
///
/// With a side table, an unchanged document keeps its parse for later passes;
/// a rewritten one has its now stale entry dropped.
pub fn transform(
    document: &mut Document,
    config: &SriConfig,
    computer: &mut IntegrityComputer,
    mut parsed: Option<&mut ParsedCache>,
) -> TransformReport {
    let mut report = TransformReport::default();

    let Some(bytes) = document.bytes() else {
        return report;
    };
    let Ok(source) = std::str::from_utf8(bytes) else {
        debug!("sri"; "skipped non utf-8 document {}", document.path().display());
        return report;
    };

    let fresh;
    let markup: &Markup = match parsed.as_deref_mut() {
        Some(cache) => cache.get_or_parse(document.id(), source),
        None => {
            fresh = Markup::parse(source.to_owned());
            &fresh
        }
    };

    let candidates: Vec<&Element> = markup
        .elements()
        .iter()
        .filter(|element| config.selector.matches(element))
        .collect();
    report.candidates = candidates.len();
    if candidates.is_empty() {
        return report;
    }

    let mut edit = markup.edit();
    for element in candidates {
        let Some(local_path) = resolve_reference(element, &config.prefix) else {
            report.unresolved += 1;
            continue;
        };

        let path = resolve_filesystem_path(document, &local_path, config.resolution);
        let integrity = match computer.hash_for(&path) {
            Ok(integrity) => integrity,
            Err(err) => {
                debug!("sri"; "{}: cannot hash {}: {}", document.path().display(), path.display(), err);
                report.unreadable += 1;
                continue;
            }
        };

        edit.set_attr(element, "integrity", &integrity);
        match element.attr("crossorigin") {
            Some(USE_CREDENTIALS | ANONYMOUS) => {}
            _ => edit.set_attr(element, "crossorigin", ANONYMOUS),
        }
        report.updated += 1;
    }

    if report.changed() {
        let html = edit.render();
        document.set_bytes(html.into_bytes());
        if let Some(cache) = parsed {
            cache.remove(document.id());
        }
    }
    report
}

// =============================================================================
// Tests
// =============================================================================
