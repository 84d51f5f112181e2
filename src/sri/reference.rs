//! Reference extraction: from a candidate element to a root-relative local path.

use regex::Regex;
use std::sync::LazyLock;

use super::markup::Element;

/// Optional scheme followed by `//` (`https://cdn`, `//cdn`, `ftp://...`).
static REMOTE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.\-]*:)?//").expect("remote url pattern is valid")
});

/// Element kinds that reference an external resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `<script src>`
    Script,
    /// `<link href>` and anything else addressed by `href`
    Link,
}

impl ReferenceKind {
    /// Classify an element by its (lowercase) tag name.
    #[inline]
    pub fn of(tag: &str) -> Self {
        if tag == "script" { Self::Script } else { Self::Link }
    }

    /// Attribute holding the reference for this kind.
    #[inline]
    pub const fn attr(self) -> &'static str {
        match self {
            Self::Script => "src",
            Self::Link => "href",
        }
    }
}

/// Resolve the element's reference to a local, root-relative path.
///
/// Returns `None` when the element should be left alone: no reference, an
/// empty one, or a remote URL.
pub fn resolve_reference(element: &Element, prefix: &str) -> Option<String> {
    let kind = ReferenceKind::of(element.name());
    resolve_value(element.attr(kind.attr())?, prefix)
}

/// Resolve a raw (entity-decoded) reference string.
///
/// ```ignore
/// assert_eq!(resolve_value("css/a.css?v=2", ""), Some("/css/a.css".into()));
/// assert_eq!(resolve_value("https://cdn.example/a.js", ""), None);
/// ```
pub fn resolve_value(raw: &str, prefix: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }

    let reference = if prefix.is_empty() {
        raw
    } else {
        raw.strip_prefix(prefix).unwrap_or(raw)
    };

    // Remote resources cannot be hashed from the local filesystem
    if REMOTE_URL.is_match(reference) {
        return None;
    }

    let path = strip_query_and_fragment(reference);
    if path.starts_with('/') {
        Some(path.to_string())
    } else {
        Some(format!("/{path}"))
    }
}

/// Drop everything from the first `?` or `#`.
#[inline]
fn strip_query_and_fragment(reference: &str) -> &str {
    reference
        .find(['?', '#'])
        .map_or(reference, |pos| &reference[..pos])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sri::markup::Markup;

    fn first(html: &str) -> Element {
        Markup::parse(html.to_string()).elements()[0].clone()
    }

    #[test]
    fn test_kind_dispatch() {
        assert_eq!(ReferenceKind::of("script"), ReferenceKind::Script);
        assert_eq!(ReferenceKind::of("link"), ReferenceKind::Link);
        assert_eq!(ReferenceKind::Script.attr(), "src");
        assert_eq!(ReferenceKind::Link.attr(), "href");
    }

    #[test]
    fn test_script_reads_src_not_href() {
        let script = first(r#"<script href="/wrong.js" src="/right.js"></script>"#);
        assert_eq!(resolve_reference(&script, ""), Some("/right.js".into()));

        let link = first(r#"<link src="/wrong.css" href="/right.css">"#);
        assert_eq!(resolve_reference(&link, ""), Some("/right.css".into()));
    }

    #[test]
    fn test_missing_or_empty_reference() {
        assert_eq!(resolve_reference(&first("<script></script>"), ""), None);
        assert_eq!(resolve_reference(&first(r#"<link href="">"#), ""), None);
        assert_eq!(resolve_reference(&first("<link href>"), ""), None);
    }

    #[test]
    fn test_makes_root_relative() {
        assert_eq!(resolve_value("css/a.css", ""), Some("/css/a.css".into()));
        assert_eq!(resolve_value("/css/a.css", ""), Some("/css/a.css".into()));
        assert_eq!(resolve_value("../shared.css", ""), Some("/../shared.css".into()));
    }

    #[test]
    fn test_strips_query_and_fragment() {
        assert_eq!(resolve_value("/a.js?v=123", ""), Some("/a.js".into()));
        assert_eq!(resolve_value("a.css#print", ""), Some("/a.css".into()));
        assert_eq!(resolve_value("a.css?x#y", ""), Some("/a.css".into()));
    }

    #[test]
    fn test_remote_urls_skipped() {
        assert_eq!(resolve_value("https://cdn.example/a.js", ""), None);
        assert_eq!(resolve_value("http://cdn.example/a.js", ""), None);
        assert_eq!(resolve_value("//cdn.example/a.js", ""), None);
        assert_eq!(resolve_value("ftp://host/a.js", ""), None);
    }

    #[test]
    fn test_prefix_stripping() {
        let prefix = "https://secure.com";
        assert_eq!(
            resolve_value("https://secure.com/css/a.css", prefix),
            Some("/css/a.css".into())
        );
        assert_eq!(resolve_value("https://other.com/a.css", prefix), None);
        // unprefixed local references still resolve
        assert_eq!(resolve_value("/b.css", prefix), Some("/b.css".into()));
    }

    #[test]
    fn test_entity_decoded_before_resolution() {
        let script = first(r#"<script src="/a.js?x=1&amp;y=2"></script>"#);
        assert_eq!(resolve_reference(&script, ""), Some("/a.js".into()));
    }
}
