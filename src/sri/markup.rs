//! Queryable markup with byte-preserving attribute edits.
//!
//! `tl` locates every element in the source. Each element's opening tag is then
//! lexed in place so attribute names and values keep their exact byte spans.
//! Edits are spliced into the original text, leaving everything outside the
//! touched attributes untouched (entity choices, whitespace, comments, casing).
//!
//! ```text
//! <link rel="stylesheet" href="/a.css">
//! ^     ^   ^            ^    ^       ^
//! |     |   value span   |    value   insert_at (new attributes go here)
//! |     name span        name span
//! tag start
//! ```

use std::ops::Range;

use crate::utils::html::{escape_attr, unescape};

// =============================================================================
// Types
// =============================================================================

/// One attribute of an opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased attribute name.
    name: String,
    /// Entity-decoded value. `None` for bare attributes (`<script async>`).
    value: Option<String>,
    /// End of the attribute name in the source.
    name_end: usize,
    /// Raw value span in the source (inside quotes when quoted).
    value_span: Option<ValueSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ValueSpan {
    range: Range<usize>,
    quoted: bool,
}

impl Attribute {
    /// Decoded value; bare attributes read as the empty string.
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

/// An element located in the source, described by its opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name.
    name: String,
    attrs: Vec<Attribute>,
    /// Opening tag span, from `<` up to and including `>`.
    span: Range<usize>,
    /// Where new attributes are inserted (after the last existing one).
    insert_at: usize,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First attribute with this (lowercase) name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name == name)
    }

    /// Decoded value of an attribute, `Some("")` for bare attributes.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attribute(name).map(Attribute::value)
    }

}

/// Parsed markup: the owned source plus every element in document order.
#[derive(Debug, Clone)]
pub struct Markup {
    source: String,
    elements: Vec<Element>,
}

impl Markup {
    /// Parse HTML source.
    ///
    /// Never fails: markup `tl` cannot parse yields no elements, which leaves
    /// the document untouched downstream.
    pub fn parse(source: String) -> Self {
        let elements = locate_elements(&source);
        Self { source, elements }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Start an edit batch against this markup.
    pub fn edit(&self) -> MarkupEdit<'_> {
        MarkupEdit {
            markup: self,
            splices: Vec::new(),
        }
    }
}

/// Elements whose content is text, not markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

fn locate_elements(source: &str) -> Vec<Element> {
    let Ok(dom) = tl::parse(source, tl::ParserOptions::default()) else {
        return Vec::new();
    };
    let parser = dom.parser();

    let mut starts: Vec<usize> = dom
        .nodes()
        .iter()
        .filter_map(tl::Node::as_tag)
        .map(|tag| tag.boundaries(parser).0)
        .collect();
    starts.sort_unstable();
    starts.dedup();

    // `tl` reports tag-like text inside raw text elements as tags
    let mut raw_text_end = 0;
    let mut elements = Vec::with_capacity(starts.len());
    for start in starts {
        if start < raw_text_end {
            continue;
        }
        let Some(element) = lex_open_tag(source, start) else {
            continue;
        };
        if RAW_TEXT_ELEMENTS.contains(&element.name.as_str()) {
            raw_text_end = find_close_tag(source, element.span.end, &element.name);
        }
        elements.push(element);
    }
    elements
}

/// Offset of the `</name` closing the raw text starting at `from`, or the end
/// of the source when it is never closed.
fn find_close_tag(source: &str, from: usize, name: &str) -> usize {
    let needle = format!("</{name}");
    let rest = source[from..].to_ascii_lowercase();
    rest.match_indices(&needle)
        .map(|(i, _)| i)
        .find(|&i| {
            rest.as_bytes()
                .get(i + needle.len())
                .is_none_or(|&b| is_tag_delim(b))
        })
        .map_or(source.len(), |i| from + i)
}

// =============================================================================
// Opening tag lexer
// =============================================================================

/// Lex the opening tag beginning at `start` (which must point at `<`).
fn lex_open_tag(source: &str, start: usize) -> Option<Element> {
    let bytes = source.as_bytes();
    if bytes.get(start) != Some(&b'<') {
        return None;
    }

    let mut pos = start + 1;
    let name_start = pos;
    while pos < bytes.len() && !is_tag_delim(bytes[pos]) {
        pos += 1;
    }
    if pos == name_start {
        return None;
    }
    let name = source[name_start..pos].to_ascii_lowercase();
    let mut insert_at = pos;
    let mut attrs = Vec::new();

    loop {
        // Skip whitespace and stray slashes (`<br/>`, `<a / b>`)
        while pos < bytes.len() && (bytes[pos].is_ascii_whitespace() || bytes[pos] == b'/') {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }
        if bytes[pos] == b'>' {
            pos += 1;
            break;
        }

        // Read attribute name
        let attr_start = pos;
        while pos < bytes.len() && !is_tag_delim(bytes[pos]) && bytes[pos] != b'=' {
            pos += 1;
        }
        // A lone `=` with no name: consume it so the loop makes progress
        if pos == attr_start {
            pos += 1;
            continue;
        }
        let name_end = pos;
        let attr_name = source[attr_start..name_end].to_ascii_lowercase();

        // Look ahead for `=` across whitespace
        let mut look = pos;
        while look < bytes.len() && bytes[look].is_ascii_whitespace() {
            look += 1;
        }

        let mut value_span = None;
        if bytes.get(look) == Some(&b'=') {
            pos = look + 1;
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }

            match bytes.get(pos) {
                Some(&quote @ (b'"' | b'\'')) => {
                    let value_start = pos + 1;
                    let value_end = source[value_start..]
                        .find(quote as char)
                        .map_or(bytes.len(), |i| value_start + i);
                    value_span = Some(ValueSpan {
                        range: value_start..value_end,
                        quoted: true,
                    });
                    pos = (value_end + 1).min(bytes.len());
                }
                Some(_) => {
                    let value_start = pos;
                    while pos < bytes.len()
                        && !bytes[pos].is_ascii_whitespace()
                        && bytes[pos] != b'>'
                    {
                        pos += 1;
                    }
                    value_span = Some(ValueSpan {
                        range: value_start..pos,
                        quoted: false,
                    });
                }
                None => {}
            }
        }

        let value = value_span
            .as_ref()
            .map(|span| unescape(&source[span.range.clone()]).into_owned());
        attrs.push(Attribute {
            name: attr_name,
            value,
            name_end,
            value_span,
        });
        insert_at = pos;
    }

    Some(Element {
        name,
        attrs,
        span: start..pos,
        insert_at,
    })
}

#[inline]
const fn is_tag_delim(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'>' || b == b'/'
}

// =============================================================================
// Edits
// =============================================================================

/// A replacement of `range` in the source with `text`.
#[derive(Debug)]
struct Splice {
    range: Range<usize>,
    text: String,
    /// New attribute; sorts after edits of an existing one at the same offset.
    append: bool,
}

/// Pending attribute writes against one `Markup`.
///
/// Writes are collected first and rendered in one forward pass, so several
/// writes to the same element compose in the order they were made.
pub struct MarkupEdit<'a> {
    markup: &'a Markup,
    splices: Vec<Splice>,
}

impl MarkupEdit<'_> {
    /// Set `name` to `value` on `element`, overwriting the first existing
    /// occurrence or appending a new double-quoted attribute.
    pub fn set_attr(&mut self, element: &Element, name: &str, value: &str) {
        let escaped = escape_attr(value);
        let splice = match element.attribute(name) {
            Some(Attribute {
                value_span: Some(span),
                ..
            }) if span.quoted => Splice {
                range: span.range.clone(),
                text: escaped.into_owned(),
                append: false,
            },
            Some(Attribute {
                value_span: Some(span),
                ..
            }) => Splice {
                range: span.range.clone(),
                text: format!("\"{escaped}\""),
                append: false,
            },
            Some(attr) => Splice {
                range: attr.name_end..attr.name_end,
                text: format!("=\"{escaped}\""),
                append: false,
            },
            None => Splice {
                range: element.insert_at..element.insert_at,
                text: format!(" {name}=\"{escaped}\""),
                append: true,
            },
        };
        self.splices.push(splice);
    }

    /// Render the edited source.
    pub fn render(mut self) -> String {
        let source = self.markup.source();
        // Stable sort keeps same-position appends in write order
        self.splices.sort_by_key(|s| (s.range.start, s.append));

        let extra: usize = self.splices.iter().map(|s| s.text.len()).sum();
        let mut out = String::with_capacity(source.len() + extra);
        let mut cursor = 0;
        for splice in &self.splices {
            out.push_str(&source[cursor..splice.range.start]);
            out.push_str(&splice.text);
            cursor = splice.range.end;
        }
        out.push_str(&source[cursor..]);
        out
    }
}

// =============================================================================
// Tests
// =============================================================================
