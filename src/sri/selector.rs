//! Candidate selection with a CSS selector subset.
//!
//! Supported:
//! - type selectors (`link`) and the universal selector (`*`)
//! - class and id selectors: `.vendor` is `[class~=vendor]`, `#main` is `[id=main]`
//! - attribute selectors: `[a]`, `[a=v]`, `[a~=v]`, `[a|=v]`, `[a^=v]`,
//!   `[a$=v]`, `[a*=v]` with bare, single- or double-quoted values
//! - negation of a compound selector: `:not([integrity])`
//! - selector lists: `link[rel=stylesheet], script[src]`
//!
//! Combinators (`a b`, `a > b`, ...) are rejected at parse time so a bad
//! selector fails configuration instead of silently matching nothing.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::markup::Element;

/// Default candidates: stylesheets and scripts without an integrity attribute.
pub const DEFAULT_SELECTOR: &str =
    "link[href][rel=stylesheet]:not([integrity]), script[src]:not([integrity])";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("selector is empty")]
    Empty,

    #[error("unexpected `{found}` at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("unexpected end of selector, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("combinators are not supported (offset {offset})")]
    Combinator { offset: usize },

    #[error("unsupported pseudo-class `:{name}`")]
    Pseudo { name: String },
}

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    /// `~=`: one of the whitespace-separated words
    Includes,
    /// `|=`: exactly the value, or the value followed by `-`
    DashMatch,
    Prefix,
    Suffix,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatcher {
    name: String,
    test: Option<(AttrOp, String)>,
}

impl AttrMatcher {
    fn matches(&self, element: &Element) -> bool {
        let Some(actual) = element.attr(&self.name) else {
            return false;
        };
        match &self.test {
            None => true,
            Some((AttrOp::Equals, v)) => actual == v,
            Some((AttrOp::Includes, v)) => {
                !v.is_empty()
                    && !v.contains(char::is_whitespace)
                    && actual.split_ascii_whitespace().any(|word| word == v)
            }
            Some((AttrOp::DashMatch, v)) => {
                actual == v || actual.strip_prefix(v.as_str()).is_some_and(|rest| rest.starts_with('-'))
            }
            // Empty operands never match for the substring operators
            Some((AttrOp::Prefix, v)) => !v.is_empty() && actual.starts_with(v.as_str()),
            Some((AttrOp::Suffix, v)) => !v.is_empty() && actual.ends_with(v.as_str()),
            Some((AttrOp::Contains, v)) => !v.is_empty() && actual.contains(v.as_str()),
        }
    }
}

/// Tag + attribute tests + negations, all of which must hold.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    attrs: Vec<AttrMatcher>,
    not: Vec<Compound>,
}

impl Compound {
    fn matches(&self, element: &Element) -> bool {
        self.tag.as_deref().is_none_or(|t| t == element.name())
            && self.attrs.iter().all(|a| a.matches(element))
            && !self.not.iter().any(|n| n.matches(element))
    }
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    alternatives: Vec<Compound>,
}

impl SelectorList {
    /// Whether any alternative matches `element`.
    pub fn matches(&self, element: &Element) -> bool {
        self.alternatives.iter().any(|c| c.matches(element))
    }
}

impl Default for SelectorList {
    fn default() -> Self {
        // DEFAULT_SELECTOR always parses (see tests)
        DEFAULT_SELECTOR.parse().unwrap_or_else(|_| Self {
            source: DEFAULT_SELECTOR.to_string(),
            alternatives: Vec::new(),
        })
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let alternatives = Parser::new(s).parse_list()?;
        Ok(Self {
            source: s.to_string(),
            alternatives,
        })
    }
}

// =============================================================================
// Parser
// =============================================================================

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, want: char, expected: &'static str) -> Result<(), SelectorError> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(found) => Err(SelectorError::Unexpected {
                found,
                offset: self.pos - found.len_utf8(),
            }),
            None => Err(SelectorError::UnexpectedEnd { expected }),
        }
    }

    fn parse_list(&mut self) -> Result<Vec<Compound>, SelectorError> {
        let mut alternatives = Vec::new();
        loop {
            self.skip_ws();
            let start = self.pos;
            let compound = self.parse_compound()?;
            if self.pos == start {
                return match self.peek() {
                    Some(found) => Err(SelectorError::Unexpected {
                        found,
                        offset: self.pos,
                    }),
                    None => Err(SelectorError::Empty),
                };
            }
            alternatives.push(compound);

            let before_ws = self.pos;
            self.skip_ws();
            match self.peek() {
                None => return Ok(alternatives),
                Some(',') => {
                    self.bump();
                }
                Some(_) if self.pos > before_ws => {
                    return Err(SelectorError::Combinator { offset: before_ws });
                }
                Some('>' | '+' | '~') => {
                    return Err(SelectorError::Combinator { offset: self.pos });
                }
                Some(found) => {
                    return Err(SelectorError::Unexpected {
                        found,
                        offset: self.pos,
                    });
                }
            }
        }
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();

        match self.peek() {
            Some('*') => {
                self.bump();
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.ident().to_ascii_lowercase());
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('[') => {
                    self.bump();
                    compound.attrs.push(self.parse_attr()?);
                }
                Some('.') => {
                    self.bump();
                    let class = self.required_ident("a class name")?;
                    compound.attrs.push(AttrMatcher {
                        name: "class".to_string(),
                        test: Some((AttrOp::Includes, class)),
                    });
                }
                Some('#') => {
                    self.bump();
                    let id = self.required_ident("an id")?;
                    compound.attrs.push(AttrMatcher {
                        name: "id".to_string(),
                        test: Some((AttrOp::Equals, id)),
                    });
                }
                Some(':') => {
                    self.bump();
                    let name = self.ident().to_ascii_lowercase();
                    if name != "not" {
                        return Err(SelectorError::Pseudo { name });
                    }
                    self.expect('(', "`(`")?;
                    self.skip_ws();
                    let start = self.pos;
                    let inner = self.parse_compound()?;
                    if self.pos == start {
                        return match self.peek() {
                            Some(found) => Err(SelectorError::Unexpected {
                                found,
                                offset: self.pos,
                            }),
                            None => Err(SelectorError::UnexpectedEnd {
                                expected: "a selector",
                            }),
                        };
                    }
                    self.skip_ws();
                    self.expect(')', "`)`")?;
                    compound.not.push(inner);
                }
                _ => return Ok(compound),
            }
        }
    }

    /// Parse the inside of `[...]`, the opening bracket already consumed.
    fn parse_attr(&mut self) -> Result<AttrMatcher, SelectorError> {
        self.skip_ws();
        let name = self.ident().to_ascii_lowercase();
        if name.is_empty() {
            return match self.peek() {
                Some(found) => Err(SelectorError::Unexpected {
                    found,
                    offset: self.pos,
                }),
                None => Err(SelectorError::UnexpectedEnd {
                    expected: "an attribute name",
                }),
            };
        }
        self.skip_ws();

        let op = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(AttrMatcher { name, test: None });
            }
            Some('=') => AttrOp::Equals,
            Some('~') => AttrOp::Includes,
            Some('|') => AttrOp::DashMatch,
            Some('^') => AttrOp::Prefix,
            Some('$') => AttrOp::Suffix,
            Some('*') => AttrOp::Contains,
            Some(found) => {
                return Err(SelectorError::Unexpected {
                    found,
                    offset: self.pos,
                });
            }
            None => return Err(SelectorError::UnexpectedEnd { expected: "`]`" }),
        };
        self.bump();
        if op != AttrOp::Equals {
            self.expect('=', "`=`")?;
        }
        self.skip_ws();

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                loop {
                    match self.bump() {
                        Some(c) if c == quote => break,
                        Some(_) => {}
                        None => {
                            return Err(SelectorError::UnexpectedEnd {
                                expected: "closing quote",
                            });
                        }
                    }
                }
                self.input[start..self.pos - 1].to_string()
            }
            _ => self.bare_value().to_string(),
        };
        self.skip_ws();
        self.expect(']', "`]`")?;

        Ok(AttrMatcher {
            name,
            test: Some((op, value)),
        })
    }

    fn ident(&mut self) -> &'a str {
        self.take_while(is_ident_char)
    }

    /// Identifier after `.` or `#`; class and id values keep their case.
    fn required_ident(&mut self, expected: &'static str) -> Result<String, SelectorError> {
        let ident = self.ident();
        if !ident.is_empty() {
            return Ok(ident.to_string());
        }
        match self.peek() {
            Some(found) => Err(SelectorError::Unexpected {
                found,
                offset: self.pos,
            }),
            None => Err(SelectorError::UnexpectedEnd { expected }),
        }
    }

    /// Unquoted attribute value: anything up to `]` or whitespace.
    fn bare_value(&mut self) -> &'a str {
        self.take_while(|c| c != ']' && !c.is_whitespace() && c != '"' && c != '\'')
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.input[start..self.pos]
    }
}

#[inline]
fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_') || !c.is_ascii()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sri::markup::Markup;

    fn elements(html: &str) -> Vec<Element> {
        Markup::parse(html.to_string()).elements().to_vec()
    }

    fn count(selector: &str, html: &str) -> usize {
        let list: SelectorList = selector.parse().unwrap();
        elements(html).iter().filter(|e| list.matches(e)).count()
    }

    const PAGE: &str = r#"<html><head>
<link rel="stylesheet" href="/a.css">
<link rel="stylesheet" href="/b.css" integrity="sha384-x">
<link rel="icon" href="/favicon.ico">
<link rel="stylesheet" href="https://secure.com/c.css">
<script src="/app.js"></script>
<script>inline()</script>
</head></html>"#;

    #[test]
    fn test_default_selector() {
        assert_eq!(count(DEFAULT_SELECTOR, PAGE), 3);
        assert_eq!(SelectorList::default().to_string(), DEFAULT_SELECTOR);
        let list = SelectorList::default();
        assert_eq!(elements(PAGE).iter().filter(|e| list.matches(e)).count(), 3);
    }

    #[test]
    fn test_type_and_universal() {
        assert_eq!(count("script", PAGE), 2);
        assert_eq!(count("LINK", PAGE), 4);
        assert_eq!(count("*[integrity]", PAGE), 1);
        assert_eq!(count("[integrity]", PAGE), 1);
        assert_eq!(count("*", "<p><b>x</b></p>"), 2);
    }

    #[test]
    fn test_attribute_operators() {
        assert_eq!(count(r#"link[href^="https://secure"]"#, PAGE), 1);
        assert_eq!(count("link[href$='.css']", PAGE), 3);
        assert_eq!(count("[href*=favicon]", PAGE), 1);
        assert_eq!(count("link[rel=icon]", PAGE), 1);
        assert_eq!(count(r#"link[href^=""]"#, PAGE), 0);
    }

    #[test]
    fn test_not() {
        assert_eq!(count("link:not([rel=stylesheet])", PAGE), 1);
        assert_eq!(count("script:not([src])", PAGE), 1);
    }

    #[test]
    fn test_selector_list_whitespace() {
        assert_eq!(count("  script[src] ,link[rel=icon]  ", PAGE), 2);
    }

    #[test]
    fn test_reject_combinators() {
        assert!(matches!(
            "head link".parse::<SelectorList>(),
            Err(SelectorError::Combinator { offset: 4 })
        ));
        assert!(matches!(
            "head>link".parse::<SelectorList>(),
            Err(SelectorError::Combinator { .. })
        ));
    }

    #[test]
    fn test_reject_malformed() {
        assert_eq!("".parse::<SelectorList>(), Err(SelectorError::Empty));
        assert!("link,".parse::<SelectorList>().is_err());
        assert!("link[href".parse::<SelectorList>().is_err());
        assert!("link[href='x]".parse::<SelectorList>().is_err());
        assert!("link:not()".parse::<SelectorList>().is_err());
        assert!(matches!(
            "a:hover".parse::<SelectorList>(),
            Err(SelectorError::Pseudo { ref name }) if name == "hover"
        ));
        assert!(".".parse::<SelectorList>().is_err());
        assert!("script#".parse::<SelectorList>().is_err());
        assert!("link[rel~stylesheet]".parse::<SelectorList>().is_err());
        assert!("head~link".parse::<SelectorList>().is_err());
    }

    const TAGGED: &str = r#"<script src="/a.js" class="vendor  async"></script>
<script src="/b.js" class="vendors"></script>
<script src="/c.js" id="main" class="Vendor"></script>
<link rel="stylesheet" href="/d.css" hreflang="en-US">
<link rel="stylesheet" href="/e.css" hreflang="en">
<link rel="stylesheet" href="/f.css" hreflang="english">"#;

    #[test]
    fn test_class_and_id() {
        assert_eq!(count(".vendor", TAGGED), 1);
        assert_eq!(count("script.vendor.async", TAGGED), 1);
        assert_eq!(count(".Vendor", TAGGED), 1);
        assert_eq!(count("#main", TAGGED), 1);
        assert_eq!(count("script#main.Vendor", TAGGED), 1);
        assert_eq!(count("script:not(.vendor)", TAGGED), 2);
        assert_eq!(count("link.vendor", TAGGED), 0);
    }

    #[test]
    fn test_includes_and_dash_match() {
        assert_eq!(count("[class~=async]", TAGGED), 1);
        assert_eq!(count("[class~='vendor async']", TAGGED), 0);
        assert_eq!(count("[class~='']", TAGGED), 0);
        assert_eq!(count("link[hreflang|=en]", TAGGED), 2);
        assert_eq!(count("link[hreflang|='en-US']", TAGGED), 1);
    }
}
