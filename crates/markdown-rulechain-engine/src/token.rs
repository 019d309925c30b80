//! # Tokens
//!
//! The flat output unit of every parser stage. Block rules produce a sequence
//! of block tokens; the inline parser fills the `children` of each token of
//! kind `"inline"`; the renderer walks both.
//!
//! ## Key Invariants
//!
//! - Every opening token at level N is matched by one closing token at level
//!   N, conventionally with the same `tag`.
//! - Attribute names are unique within one token.
//! - Only `"inline"` tokens carry children.

use crate::env::Extensions;
use crate::span::LineSpan;

/// Tag nesting of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    /// `<tag>`, raises the level.
    Opening,
    /// `<tag/>` or a leaf such as text.
    SelfClosing,
    /// `</tag>`, lowers the level.
    Closing,
}

#[derive(Debug)]
pub struct Token {
    /// Token type, e.g. `"paragraph_open"`.
    pub kind: String,
    /// HTML tag name, e.g. `"p"`.
    pub tag: String,
    /// Ordered `(name, value)` pairs.
    pub attrs: Vec<(String, String)>,
    /// Source lines this token was parsed from.
    pub map: Option<LineSpan>,
    pub nesting: Nesting,
    /// Nesting depth, maintained by the parsers.
    pub level: usize,
    /// Inline children, only on `"inline"` tokens.
    pub children: Vec<Token>,
    /// Text payload of leaf tokens.
    pub content: String,
    /// Literal syntax marker, e.g. `*` or a fence string.
    pub markup: String,
    /// Per-type extra data: fence info string, ordered list number, link kind.
    pub info: String,
    /// Plugin-owned data, opaque to the core.
    pub meta: Extensions,
    /// Block-level token; affects newline insertion in the renderer.
    pub block: bool,
    /// Skip when rendering (tight list paragraphs).
    pub hidden: bool,
}

impl Token {
    pub fn new(kind: impl Into<String>, tag: impl Into<String>, nesting: Nesting) -> Self {
        Self {
            kind: kind.into(),
            tag: tag.into(),
            attrs: Vec::new(),
            map: None,
            nesting,
            level: 0,
            children: Vec::new(),
            content: String::new(),
            markup: String::new(),
            info: String::new(),
            meta: Extensions::default(),
            block: false,
            hidden: false,
        }
    }

    pub fn attr_index(&self, name: &str) -> Option<usize> {
        self.attrs.iter().position(|(n, _)| n == name)
    }

    /// Appends an attribute without checking for duplicates.
    pub fn attr_push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.push((name.into(), value.into()));
    }

    /// Sets `name` to `value`, replacing an existing value in place.
    pub fn attr_set(&mut self, name: &str, value: impl Into<String>) {
        match self.attr_index(name) {
            Some(idx) => self.attrs[idx].1 = value.into(),
            None => self.attrs.push((name.to_string(), value.into())),
        }
    }

    pub fn attr_get(&self, name: &str) -> Option<&str> {
        self.attr_index(name).map(|idx| self.attrs[idx].1.as_str())
    }

    /// Appends `value` to `name` separated by a space, e.g. for classes.
    pub fn attr_join(&mut self, name: &str, value: &str) {
        match self.attr_index(name) {
            Some(idx) => {
                let current = &mut self.attrs[idx].1;
                current.push(' ');
                current.push_str(value);
            }
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn attr_set_twice_keeps_one_attr_with_last_value() {
        let mut token = Token::new("link_open", "a", Nesting::Opening);
        token.attr_set("href", "one");
        token.attr_set("href", "two");
        assert_eq!(token.attrs, vec![("href".to_string(), "two".to_string())]);
    }

    #[test]
    fn attr_join_separates_with_space() {
        let mut token = Token::new("fence", "code", Nesting::SelfClosing);
        token.attr_join("class", "a");
        token.attr_join("class", "b");
        assert_eq!(token.attr_get("class"), Some("a b"));
        assert_eq!(token.attrs.len(), 1);
    }

    #[test]
    fn attr_push_preserves_order() {
        let mut token = Token::new("image", "img", Nesting::SelfClosing);
        token.attr_push("src", "x.png");
        token.attr_push("alt", "");
        assert_eq!(token.attr_index("alt"), Some(1));
        assert_eq!(token.attr_get("missing"), None);
    }
}
