//! Helpers consumed by the rules: character classes, escaping, URL handling,
//! raw HTML patterns and bare link detection.

pub mod html_re;
pub mod linkify;
pub mod text;
pub mod url;

pub use linkify::{LinkMatch, LinkMatcher, RegexLinkMatcher};
pub use text::{
    escape_html, is_md_ascii_punct, is_punct_char, is_space, is_white_space, normalize_reference,
    unescape_all,
};
pub use url::{normalize_link, normalize_link_text, validate_link};
