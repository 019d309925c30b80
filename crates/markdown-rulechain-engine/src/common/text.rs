//! Character classes, HTML escaping and backslash/entity unescaping shared by
//! the block, inline and core rules.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use unicode_general_category::{GeneralCategory, get_general_category};

/// Tab or space.
pub fn is_space(byte: u8) -> bool {
    byte == b'\t' || byte == b' '
}

/// Unicode whitespace as used by the flanking rules (Zs plus line controls).
pub fn is_white_space(ch: char) -> bool {
    matches!(
        ch,
        '\u{09}'..='\u{0D}'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// Unicode punctuation or symbol (general categories P* and S*).
pub fn is_punct_char(ch: char) -> bool {
    if ch.is_ascii() {
        return ch.is_ascii_punctuation();
    }
    matches!(
        get_general_category(ch),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
            | GeneralCategory::MathSymbol
            | GeneralCategory::CurrencySymbol
            | GeneralCategory::ModifierSymbol
            | GeneralCategory::OtherSymbol
    )
}

/// ASCII punctuation as defined by Markdown: `!` to `/`, `:` to `@`, `[` to
/// `` ` `` and `{` to `~`.
pub fn is_md_ascii_punct(ch: char) -> bool {
    ch.is_ascii_punctuation()
}

/// Escapes `&`, `<`, `>` and `"` for text and attribute values.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}

/// Code points a numeric character reference may produce.
pub fn is_valid_entity_code(code: u32) -> bool {
    // surrogates
    if (0xD800..=0xDFFF).contains(&code) {
        return false;
    }
    // noncharacters
    if (0xFDD0..=0xFDEF).contains(&code) {
        return false;
    }
    if (code & 0xFFFF) == 0xFFFF || (code & 0xFFFF) == 0xFFFE {
        return false;
    }
    // control codes
    if code <= 0x08 || code == 0x0B || (0x0E..=0x1F).contains(&code) {
        return false;
    }
    if (0x7F..=0x9F).contains(&code) {
        return false;
    }
    code <= 0x10FFFF
}

/// Decodes a numeric reference body such as `x41` or `65`.
pub fn decode_numeric_entity(body: &str) -> Option<char> {
    let code = match body.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => body.parse::<u32>().ok()?,
    };
    if is_valid_entity_code(code) {
        char::from_u32(code)
    } else {
        None
    }
}

/// Decodes a full named entity such as `&amp;`, returning `None` when the
/// name is not a known HTML entity.
pub fn decode_named_entity(entity: &str) -> Option<String> {
    let decoded = html_escape::decode_html_entities(entity);
    if decoded == entity {
        None
    } else {
        Some(decoded.into_owned())
    }
}

static UNESCAPE_ALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"(?i)\\([!"#$%&'()*+,\-./:;<=>?@\[\\\]^_`{|}~])|&([a-z#][a-z0-9]{1,31});"##)
        .expect("valid unescape regex")
});

static DIGITAL_ENTITY_TEST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^#((?:x[a-f0-9]{1,8}|[0-9]{1,8}))$").expect("valid numeric entity regex")
});

/// Resolves backslash escapes and entity references, e.g. in link
/// destinations, titles and fence info strings.
pub fn unescape_all(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') && !text.contains('&') {
        return Cow::Borrowed(text);
    }
    UNESCAPE_ALL_RE.replace_all(text, |caps: &Captures<'_>| {
        if let Some(escaped) = caps.get(1) {
            return escaped.as_str().to_string();
        }
        let whole = &caps[0];
        let name = &caps[2];
        if DIGITAL_ENTITY_TEST_RE.is_match(name) {
            return match decode_numeric_entity(&name[1..]) {
                Some(ch) => ch.to_string(),
                None => whole.to_string(),
            };
        }
        decode_named_entity(whole).unwrap_or_else(|| whole.to_string())
    })
}

/// Normalizes a link label for reference lookups: trims, collapses inner
/// whitespace and case folds.
pub fn normalize_reference(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .to_uppercase()
}
