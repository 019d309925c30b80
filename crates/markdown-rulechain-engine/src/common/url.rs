//! Default link collaborators: URL validation, percent-encoding for `href`
//! values and percent-decoding for displayed link text. Control characters
//! stay encoded in displayed text along with reserved URL characters.

use std::borrow::Cow;
use std::sync::LazyLock;

use percent_encoding::{
    AsciiSet, CONTROLS, NON_ALPHANUMERIC, percent_decode_str, percent_encode, utf8_percent_encode,
};
use regex::Regex;

/// Bytes [`normalize_link`] encodes: everything but ASCII alphanumerics and
/// URL punctuation. `%` is encoded unless it starts a valid escape.
const ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

/// Bytes [`normalize_link_text`] leaves percent-encoded.
const DECODE_KEEP: &AsciiSet = &CONTROLS
    .add(b';')
    .add(b'/')
    .add(b'?')
    .add(b':')
    .add(b'@')
    .add(b'&')
    .add(b'=')
    .add(b'+')
    .add(b'$')
    .add(b',')
    .add(b'#')
    .add(b'%');

static BAD_PROTO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(vbscript|javascript|file|data):").expect("valid protocol regex")
});

static GOOD_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/(gif|png|jpeg|webp);").expect("valid data url regex")
});

/// Rejects script-capable and local-file URLs. `data:` is only allowed for
/// common raster images.
pub fn validate_link(url: &str) -> bool {
    let url = url.trim().to_lowercase();
    if BAD_PROTO_RE.is_match(&url) {
        GOOD_DATA_RE.is_match(&url)
    } else {
        true
    }
}

/// Decoded byte of a `%XX` escape at the start of `s`.
fn escape_at(s: &str) -> Option<u8> {
    let hex = s.strip_prefix('%')?.get(..2)?;
    u8::from_str_radix(hex, 16).ok().filter(|_| hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Splits `url` around `%XX` escapes accepted by `keep`, yielding
/// `(text_before, escape)` pairs. The last pair has no escape.
fn split_escapes(url: &str, keep: impl Fn(u8) -> bool) -> Vec<(&str, Option<&str>)> {
    let mut parts = Vec::new();
    let mut last = 0;
    let mut i = 0;
    while let Some(offset) = url[i..].find('%') {
        let at = i + offset;
        match escape_at(&url[at..]) {
            Some(byte) if keep(byte) => {
                parts.push((&url[last..at], Some(&url[at..at + 3])));
                last = at + 3;
                i = at + 3;
            }
            _ => i = at + 1,
        }
    }
    parts.push((&url[last..], None));
    parts
}

/// Percent-encodes everything outside the URL-safe set, keeping existing
/// `%XX` escapes intact.
pub fn normalize_link(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for (text, escape) in split_escapes(url, |_| true) {
        out.extend(utf8_percent_encode(text, ENCODE_SET));
        if let Some(escape) = escape {
            out.push_str(escape);
        }
    }
    out
}

fn keeps_escaped(byte: u8) -> bool {
    byte.is_ascii() && percent_encode(&[byte], DECODE_KEEP).next().is_some_and(|s| s.starts_with('%'))
}

/// Decodes percent escapes for display, leaving reserved characters encoded.
/// Escapes that do not form valid UTF-8 become U+FFFD.
pub fn normalize_link_text(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for (text, escape) in split_escapes(url, keeps_escaped) {
        let decoded: Cow<'_, str> = percent_decode_str(text).decode_utf8_lossy();
        out.push_str(&decoded);
        if let Some(escape) = escape {
            out.push_str(escape);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("http://example.com", true)]
    #[case("javascript:alert(1)", false)]
    #[case(" JavaScript:alert(1)", false)]
    #[case("vbscript:x", false)]
    #[case("file:///etc/passwd", false)]
    #[case("data:text/html;base64,xx", false)]
    #[case("data:image/png;base64,xx", true)]
    #[case("relative/path", true)]
    fn validate_link_cases(#[case] url: &str, #[case] expected: bool) {
        assert_eq!(validate_link(url), expected);
    }

    #[test]
    fn normalize_link_encodes_unsafe_chars() {
        assert_eq!(normalize_link("a b"), "a%20b");
        assert_eq!(normalize_link("/ä?x=1#y"), "/%C3%A4?x=1#y");
        assert_eq!(normalize_link("%20already"), "%20already");
        assert_eq!(normalize_link("100%"), "100%25");
        assert_eq!(normalize_link("a\\b"), "a%5Cb");
        assert_eq!(normalize_link("%zz%4"), "%25zz%254");
    }

    #[test]
    fn normalize_link_text_decodes_for_display() {
        assert_eq!(normalize_link_text("http://x/%C3%A4%20b"), "http://x/ä b");
        assert_eq!(normalize_link_text("a%2Fb%25"), "a%2Fb%25");
        assert_eq!(normalize_link_text("%FF"), "\u{FFFD}");
        assert_eq!(normalize_link_text("%E4%B8%AD%2F%E6%96%87"), "中%2F文");
        assert_eq!(normalize_link_text("50%off"), "50%off");
    }
}
