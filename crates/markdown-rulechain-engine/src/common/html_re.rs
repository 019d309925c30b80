//! Raw HTML recognizers shared by the `html_block` and `html_inline` rules.

use std::sync::LazyLock;

use regex::Regex;

const ATTR_NAME: &str = r"[a-zA-Z_:][a-zA-Z0-9:._-]*";
const UNQUOTED: &str = r#"[^"'=<>`\x00-\x20]+"#;
const SINGLE_QUOTED: &str = r"'[^']*'";
const DOUBLE_QUOTED: &str = r#""[^"]*""#;

fn open_tag() -> String {
    let attr_value = format!("(?:{UNQUOTED}|{SINGLE_QUOTED}|{DOUBLE_QUOTED})");
    let attribute = format!(r"(?:\s+{ATTR_NAME}(?:\s*=\s*{attr_value})?)");
    format!(r"<[A-Za-z][A-Za-z0-9\-]*{attribute}*\s*/?>")
}

const CLOSE_TAG: &str = r"</[A-Za-z][A-Za-z0-9\-]*\s*>";
const COMMENT: &str = r"<!---?>|<!--(?:[^-]|-[^-]|--[^>])*-->";
const PROCESSING: &str = r"<[?][\s\S]*?[?]>";
const DECLARATION: &str = r"<![A-Za-z][^>]*>";
const CDATA: &str = r"<!\[CDATA\[[\s\S]*?\]\]>";

/// Any inline HTML construct anchored at the start of the input.
pub static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "^(?:{}|{CLOSE_TAG}|{COMMENT}|{PROCESSING}|{DECLARATION}|{CDATA})",
        open_tag()
    ))
    .expect("valid html tag regex")
});

/// A complete open or close tag followed only by whitespace, used by the
/// seventh kind of HTML block.
pub static HTML_OPEN_CLOSE_TAG_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?:{}|{CLOSE_TAG})\s*$", open_tag()))
        .expect("valid html open/close tag regex")
});

static LINK_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^<a[>\s]").expect("valid link open regex"));

static LINK_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^</a\s*>").expect("valid link close regex"));

/// `<a ...>` in raw HTML.
pub fn is_link_open(html: &str) -> bool {
    LINK_OPEN_RE.is_match(html)
}

/// `</a>` in raw HTML.
pub fn is_link_close(html: &str) -> bool {
    LINK_CLOSE_RE.is_match(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("<a href=\"x\">rest", Some("<a href=\"x\">"))]
    #[case("<br/>", Some("<br/>"))]
    #[case("</div >", Some("</div >"))]
    #[case("<!-- c -->x", Some("<!-- c -->"))]
    #[case("<?php echo 1; ?>", Some("<?php echo 1; ?>"))]
    #[case("<!DOCTYPE html>", Some("<!DOCTYPE html>"))]
    #[case("<![CDATA[ x ]]>", Some("<![CDATA[ x ]]>"))]
    #[case("<33>", None)]
    #[case("<a b=c=d>", None)]
    fn html_tag_prefixes(#[case] input: &str, #[case] expected: Option<&str>) {
        let found = HTML_TAG_RE.find(input).map(|m| m.as_str());
        assert_eq!(found, expected);
    }

    #[test]
    fn link_open_and_close() {
        assert!(is_link_open("<a href=\"x\">"));
        assert!(is_link_open("<A>"));
        assert!(!is_link_open("<abbr>"));
        assert!(is_link_close("</a >"));
        assert!(!is_link_close("</abbr>"));
    }

    #[test]
    fn open_close_tag_line() {
        assert!(HTML_OPEN_CLOSE_TAG_LINE_RE.is_match("<custom-tag>  "));
        assert!(!HTML_OPEN_CLOSE_TAG_LINE_RE.is_match("<custom-tag> text"));
    }
}
