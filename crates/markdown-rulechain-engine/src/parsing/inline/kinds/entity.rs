//! Numeric (`&#35;`, `&#x23;`) and named (`&amp;`) character references.

use std::sync::LazyLock;

use regex::Regex;

use crate::common::text::{decode_named_entity, decode_numeric_entity};
use crate::error::Result;
use crate::parsing::inline::StateInline;
use crate::token::Nesting;

static DIGITAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^&#((?:x[a-f0-9]{1,6}|[0-9]{1,7}));").expect("valid numeric entity regex")
});

static NAMED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^&[a-z][a-z0-9]{1,31};").expect("valid named entity regex"));

pub fn entity(state: &mut StateInline<'_>, silent: bool) -> Result<bool> {
    let pos = state.pos;
    let max = state.pos_max;

    if state.byte_at(pos) != b'&' || pos + 1 >= max {
        return Ok(false);
    }

    let src = state.src;
    let rest = &src[pos..max];

    let (content, markup) = if state.byte_at(pos + 1) == b'#' {
        let Some(caps) = DIGITAL_RE.captures(rest) else {
            return Ok(false);
        };
        let body = caps.get(1).map_or("", |m| m.as_str());
        let decoded = decode_numeric_entity(body).unwrap_or('\u{FFFD}');
        (decoded.to_string(), caps.get(0).map_or("", |m| m.as_str()))
    } else {
        let Some(found) = NAMED_RE.find(rest) else {
            return Ok(false);
        };
        let Some(decoded) = decode_named_entity(found.as_str()) else {
            return Ok(false);
        };
        (decoded, found.as_str())
    };

    if !silent {
        let token = state.push("text_special", "", Nesting::SelfClosing);
        token.content = content;
        token.markup = markup.to_string();
        token.info = "entity".to_string();
    }

    state.pos += markup.len();
    Ok(true)
}

#[cfg(test)]
mod tests {
    use crate::Markdown;
    use crate::env::Env;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::named("&copy;", "©")]
    #[case::amp_is_reescaped("&amp;", "&amp;")]
    #[case::decimal("&#35;", "#")]
    #[case::hex("&#X22;", "&quot;")]
    #[case::zero_is_replaced("&#0;", "\u{FFFD}")]
    #[case::unknown_name("&nosuch;", "&amp;nosuch;")]
    #[case::too_many_digits("&#12345678;", "&amp;#12345678;")]
    fn entities(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Markdown::new().render_inline(input).unwrap(), expected);
    }

    #[test]
    fn keeps_source_as_markup() {
        let mut env = Env::new();
        let tokens = Markdown::new().parse_inline("&#x41;", &mut env).unwrap();
        // text_join turns text_special into text after parsing
        let token = &tokens[0].children[0];
        assert_eq!(token.content, "A");
    }
}
