//! `<scheme:target>` and `<user@example.com>`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::parsing::inline::StateInline;
use crate::token::Nesting;

static AUTOLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]{1,31}:[^<>\x00-\x20]*$").expect("valid autolink regex")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~\-]+@[a-zA-Z0-9](?:[a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid email autolink regex")
});

pub fn autolink(state: &mut StateInline<'_>, silent: bool) -> Result<bool> {
    let start = state.pos;
    let max = state.pos_max;

    if state.byte_at(start) != b'<' {
        return Ok(false);
    }

    let mut pos = start;
    loop {
        pos += 1;
        if pos >= max {
            return Ok(false);
        }
        match state.byte_at(pos) {
            b'<' => return Ok(false),
            b'>' => break,
            _ => {}
        }
    }

    let src = state.src;
    let url = &src[start + 1..pos];
    let md = state.md;

    let full_url = if AUTOLINK_RE.is_match(url) {
        (md.normalize_link)(url)
    } else if EMAIL_RE.is_match(url) {
        (md.normalize_link)(&format!("mailto:{url}"))
    } else {
        return Ok(false);
    };

    if !(md.validate_link)(&full_url) {
        return Ok(false);
    }

    if !silent {
        let token = state.push("link_open", "a", Nesting::Opening);
        token.attr_push("href", full_url);
        token.markup = "autolink".to_string();
        token.info = "auto".to_string();

        state.push("text", "", Nesting::SelfClosing).content = (md.normalize_link_text)(url);

        let token = state.push("link_close", "a", Nesting::Closing);
        token.markup = "autolink".to_string();
        token.info = "auto".to_string();
    }

    state.pos += url.len() + 2;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use crate::Markdown;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::url("<https://example.com>", "<a href=\"https://example.com\">https://example.com</a>")]
    #[case::email("<me@example.com>", "<a href=\"mailto:me@example.com\">me@example.com</a>")]
    #[case::spaces_are_not_allowed("<https://a b>", "&lt;https://a b&gt;")]
    #[case::unclosed("<https://a", "&lt;https://a")]
    #[case::unsafe_scheme("<javascript:alert(1)>", "&lt;javascript:alert(1)&gt;")]
    fn autolinks(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Markdown::new().render_inline(input).unwrap(), expected);
    }

    #[test]
    fn tokens_are_marked_auto() {
        let mut env = crate::env::Env::new();
        let tokens = Markdown::new().parse_inline("<http://a.b>", &mut env).unwrap();
        let open = &tokens[0].children[0];
        assert_eq!(open.kind, "link_open");
        assert_eq!(open.markup, "autolink");
        assert_eq!(open.info, "auto");
    }
}
