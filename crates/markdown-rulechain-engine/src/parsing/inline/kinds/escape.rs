use crate::common::is_space;
use crate::error::Result;
use crate::parsing::inline::StateInline;
use crate::token::Nesting;

const ESCAPABLE: &[u8] = b"\\!\"#$%&'()*+,./:;<=>?@[]^_`{|}~-";

/// Backslash escapes and backslash hard breaks.
pub fn escape(state: &mut StateInline<'_>, silent: bool) -> Result<bool> {
    let mut pos = state.pos;
    let max = state.pos_max;

    if state.byte_at(pos) != b'\\' {
        return Ok(false);
    }
    pos += 1;

    // a lone backslash at the end stays literal
    if pos >= max {
        return Ok(false);
    }

    if state.byte_at(pos) == b'\n' {
        if !silent {
            state.push("hardbreak", "br", Nesting::SelfClosing);
        }
        pos += 1;
        while pos < max && is_space(state.byte_at(pos)) {
            pos += 1;
        }
        state.pos = pos;
        return Ok(true);
    }

    let Some(escaped) = state.char_at(pos) else {
        return Ok(false);
    };

    if !silent {
        let original = format!("\\{escaped}");
        let is_escapable = escaped.is_ascii() && ESCAPABLE.contains(&(escaped as u8));
        let token = state.push("text_special", "", Nesting::SelfClosing);
        token.content = if is_escapable {
            escaped.to_string()
        } else {
            original.clone()
        };
        token.markup = original;
        token.info = "escape".to_string();
    }

    state.pos = pos + escaped.len_utf8();
    Ok(true)
}

#[cfg(test)]
mod tests {
    use crate::Markdown;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::punctuation(r"\*not em\*", "*not em*")]
    #[case::letter_stays(r"\a", r"\a")]
    #[case::non_ascii_stays("\\é", "\\é")]
    #[case::trailing_backslash("a\\", "a\\")]
    #[case::html_escaped(r"\<", "&lt;")]
    fn escapes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Markdown::new().render_inline(input).unwrap(), expected);
    }

    #[test]
    fn backslash_newline_is_hard_break() {
        assert_eq!(
            Markdown::new().render("a\\\nb").unwrap(),
            "<p>a<br>\nb</p>\n"
        );
    }
}
