//! `*emphasis*`, `_emphasis_`, `**strong**` and `__strong__`.

use crate::error::Result;
use crate::parsing::inline::{Delimiter, StateInline};
use crate::token::{Nesting, Token};

/// Turns a run of `*` or `_` into one text token per marker, each with a
/// delimiter entry.
pub fn tokenize(state: &mut StateInline<'_>, silent: bool) -> Result<bool> {
    if silent {
        return Ok(false);
    }
    let marker = state.byte_at(state.pos);
    if marker != b'_' && marker != b'*' {
        return Ok(false);
    }

    let scanned = state.scan_delims(state.pos, marker == b'*');
    let ch = char::from(marker).to_string();

    for _ in 0..scanned.length {
        state.push("text", "", Nesting::SelfClosing).content = ch.clone();
        let token = state.tokens.len() - 1;
        state.delimiters_mut().push(Delimiter {
            marker,
            length: scanned.length,
            token,
            end: None,
            open: scanned.can_open,
            close: scanned.can_close,
        });
    }

    state.pos += scanned.length;
    Ok(true)
}

fn become_tag(token: &mut Token, strong: bool, nesting: Nesting, ch: char) {
    let (tag, markup) = if strong {
        ("strong", format!("{ch}{ch}"))
    } else {
        ("em", ch.to_string())
    };
    let suffix = if nesting == Nesting::Opening { "open" } else { "close" };
    token.kind = format!("{tag}_{suffix}");
    token.tag = tag.to_string();
    token.nesting = nesting;
    token.markup = markup;
    token.content.clear();
}

fn process_list(tokens: &mut [Token], delimiters: &[Delimiter]) {
    // walk backwards so inner pairs are seen before the outer ones they
    // might merge with
    let mut i = delimiters.len();
    while i > 0 {
        i -= 1;
        let start = &delimiters[i];
        if start.marker != b'_' && start.marker != b'*' {
            continue;
        }
        let Some(end_idx) = start.end else {
            continue;
        };
        let end = &delimiters[end_idx];

        // `<em><em>x</em></em>` with adjacent markers collapses to `<strong>x</strong>`
        let is_strong = i > 0 && {
            let prev = &delimiters[i - 1];
            prev.end == Some(end_idx + 1)
                && prev.marker == start.marker
                && prev.token + 1 == start.token
                && delimiters[end_idx + 1].token == end.token + 1
        };

        let ch = char::from(start.marker);
        become_tag(&mut tokens[start.token], is_strong, Nesting::Opening, ch);
        become_tag(&mut tokens[end.token], is_strong, Nesting::Closing, ch);

        if is_strong {
            tokens[delimiters[i - 1].token].content.clear();
            tokens[delimiters[end_idx + 1].token].content.clear();
            i -= 1;
        }
    }
}

/// Converts matched delimiter pairs into `em_*` / `strong_*` tokens.
pub fn post_process(state: &mut StateInline<'_>) -> Result<()> {
    for id in state.delimiter_list_ids() {
        process_list(&mut state.tokens[..], &state.delimiter_lists[id]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::Markdown;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::em("*b*", "<em>b</em>")]
    #[case::strong("**b**", "<strong>b</strong>")]
    #[case::strong_em("***b***", "<em><strong>b</strong></em>")]
    #[case::underscore("_b_", "<em>b</em>")]
    #[case::intraword_star("a*b*c", "a<em>b</em>c")]
    #[case::intraword_underscore("a_b_c", "a_b_c")]
    #[case::unmatched("*a", "*a")]
    #[case::rule_of_three("*a**b*", "<em>a**b</em>")]
    #[case::mixed_markers("*a_", "*a_")]
    #[case::inside_link("[*a*](/u)", "<a href=\"/u\"><em>a</em></a>")]
    fn emphasis(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Markdown::new().render_inline(input).unwrap(), expected);
    }

    #[test]
    fn paragraph_wrapping() {
        assert_eq!(Markdown::new().render("*b*").unwrap(), "<p><em>b</em></p>\n");
    }
}
