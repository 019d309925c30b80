//! `[text](href "title")` and reference links `[text][label]`, `[label][]`
//! and `[label]`. The target scanning here is shared with images.

use crate::common::{is_space, normalize_reference};
use crate::env::Reference;
use crate::error::Result;
use crate::parsing::helpers::{parse_link_destination, parse_link_label, parse_link_title};
use crate::parsing::inline::StateInline;
use crate::token::Nesting;

/// Outcome of scanning `( destination "title" )` after a label.
pub(super) enum InlineTarget {
    /// Nothing but whitespace after `(`.
    Empty,
    Parsed {
        href: String,
        title: String,
        /// Position after `)`, or where scanning stopped when unclosed.
        pos: usize,
        closed: bool,
    },
}

fn skip_link_spaces(state: &StateInline<'_>, mut pos: usize) -> usize {
    while pos < state.pos_max {
        let ch = state.byte_at(pos);
        if !is_space(ch) && ch != b'\n' {
            break;
        }
        pos += 1;
    }
    pos
}

/// Scans the parenthesized target; `pos` points just past `(`.
pub(super) fn scan_inline_target(state: &StateInline<'_>, pos: usize) -> InlineTarget {
    let max = state.pos_max;
    let md = state.md;

    let mut pos = skip_link_spaces(state, pos);
    if pos >= max {
        return InlineTarget::Empty;
    }

    let mut href = String::new();
    let mut title = String::new();

    if let Some(destination) = parse_link_destination(state.src, pos, max) {
        let normalized = (md.normalize_link)(&destination.value);
        if (md.validate_link)(&normalized) {
            href = normalized;
            pos = destination.pos;
        }

        let start = pos;
        pos = skip_link_spaces(state, pos);

        // a title needs whitespace before it
        if pos < max && start != pos {
            if let Some(scanned) = parse_link_title(state.src, pos, max) {
                title = scanned.value;
                pos = skip_link_spaces(state, scanned.pos);
            }
        }
    }

    let closed = pos < max && state.byte_at(pos) == b')';
    InlineTarget::Parsed {
        href,
        title,
        pos: pos + 1,
        closed,
    }
}

/// Looks up a reference for the label `[label_start, label_end)`, reading an
/// optional `[label]` or `[]` at `pos`. Returns the definition and the
/// position after the link.
pub(super) fn resolve_reference(
    state: &mut StateInline<'_>,
    label_start: usize,
    label_end: usize,
    pos: usize,
) -> Result<Option<(Reference, usize)>> {
    let max = state.pos_max;
    let src = state.src;
    let mut label = None;
    let mut pos = pos;

    if pos < max && state.byte_at(pos) == b'[' {
        let start = pos + 1;
        match parse_link_label(state, pos, false)? {
            Some(end) => {
                label = Some(&src[start..end]);
                pos = end + 1;
            }
            None => pos = label_end + 1,
        }
    } else {
        pos = label_end + 1;
    }

    // collapsed `[]` and shortcut references reuse the link text
    let label = match label {
        Some(label) if !label.is_empty() => label,
        _ => &src[label_start..label_end],
    };

    Ok(state
        .env
        .references
        .get(&normalize_reference(label))
        .cloned()
        .map(|reference| (reference, pos)))
}

pub fn link(state: &mut StateInline<'_>, silent: bool) -> Result<bool> {
    if state.byte_at(state.pos) != b'[' {
        return Ok(false);
    }

    let old_pos = state.pos;
    let max = state.pos_max;
    let label_start = state.pos + 1;

    let Some(label_end) = parse_link_label(state, old_pos, true)? else {
        return Ok(false);
    };

    let mut pos = label_end + 1;
    let mut target = None;

    if pos < max && state.byte_at(pos) == b'(' {
        match scan_inline_target(state, pos + 1) {
            InlineTarget::Empty => return Ok(false),
            InlineTarget::Parsed {
                href,
                title,
                pos: end,
                closed,
            } => {
                pos = end;
                // an unclosed inline target may still be a shortcut reference
                if closed {
                    target = Some((href, title));
                }
            }
        }
    }

    let (href, title) = match target {
        Some(target) => target,
        None => match resolve_reference(state, label_start, label_end, pos)? {
            Some((reference, end)) => {
                pos = end;
                (reference.href, reference.title)
            }
            None => {
                state.pos = old_pos;
                return Ok(false);
            }
        },
    };

    if !silent {
        state.pos = label_start;
        state.pos_max = label_end;

        let token = state.push("link_open", "a", Nesting::Opening);
        token.attr_push("href", href);
        if !title.is_empty() {
            token.attr_push("title", title);
        }

        state.link_level += 1;
        let md = state.md;
        md.inline.tokenize(state)?;
        state.link_level -= 1;

        state.push("link_close", "a", Nesting::Closing);
    }

    state.pos = pos;
    state.pos_max = max;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use crate::Markdown;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::inline("[a](/u)", "<a href=\"/u\">a</a>")]
    #[case::with_title("[a](/u \"t\")", "<a href=\"/u\" title=\"t\">a</a>")]
    #[case::empty_target("[a]()", "<a href=\"\">a</a>")]
    #[case::spaces_only_target("[a]( ", "[a]( ")]
    #[case::no_nested_links("[a [b](/i)](/o)", "[a <a href=\"/i\">b</a>](/o)")]
    #[case::unsafe_scheme("[a](javascript:alert(1))", "[a](javascript:alert(1))")]
    #[case::code_span_in_label("[`]`](/u)", "<a href=\"/u\"><code>]</code></a>")]
    #[case::unknown_reference("[a][nope]", "[a][nope]")]
    fn links(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Markdown::new().render_inline(input).unwrap(), expected);
    }

    #[rstest]
    #[case::full("[text][ref]")]
    #[case::collapsed("[ref][]")]
    #[case::shortcut("[ref]")]
    fn reference_forms(#[case] link: &str) {
        let input = format!("[ref]: /target\n\n{link}");
        let html = Markdown::new().render(&input).unwrap();
        assert!(html.contains("<a href=\"/target\">"), "{html}");
    }
}
