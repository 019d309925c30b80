use crate::error::Result;
use crate::parsing::helpers::parse_link_label;
use crate::parsing::inline::StateInline;
use crate::parsing::inline::kinds::link::{InlineTarget, resolve_reference, scan_inline_target};
use crate::token::Nesting;

/// `![alt](src "title")` and the reference forms. The label is parsed into
/// the image token's children; the renderer flattens them into `alt`.
pub fn image(state: &mut StateInline<'_>, silent: bool) -> Result<bool> {
    let old_pos = state.pos;
    let max = state.pos_max;

    if state.byte_at(old_pos) != b'!' || state.byte_at(old_pos + 1) != b'[' {
        return Ok(false);
    }

    let label_start = old_pos + 2;
    let Some(label_end) = parse_link_label(state, old_pos + 1, false)? else {
        return Ok(false);
    };

    let mut pos = label_end + 1;
    let (href, title) = if pos < max && state.byte_at(pos) == b'(' {
        match scan_inline_target(state, pos + 1) {
            InlineTarget::Empty => return Ok(false),
            InlineTarget::Parsed {
                href,
                title,
                pos: end,
                closed,
            } => {
                if !closed {
                    state.pos = old_pos;
                    return Ok(false);
                }
                pos = end;
                (href, title)
            }
        }
    } else {
        match resolve_reference(state, label_start, label_end, pos)? {
            Some((reference, end)) => {
                pos = end;
                (reference.href, reference.title)
            }
            None => {
                state.pos = old_pos;
                return Ok(false);
            }
        }
    };

    if !silent {
        let md = state.md;
        let content = state.src[label_start..label_end].to_string();
        let mut children = Vec::new();
        md.inline.parse(&content, md, &mut *state.env, &mut children)?;

        let token = state.push("image", "img", Nesting::SelfClosing);
        token.attr_push("src", href);
        token.attr_push("alt", "");
        if !title.is_empty() {
            token.attr_push("title", title);
        }
        token.children = children;
        token.content = content;
    }

    state.pos = pos;
    state.pos_max = max;
    Ok(true)
}
