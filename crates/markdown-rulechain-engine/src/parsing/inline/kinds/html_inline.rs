use crate::common::html_re::{HTML_TAG_RE, is_link_close, is_link_open};
use crate::error::Result;
use crate::parsing::inline::StateInline;
use crate::token::Nesting;

fn may_start_tag(byte: u8) -> bool {
    matches!(byte, b'!' | b'?' | b'/') || byte.is_ascii_alphabetic()
}

/// Raw inline HTML, passed through only when the `html` option is on.
pub fn html_inline(state: &mut StateInline<'_>, silent: bool) -> Result<bool> {
    if !state.md.options.html {
        return Ok(false);
    }

    let pos = state.pos;
    let max = state.pos_max;
    if state.byte_at(pos) != b'<' || pos + 2 >= max {
        return Ok(false);
    }
    if !may_start_tag(state.byte_at(pos + 1)) {
        return Ok(false);
    }

    let src = state.src;
    let Some(found) = HTML_TAG_RE.find(&src[pos..max]) else {
        return Ok(false);
    };
    let html = found.as_str();

    if !silent {
        state.push("html_inline", "", Nesting::SelfClosing).content = html.to_string();
        if is_link_open(html) {
            state.link_level += 1;
        }
        if is_link_close(html) {
            state.link_level -= 1;
        }
    }

    state.pos += html.len();
    Ok(true)
}
