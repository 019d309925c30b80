use crate::common::is_space;
use crate::error::Result;
use crate::parsing::inline::StateInline;
use crate::token::Nesting;

/// Line break: two or more trailing spaces make a hard break, anything else
/// a soft one. Leading spaces of the next line are dropped.
pub fn newline(state: &mut StateInline<'_>, silent: bool) -> Result<bool> {
    let mut pos = state.pos;
    if state.byte_at(pos) != b'\n' {
        return Ok(false);
    }

    if !silent {
        let trimmed_len = state.pending.trim_end_matches(' ').len();
        let trailing = state.pending.len() - trimmed_len;
        match trailing {
            0 => {
                state.push("softbreak", "br", Nesting::SelfClosing);
            }
            1 => {
                state.pending.truncate(trimmed_len);
                state.push("softbreak", "br", Nesting::SelfClosing);
            }
            _ => {
                state.pending.truncate(trimmed_len);
                state.push("hardbreak", "br", Nesting::SelfClosing);
            }
        }
    }

    pos += 1;
    while pos < state.pos_max && is_space(state.byte_at(pos)) {
        pos += 1;
    }
    state.pos = pos;
    Ok(true)
}
