use crate::common::is_space;
use crate::error::Result;
use crate::parsing::blocks::StateBlock;
use crate::token::Nesting;

/// Thematic break: three or more `*`, `-` or `_`, optionally spaced.
pub fn hr(state: &mut StateBlock<'_>, start_line: usize, _end_line: usize, silent: bool) -> Result<bool> {
    let max = state.e_marks[start_line];

    if state.s_count[start_line] - state.blk_indent >= 4 {
        return Ok(false);
    }

    let mut pos = state.b_marks[start_line] + state.t_shift[start_line];
    let marker = state.byte_at(pos);
    pos += 1;

    if marker != b'*' && marker != b'-' && marker != b'_' {
        return Ok(false);
    }

    let mut count = 1;
    while pos < max {
        let ch = state.byte_at(pos);
        pos += 1;
        if ch != marker && !is_space(ch) {
            return Ok(false);
        }
        if ch == marker {
            count += 1;
        }
    }

    if count < 3 {
        return Ok(false);
    }
    if silent {
        return Ok(true);
    }

    state.line = start_line + 1;
    let token = state.push("hr", "hr", Nesting::SelfClosing);
    token.map = Some([start_line, start_line + 1].into());
    token.markup = char::from(marker).to_string().repeat(count);
    Ok(true)
}
