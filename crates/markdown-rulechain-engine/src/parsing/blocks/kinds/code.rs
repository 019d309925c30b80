use crate::error::Result;
use crate::parsing::blocks::StateBlock;
use crate::token::Nesting;

/// Indented code block: lines indented four or more columns past the
/// container indent. Never interrupts anything, so it has no silent mode.
pub fn code(state: &mut StateBlock<'_>, start_line: usize, end_line: usize, _silent: bool) -> Result<bool> {
    if state.s_count[start_line] - state.blk_indent < 4 {
        return Ok(false);
    }

    let mut next_line = start_line + 1;
    let mut last = next_line;
    while next_line < end_line {
        if state.is_empty(next_line) {
            next_line += 1;
            continue;
        }
        if state.s_count[next_line] - state.blk_indent >= 4 {
            next_line += 1;
            last = next_line;
            continue;
        }
        break;
    }

    state.line = last;
    let mut content = state.get_lines(start_line, last, 4 + state.blk_indent, false);
    content.push('\n');

    let token = state.push("code_block", "code", Nesting::SelfClosing);
    token.content = content;
    token.map = Some([start_line, last].into());
    Ok(true)
}
