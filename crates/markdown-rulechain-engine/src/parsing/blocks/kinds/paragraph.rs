use crate::error::Result;
use crate::parsing::blocks::StateBlock;
use crate::token::Nesting;

/// Fallback block: consecutive non-empty lines until a terminator.
pub fn paragraph(state: &mut StateBlock<'_>, start_line: usize, _end_line: usize, _silent: bool) -> Result<bool> {
    let md = state.md;
    let terminator_rules = md.block.ruler.get_rules("paragraph");
    let end_line = state.line_max;

    let old_parent_type = state.parent_type;
    state.parent_type = "paragraph";

    let mut next_line = start_line + 1;
    let mut failure = None;
    'lines: while next_line < end_line && !state.is_empty(next_line) {
        // indented or lazy lines continue the paragraph
        if state.s_count[next_line] - state.blk_indent > 3 || state.s_count[next_line] < 0 {
            next_line += 1;
            continue;
        }
        for rule in terminator_rules {
            match rule(state, next_line, end_line, true) {
                Ok(true) => break 'lines,
                Ok(false) => {}
                Err(err) => {
                    failure = Some(err);
                    break 'lines;
                }
            }
        }
        next_line += 1;
    }

    state.parent_type = old_parent_type;
    if let Some(err) = failure {
        return Err(err);
    }

    let content = state
        .get_lines(start_line, next_line, state.blk_indent, false)
        .trim()
        .to_string();
    state.line = next_line;
    let map = Some([start_line, next_line].into());

    state.push("paragraph_open", "p", Nesting::Opening).map = map;

    let token = state.push("inline", "", Nesting::SelfClosing);
    token.content = content;
    token.map = map;

    state.push("paragraph_close", "p", Nesting::Closing);
    Ok(true)
}
