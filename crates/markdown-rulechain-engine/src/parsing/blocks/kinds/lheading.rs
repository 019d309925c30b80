use crate::error::Result;
use crate::parsing::blocks::StateBlock;
use crate::token::Nesting;

/// Setext heading: paragraph text underlined by `=` (level 1) or `-`
/// (level 2).
pub fn lheading(state: &mut StateBlock<'_>, start_line: usize, end_line: usize, _silent: bool) -> Result<bool> {
    if state.s_count[start_line] - state.blk_indent >= 4 {
        return Ok(false);
    }

    // matched against the paragraph terminators
    let old_parent_type = state.parent_type;
    state.parent_type = "paragraph";
    let result = scan_heading(state, start_line, end_line);
    state.parent_type = old_parent_type;
    result
}

fn scan_heading(state: &mut StateBlock<'_>, start_line: usize, end_line: usize) -> Result<bool> {
    let md = state.md;
    let terminator_rules = md.block.ruler.get_rules("paragraph");

    let mut underline = None;
    let mut next_line = start_line + 1;

    'lines: while next_line < end_line && !state.is_empty(next_line) {
        // indented text is a lazy continuation here, not code
        if state.s_count[next_line] - state.blk_indent > 3 {
            next_line += 1;
            continue;
        }

        if state.s_count[next_line] >= state.blk_indent {
            let pos = state.b_marks[next_line] + state.t_shift[next_line];
            let max = state.e_marks[next_line];
            if pos < max {
                let marker = state.byte_at(pos);
                if marker == b'-' || marker == b'=' {
                    let after = state.skip_spaces(state.skip_chars(pos, marker));
                    if after >= max {
                        underline = Some(marker);
                        break;
                    }
                }
            }
        }

        // lazy blockquote line, already checked by the blockquote rule
        if state.s_count[next_line] < 0 {
            next_line += 1;
            continue;
        }

        for rule in terminator_rules {
            if rule(state, next_line, end_line, true)? {
                break 'lines;
            }
        }
        next_line += 1;
    }

    let Some(marker) = underline else {
        return Ok(false);
    };
    let level = if marker == b'=' { 1 } else { 2 };

    let content = state
        .get_lines(start_line, next_line, state.blk_indent, false)
        .trim()
        .to_string();
    state.line = next_line + 1;

    let tag = format!("h{level}");
    let markup = char::from(marker).to_string();

    let token = state.push("heading_open", &tag, Nesting::Opening);
    token.markup = markup.clone();
    token.map = Some([start_line, next_line + 1].into());

    let token = state.push("inline", "", Nesting::SelfClosing);
    token.content = content;
    token.map = Some([start_line, next_line].into());

    state.push("heading_close", &tag, Nesting::Closing).markup = markup;
    Ok(true)
}
