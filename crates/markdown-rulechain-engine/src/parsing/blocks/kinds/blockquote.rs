use crate::common::is_space;
use crate::error::Result;
use crate::parsing::blocks::StateBlock;
use crate::token::Nesting;

/// Per-line values patched while the quote's content is tokenized.
struct SavedLine {
    b_mark: usize,
    bs_count: i32,
    s_count: i32,
    t_shift: usize,
}

pub fn blockquote(state: &mut StateBlock<'_>, start_line: usize, end_line: usize, silent: bool) -> Result<bool> {
    let pos = state.b_marks[start_line] + state.t_shift[start_line];
    let old_line_max = state.line_max;

    if state.s_count[start_line] - state.blk_indent >= 4 {
        return Ok(false);
    }
    if state.byte_at(pos) != b'>' {
        return Ok(false);
    }

    // the rest of the quote cannot fail, so silent mode can answer now
    if silent {
        return Ok(true);
    }

    let md = state.md;
    let terminator_rules = md.block.ruler.get_rules("blockquote");
    let old_parent_type = state.parent_type;
    state.parent_type = "blockquote";

    let mut saved: Vec<SavedLine> = Vec::new();
    let mut last_line_empty = false;

    // The quote ends at:
    //  1. an empty line outside the quote
    //  2. a non-quoted line right after an empty quoted line
    //  3. a line starting another block that may interrupt a paragraph
    let mut next_line = start_line;
    while next_line < end_line {
        let is_outdented = state.s_count[next_line] < state.blk_indent;

        let mut pos = state.b_marks[next_line] + state.t_shift[next_line];
        let max = state.e_marks[next_line];

        if pos >= max {
            // case 1
            break;
        }

        let is_marker = state.byte_at(pos) == b'>';
        pos += 1;
        if is_marker && !is_outdented {
            // line inside the quote: move the line start past "> "
            let mut initial = state.s_count[next_line] + 1;
            let space_after_marker;
            let mut adjust_tab = false;

            match state.byte_at(pos) {
                b' ' => {
                    pos += 1;
                    initial += 1;
                    space_after_marker = true;
                }
                b'\t' => {
                    space_after_marker = true;
                    if (state.bs_count[next_line] + initial) % 4 == 3 {
                        // tab is one column wide here
                        pos += 1;
                        initial += 1;
                    } else {
                        // keep the tab, shift bs_count so its remainder shows as spaces
                        adjust_tab = true;
                    }
                }
                _ => space_after_marker = false,
            }

            let mut offset = initial;
            let saved_b_mark = state.b_marks[next_line];
            state.b_marks[next_line] = pos;

            while pos < max {
                let ch = state.byte_at(pos);
                if !is_space(ch) {
                    break;
                }
                if ch == b'\t' {
                    offset += 4 - (offset + state.bs_count[next_line] + i32::from(adjust_tab)) % 4;
                } else {
                    offset += 1;
                }
                pos += 1;
            }

            last_line_empty = pos >= max;

            saved.push(SavedLine {
                b_mark: saved_b_mark,
                bs_count: state.bs_count[next_line],
                s_count: state.s_count[next_line],
                t_shift: state.t_shift[next_line],
            });
            state.bs_count[next_line] = state.s_count[next_line] + 1 + i32::from(space_after_marker);
            state.s_count[next_line] = offset - initial;
            state.t_shift[next_line] = pos - state.b_marks[next_line];
            next_line += 1;
            continue;
        }

        // case 2
        if last_line_empty {
            break;
        }

        // case 3
        let mut terminate = false;
        for rule in terminator_rules {
            if rule(state, next_line, end_line, true)? {
                terminate = true;
                break;
            }
        }

        if terminate {
            // hard stop: paragraphs inside must not look past this line
            state.line_max = next_line;

            if state.blk_indent != 0 {
                // blk_indent is reset to 0 below, so shift this line to match
                saved.push(save_line(state, next_line));
                state.s_count[next_line] -= state.blk_indent;
            }
            break;
        }

        saved.push(save_line(state, next_line));

        // lazy continuation: negative indent marks it for the paragraph rule
        state.s_count[next_line] = -1;
        next_line += 1;
    }

    let old_indent = state.blk_indent;
    state.blk_indent = 0;

    let open_idx = state.tokens.len();
    state.push("blockquote_open", "blockquote", Nesting::Opening).markup = ">".to_string();

    md.block.tokenize(state, start_line, next_line)?;

    state.push("blockquote_close", "blockquote", Nesting::Closing).markup = ">".to_string();

    state.line_max = old_line_max;
    state.parent_type = old_parent_type;
    state.tokens[open_idx].map = Some([start_line, state.line].into());

    for (i, line) in saved.into_iter().enumerate() {
        state.b_marks[start_line + i] = line.b_mark;
        state.t_shift[start_line + i] = line.t_shift;
        state.s_count[start_line + i] = line.s_count;
        state.bs_count[start_line + i] = line.bs_count;
    }
    state.blk_indent = old_indent;

    Ok(true)
}

fn save_line(state: &StateBlock<'_>, line: usize) -> SavedLine {
    SavedLine {
        b_mark: state.b_marks[line],
        bs_count: state.bs_count[line],
        s_count: state.s_count[line],
        t_shift: state.t_shift[line],
    }
}

#[cfg(test)]
mod tests {
    use crate::Markdown;
    use crate::options::OptionsUpdate;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::simple("> foo", "<blockquote>\n<p>foo</p>\n</blockquote>\n")]
    #[case::lazy_continuation("> foo\nbar", "<blockquote>\n<p>foo\nbar</p>\n</blockquote>\n")]
    #[case::ended_by_blank("> foo\n\nbar", "<blockquote>\n<p>foo</p>\n</blockquote>\n<p>bar</p>\n")]
    #[case::interrupted_by_hr("> foo\n---", "<blockquote>\n<p>foo</p>\n</blockquote>\n<hr>\n")]
    #[case::nested("> > a", "<blockquote>\n<blockquote>\n<p>a</p>\n</blockquote>\n</blockquote>\n")]
    #[case::tabs_after_marker(">\t\tcode", "<blockquote>\n<pre><code>  code\n</code></pre>\n</blockquote>\n")]
    fn blockquotes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Markdown::new().render(input).unwrap(), expected);
    }

    #[test]
    fn nesting_cap_keeps_deeper_quotes_as_text() {
        let md = Markdown::with_options(OptionsUpdate {
            max_nesting: Some(2),
            ..OptionsUpdate::default()
        });
        assert_eq!(
            md.render(">foo\n>>bar\n>>>baz").unwrap(),
            "<blockquote>\n<p>foo</p>\n<blockquote>\n<p>bar\n&gt;baz</p>\n</blockquote>\n</blockquote>\n"
        );
    }
}
