use crate::common::is_space;
use crate::error::Result;
use crate::parsing::blocks::StateBlock;
use crate::token::Nesting;

const MAX_LEVEL: usize = 6;

/// ATX heading: one to six `#` followed by a space or end of line.
pub fn heading(state: &mut StateBlock<'_>, start_line: usize, _end_line: usize, silent: bool) -> Result<bool> {
    let mut pos = state.b_marks[start_line] + state.t_shift[start_line];
    let mut max = state.e_marks[start_line];

    if state.s_count[start_line] - state.blk_indent >= 4 {
        return Ok(false);
    }
    if state.byte_at(pos) != b'#' || pos >= max {
        return Ok(false);
    }

    let mut level = 1;
    pos += 1;
    while state.byte_at(pos) == b'#' && pos < max && level <= MAX_LEVEL {
        level += 1;
        pos += 1;
    }

    if level > MAX_LEVEL || (pos < max && !is_space(state.byte_at(pos))) {
        return Ok(false);
    }
    if silent {
        return Ok(true);
    }

    // drop an optional closing sequence like `  ###  `
    max = state.skip_spaces_back(max, pos);
    let tmp = state.skip_chars_back(max, b'#', pos);
    if tmp > pos && is_space(state.byte_at(tmp - 1)) {
        max = tmp;
    }

    state.line = start_line + 1;
    let tag = format!("h{level}");
    let markup = "#".repeat(level);
    let map = Some([start_line, state.line].into());
    let content = state.src[pos..max].trim().to_string();

    let token = state.push("heading_open", &tag, Nesting::Opening);
    token.markup = markup.clone();
    token.map = map;

    let token = state.push("inline", "", Nesting::SelfClosing);
    token.content = content;
    token.map = map;

    state.push("heading_close", &tag, Nesting::Closing).markup = markup;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use crate::Markdown;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::h1("# hello", "<h1>hello</h1>\n")]
    #[case::h6("###### six", "<h6>six</h6>\n")]
    #[case::seven_is_text("####### seven", "<p>####### seven</p>\n")]
    #[case::needs_space("#5 bolt", "<p>#5 bolt</p>\n")]
    #[case::closing_sequence("## foo ##   ", "<h2>foo</h2>\n")]
    #[case::closing_needs_space("# foo#", "<h1>foo#</h1>\n")]
    #[case::empty("#", "<h1></h1>\n")]
    #[case::interrupts_paragraph("a\n# b", "<p>a</p>\n<h1>b</h1>\n")]
    fn headings(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Markdown::new().render(input).unwrap(), expected);
    }
}
