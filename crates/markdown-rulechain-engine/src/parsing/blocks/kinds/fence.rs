use crate::error::Result;
use crate::parsing::blocks::StateBlock;
use crate::token::Nesting;

/// Fenced code block opened by three or more backticks or tildes.
pub struct CodeFence;

impl CodeFence {
    pub const BACKTICK: u8 = b'`';
    pub const TILDE: u8 = b'~';
    pub const MIN_LEN: usize = 3;
}

pub fn fence(state: &mut StateBlock<'_>, start_line: usize, end_line: usize, silent: bool) -> Result<bool> {
    let mut pos = state.b_marks[start_line] + state.t_shift[start_line];
    let mut max = state.e_marks[start_line];

    if state.s_count[start_line] - state.blk_indent >= 4 {
        return Ok(false);
    }
    if pos + CodeFence::MIN_LEN > max {
        return Ok(false);
    }

    let marker = state.byte_at(pos);
    if marker != CodeFence::BACKTICK && marker != CodeFence::TILDE {
        return Ok(false);
    }

    let mut mem = pos;
    pos = state.skip_chars(pos, marker);
    let len = pos - mem;
    if len < CodeFence::MIN_LEN {
        return Ok(false);
    }

    let src = state.src;
    let markup = &src[mem..pos];
    let params = &src[pos..max];

    // a backtick fence info string may not contain backticks
    if marker == CodeFence::BACKTICK && params.as_bytes().contains(&marker) {
        return Ok(false);
    }

    if silent {
        return Ok(true);
    }

    let mut next_line = start_line;
    let mut have_end_marker = false;
    loop {
        next_line += 1;
        // unclosed fences run to the end of the document or container
        if next_line >= end_line {
            break;
        }

        pos = state.b_marks[next_line] + state.t_shift[next_line];
        mem = pos;
        max = state.e_marks[next_line];

        // a non-empty outdented line ends a fence inside a list item
        if pos < max && state.s_count[next_line] < state.blk_indent {
            break;
        }

        if state.byte_at(pos) != marker {
            continue;
        }

        // closing fence must be indented less than four columns
        if state.s_count[next_line] - state.blk_indent >= 4 {
            continue;
        }

        pos = state.skip_chars(pos, marker);
        if pos - mem < len {
            continue;
        }

        pos = state.skip_spaces(pos);
        if pos < max {
            continue;
        }

        have_end_marker = true;
        break;
    }

    // strip the opening fence's own indent from the content
    let indent = state.s_count[start_line];
    state.line = next_line + usize::from(have_end_marker);

    let content = state.get_lines(start_line + 1, next_line, indent, true);
    let line = state.line;
    let token = state.push("fence", "code", Nesting::SelfClosing);
    token.info = params.to_string();
    token.content = content;
    token.markup = markup.to_string();
    token.map = Some([start_line, line].into());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use crate::Markdown;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::backticks("```\nfoo\n```", "<pre><code>foo\n</code></pre>\n")]
    #[case::tildes("~~~\n<b>\n~~~", "<pre><code>&lt;b&gt;\n</code></pre>\n")]
    #[case::info_adds_class("```js\nx\n```", "<pre><code class=\"language-js\">x\n</code></pre>\n")]
    #[case::unclosed_runs_to_end("```\na\nb", "<pre><code>a\nb\n</code></pre>\n")]
    #[case::short_closer_is_content("````\na\n```\n````", "<pre><code>a\n```\n</code></pre>\n")]
    #[case::indented_fence_strips_indent("  ```\n  a\n b\nc\n  ```", "<pre><code>a\nb\nc\n</code></pre>\n")]
    #[case::backtick_in_info_is_not_fence("``` a`b\nc", "<p>``` a`b\nc</p>\n")]
    fn fences(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Markdown::new().render(input).unwrap(), expected);
    }

    #[test]
    fn fence_interrupts_paragraph() {
        assert_eq!(
            Markdown::new().render("para\n```\ncode\n```").unwrap(),
            "<p>para</p>\n<pre><code>code\n</code></pre>\n"
        );
    }
}
