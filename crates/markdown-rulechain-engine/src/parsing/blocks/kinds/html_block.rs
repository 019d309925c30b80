use std::sync::LazyLock;

use regex::Regex;

use crate::common::html_re::HTML_OPEN_CLOSE_TAG_LINE_RE;
use crate::error::Result;
use crate::parsing::blocks::StateBlock;
use crate::token::Nesting;

/// Tag names that start a type 6 HTML block.
const BLOCK_NAMES: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

/// One kind of HTML block: how it starts, how it ends and whether it may
/// interrupt a paragraph.
struct HtmlSequence {
    open: Regex,
    close: Regex,
    can_terminate: bool,
}

impl HtmlSequence {
    fn new(open: &str, close: &str, can_terminate: bool) -> Self {
        Self {
            open: Regex::new(open).expect("valid html block open regex"),
            close: Regex::new(close).expect("valid html block close regex"),
            can_terminate,
        }
    }
}

static HTML_SEQUENCES: LazyLock<Vec<HtmlSequence>> = LazyLock::new(|| {
    let block_open = format!(r"(?i)^</?(?:{})(?:\s|/?>|$)", BLOCK_NAMES.join("|"));
    vec![
        HtmlSequence::new(
            r"(?i)^<(?:script|pre|style|textarea)(?:\s|>|$)",
            r"(?i)</(?:script|pre|style|textarea)>",
            true,
        ),
        HtmlSequence::new(r"^<!--", r"-->", true),
        HtmlSequence::new(r"^<\?", r"\?>", true),
        HtmlSequence::new(r"^<![A-Z]", r">", true),
        HtmlSequence::new(r"^<!\[CDATA\[", r"\]\]>", true),
        HtmlSequence::new(&block_open, r"^$", true),
        HtmlSequence {
            open: HTML_OPEN_CLOSE_TAG_LINE_RE.clone(),
            close: Regex::new(r"^$").expect("valid html block close regex"),
            can_terminate: false,
        },
    ]
});

/// Raw HTML block, passed through verbatim. Only active with `options.html`.
pub fn html_block(state: &mut StateBlock<'_>, start_line: usize, end_line: usize, silent: bool) -> Result<bool> {
    let pos = state.b_marks[start_line] + state.t_shift[start_line];
    let max = state.e_marks[start_line];

    if state.s_count[start_line] - state.blk_indent >= 4 {
        return Ok(false);
    }
    if !state.md.options.html {
        return Ok(false);
    }
    if state.byte_at(pos) != b'<' {
        return Ok(false);
    }

    let line_text = &state.src[pos..max];
    let Some(sequence) = HTML_SEQUENCES.iter().find(|seq| seq.open.is_match(line_text)) else {
        return Ok(false);
    };

    if silent {
        return Ok(sequence.can_terminate);
    }

    let mut next_line = start_line + 1;

    // scan down to the closing condition unless the first line already has it
    if !sequence.close.is_match(line_text) {
        while next_line < end_line {
            if state.s_count[next_line] < state.blk_indent {
                break;
            }

            let pos = state.b_marks[next_line] + state.t_shift[next_line];
            let max = state.e_marks[next_line];
            let line_text = &state.src[pos..max];

            if sequence.close.is_match(line_text) {
                if !line_text.is_empty() {
                    next_line += 1;
                }
                break;
            }
            next_line += 1;
        }
    }

    state.line = next_line;
    let content = state.get_lines(start_line, next_line, state.blk_indent, true);
    let token = state.push("html_block", "", Nesting::SelfClosing);
    token.map = Some([start_line, next_line].into());
    token.content = content;
    Ok(true)
}
