use crate::common::is_space;
use crate::error::Result;
use crate::parsing::blocks::StateBlock;
use crate::token::Nesting;

/// Longest digit run accepted in an ordered list marker.
const MAX_ORDERED_DIGITS: usize = 9;

/// Position right after a `*`, `-` or `+` marker, if the line starts with one.
fn skip_bullet_marker(state: &StateBlock<'_>, line: usize) -> Option<usize> {
    let max = state.e_marks[line];
    let mut pos = state.b_marks[line] + state.t_shift[line];
    let marker = state.byte_at(pos);
    pos += 1;

    if marker != b'*' && marker != b'-' && marker != b'+' {
        return None;
    }
    if pos < max && !is_space(state.byte_at(pos)) {
        return None;
    }
    Some(pos)
}

/// Position right after a `1.` or `1)` marker, if the line starts with one.
fn skip_ordered_marker(state: &StateBlock<'_>, line: usize) -> Option<usize> {
    let start = state.b_marks[line] + state.t_shift[line];
    let max = state.e_marks[line];
    let mut pos = start;

    if pos + 1 >= max {
        return None;
    }

    let ch = state.byte_at(pos);
    pos += 1;
    if !ch.is_ascii_digit() {
        return None;
    }

    loop {
        if pos >= max {
            return None;
        }
        let ch = state.byte_at(pos);
        pos += 1;

        if ch.is_ascii_digit() {
            if pos - start > MAX_ORDERED_DIGITS {
                return None;
            }
            continue;
        }
        if ch == b')' || ch == b'.' {
            break;
        }
        return None;
    }

    if pos < max && !is_space(state.byte_at(pos)) {
        return None;
    }
    Some(pos)
}

/// Hides the paragraph wrappers directly inside the items of a tight list.
fn mark_tight_paragraphs(state: &mut StateBlock<'_>, list_idx: usize) {
    let level = state.level + 2;
    let end = state.tokens.len().saturating_sub(2);
    let mut i = list_idx + 2;
    while i < end {
        if state.tokens[i].level == level && state.tokens[i].kind == "paragraph_open" {
            state.tokens[i].hidden = true;
            state.tokens[i + 2].hidden = true;
            i += 2;
        }
        i += 1;
    }
}

pub fn list(state: &mut StateBlock<'_>, start_line: usize, end_line: usize, silent: bool) -> Result<bool> {
    let mut next_line = start_line;
    let mut tight = true;

    if state.s_count[next_line] - state.blk_indent >= 4 {
        return Ok(false);
    }

    // a line indented 4+ past the enclosing list belongs to that list's item,
    // even when it is outdented from the current container
    if state.list_indent >= 0
        && state.s_count[next_line] - state.list_indent >= 4
        && state.s_count[next_line] < state.blk_indent
    {
        return Ok(false);
    }

    let is_terminating_paragraph =
        silent && state.parent_type == "paragraph" && state.s_count[next_line] >= state.blk_indent;

    let mut start = state.b_marks[next_line] + state.t_shift[next_line];
    let is_ordered;
    let mut pos_after_marker;
    let mut marker_value = 0u64;

    if let Some(pos) = skip_ordered_marker(state, next_line) {
        is_ordered = true;
        pos_after_marker = pos;
        marker_value = state.src[start..pos - 1].parse().unwrap_or(0);

        // only "1." may interrupt a paragraph
        if is_terminating_paragraph && marker_value != 1 {
            return Ok(false);
        }
    } else if let Some(pos) = skip_bullet_marker(state, next_line) {
        is_ordered = false;
        pos_after_marker = pos;
    } else {
        return Ok(false);
    }

    // an empty item cannot interrupt a paragraph
    if is_terminating_paragraph && state.skip_spaces(pos_after_marker) >= state.e_marks[next_line] {
        return Ok(false);
    }

    if silent {
        return Ok(true);
    }

    let marker = state.byte_at(pos_after_marker - 1);
    let markup = char::from(marker).to_string();
    let list_idx = state.tokens.len();

    if is_ordered {
        let token = state.push("ordered_list_open", "ol", Nesting::Opening);
        if marker_value != 1 {
            token.attr_push("start", marker_value.to_string());
        }
    } else {
        state.push("bullet_list_open", "ul", Nesting::Opening);
    }
    state.tokens[list_idx].markup = markup.clone();

    let mut prev_empty_end = false;
    let md = state.md;
    let terminator_rules = md.block.ruler.get_rules("list");

    let old_parent_type = state.parent_type;
    state.parent_type = "list";

    while next_line < end_line {
        let mut pos = pos_after_marker;
        let max = state.e_marks[next_line];

        let initial = state.s_count[next_line]
            + (pos_after_marker - (state.b_marks[next_line] + state.t_shift[next_line])) as i32;
        let mut offset = initial;

        while pos < max {
            match state.byte_at(pos) {
                b'\t' => offset += 4 - (offset + state.bs_count[next_line]) % 4,
                b' ' => offset += 1,
                _ => break,
            }
            pos += 1;
        }

        let content_start = pos;
        let mut indent_after_marker = if content_start >= max { 1 } else { offset - initial };

        // five or more spaces after the marker start an indented code block
        if indent_after_marker > 4 {
            indent_after_marker = 1;
        }

        let indent = initial + indent_after_marker;

        let item_idx = state.tokens.len();
        let item_line = next_line;
        let src = state.src;
        let token = state.push("list_item_open", "li", Nesting::Opening);
        token.markup = markup.clone();
        if is_ordered {
            token.info = src[start..pos_after_marker - 1].to_string();
        }

        let old_tight = state.tight;
        let old_t_shift = state.t_shift[next_line];
        let old_s_count = state.s_count[next_line];

        let old_list_indent = state.list_indent;
        state.list_indent = state.blk_indent;
        state.blk_indent = indent;

        state.tight = true;
        state.t_shift[next_line] = content_start - state.b_marks[next_line];
        state.s_count[next_line] = offset;

        if content_start >= max && state.is_empty(next_line + 1) {
            // an item may begin with at most one blank line; skip it so the
            // empty item does not swallow the following paragraph
            state.line = (state.line + 2).min(end_line);
        } else {
            md.block.tokenize(state, next_line, end_line)?;
        }

        // a blank line between items makes the whole list loose
        if !state.tight || prev_empty_end {
            tight = false;
        }
        // a blank line at the end of this item loosens the list only if
        // another item follows
        prev_empty_end = state.line - next_line > 1 && state.is_empty(state.line - 1);

        state.blk_indent = state.list_indent;
        state.list_indent = old_list_indent;
        state.t_shift[next_line] = old_t_shift;
        state.s_count[next_line] = old_s_count;
        state.tight = old_tight;

        state.push("list_item_close", "li", Nesting::Closing).markup = markup.clone();

        next_line = state.line;
        state.tokens[item_idx].map = Some([item_line, next_line].into());

        if next_line >= end_line {
            break;
        }

        if state.s_count[next_line] < state.blk_indent {
            break;
        }

        if state.s_count[next_line] - state.blk_indent >= 4 {
            break;
        }

        let mut terminate = false;
        for rule in terminator_rules {
            if rule(state, next_line, end_line, true)? {
                terminate = true;
                break;
            }
        }
        if terminate {
            break;
        }

        let next_marker = if is_ordered {
            skip_ordered_marker(state, next_line)
        } else {
            skip_bullet_marker(state, next_line)
        };
        let Some(pos) = next_marker else {
            break;
        };
        pos_after_marker = pos;
        start = state.b_marks[next_line] + state.t_shift[next_line];

        // a different bullet or delimiter starts a new list
        if marker != state.byte_at(pos_after_marker - 1) {
            break;
        }
    }

    let close = if is_ordered {
        state.push("ordered_list_close", "ol", Nesting::Closing)
    } else {
        state.push("bullet_list_close", "ul", Nesting::Closing)
    };
    close.markup = markup;

    state.tokens[list_idx].map = Some([start_line, next_line].into());
    state.line = next_line;
    state.parent_type = old_parent_type;

    if tight {
        mark_tight_paragraphs(state, list_idx);
    }

    Ok(true)
}
