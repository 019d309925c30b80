use std::sync::LazyLock;

use regex::Regex;

use crate::common::is_space;
use crate::error::Result;
use crate::parsing::blocks::StateBlock;
use crate::token::Nesting;

static ALIGN_CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:?-+:?$").expect("valid table align regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    None,
    Left,
    Center,
    Right,
}

impl Align {
    fn style(self) -> Option<&'static str> {
        match self {
            Align::None => None,
            Align::Left => Some("text-align:left"),
            Align::Center => Some("text-align:center"),
            Align::Right => Some("text-align:right"),
        }
    }
}

fn line_text<'s>(state: &StateBlock<'s>, line: usize) -> &'s str {
    let pos = state.b_marks[line] + state.t_shift[line];
    let max = state.e_marks[line];
    let src = state.src;
    &src[pos..max]
}

/// Splits a row on unescaped `|`. An escaped `\|` becomes a literal pipe.
fn escaped_split(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut result = Vec::new();
    let mut current = String::new();
    let mut last_pos = 0;
    let mut is_escaped = false;

    for (pos, &ch) in bytes.iter().enumerate() {
        if ch == b'|' {
            if is_escaped {
                current.push_str(&text[last_pos..pos - 1]);
                last_pos = pos;
            } else {
                current.push_str(&text[last_pos..pos]);
                result.push(std::mem::take(&mut current));
                last_pos = pos + 1;
            }
        }
        is_escaped = ch == b'\\';
    }
    current.push_str(&text[last_pos..]);
    result.push(current);
    result
}

/// Row cells without the empty ones produced by leading or trailing pipes.
fn row_cells(text: &str) -> Vec<String> {
    let mut columns = escaped_split(text);
    if columns.first().is_some_and(String::is_empty) {
        columns.remove(0);
    }
    if columns.last().is_some_and(String::is_empty) {
        columns.pop();
    }
    columns
}

/// Parses the delimiter row, e.g. `| :--- | ---: |`.
fn parse_aligns(text: &str) -> Option<Vec<Align>> {
    let columns: Vec<&str> = text.split('|').collect();
    let mut aligns = Vec::new();
    for (i, column) in columns.iter().enumerate() {
        let t = column.trim();
        if t.is_empty() {
            // empty cells are allowed only at the row edges
            if i == 0 || i == columns.len() - 1 {
                continue;
            }
            return None;
        }
        if !ALIGN_CELL_RE.is_match(t) {
            return None;
        }
        let align = match (t.starts_with(':'), t.ends_with(':')) {
            (true, true) => Align::Center,
            (false, true) => Align::Right,
            (true, false) => Align::Left,
            (false, false) => Align::None,
        };
        aligns.push(align);
    }
    Some(aligns)
}

fn is_delimiter_byte(ch: u8) -> bool {
    ch == b'|' || ch == b'-' || ch == b':'
}

/// GFM table: header row, delimiter row, then body rows.
pub fn table(state: &mut StateBlock<'_>, start_line: usize, end_line: usize, silent: bool) -> Result<bool> {
    // header and delimiter rows at least
    if start_line + 2 > end_line {
        return Ok(false);
    }

    let delimiter_line = start_line + 1;
    if state.s_count[delimiter_line] < state.blk_indent {
        return Ok(false);
    }
    if state.s_count[delimiter_line] - state.blk_indent >= 4 {
        return Ok(false);
    }

    // the delimiter row matches /^[-:|][-:|\s]*$/
    let mut pos = state.b_marks[delimiter_line] + state.t_shift[delimiter_line];
    let max = state.e_marks[delimiter_line];
    if pos >= max {
        return Ok(false);
    }
    let first = state.byte_at(pos);
    pos += 1;
    if !is_delimiter_byte(first) {
        return Ok(false);
    }
    if pos >= max {
        return Ok(false);
    }
    let second = state.byte_at(pos);
    pos += 1;
    if !is_delimiter_byte(second) && !is_space(second) {
        return Ok(false);
    }
    // "- " would be a list item
    if first == b'-' && is_space(second) {
        return Ok(false);
    }
    while pos < max {
        let ch = state.byte_at(pos);
        if !is_delimiter_byte(ch) && !is_space(ch) {
            return Ok(false);
        }
        pos += 1;
    }

    let Some(aligns) = parse_aligns(line_text(state, delimiter_line)) else {
        return Ok(false);
    };

    let header = line_text(state, start_line).trim();
    if !header.contains('|') {
        return Ok(false);
    }
    if state.s_count[start_line] - state.blk_indent >= 4 {
        return Ok(false);
    }
    let header_cells = row_cells(header);

    // the header fixes the column count; body rows may differ
    let column_count = header_cells.len();
    if column_count == 0 || column_count != aligns.len() {
        return Ok(false);
    }

    if silent {
        return Ok(true);
    }

    let old_parent_type = state.parent_type;
    state.parent_type = "table";
    let result = build_table(state, start_line, end_line, &aligns, header_cells);
    state.parent_type = old_parent_type;
    result.map(|()| true)
}

fn build_table(
    state: &mut StateBlock<'_>,
    start_line: usize,
    end_line: usize,
    aligns: &[Align],
    header_cells: Vec<String>,
) -> Result<()> {
    let md = state.md;
    // tables end like blockquotes do
    let terminator_rules = md.block.ruler.get_rules("blockquote");
    let column_count = header_cells.len();
    let max_autocompleted = i64::try_from(state.env.max_autocompleted_cells()).unwrap_or(i64::MAX);

    let table_idx = state.tokens.len();
    state.push("table_open", "table", Nesting::Opening);
    state.push("thead_open", "thead", Nesting::Opening).map = Some([start_line, start_line + 1].into());
    state.push("tr_open", "tr", Nesting::Opening).map = Some([start_line, start_line + 1].into());

    for (cell, align) in header_cells.into_iter().zip(aligns) {
        push_cell(state, "th", &cell, *align);
    }

    state.push("tr_close", "tr", Nesting::Closing);
    state.push("thead_close", "thead", Nesting::Closing);

    let mut tbody_idx = None;
    let mut autocompleted_cells: i64 = 0;
    let mut next_line = start_line + 2;

    'rows: while next_line < end_line {
        if state.s_count[next_line] < state.blk_indent {
            break;
        }
        for rule in terminator_rules {
            if rule(state, next_line, end_line, true)? {
                break 'rows;
            }
        }

        let text = line_text(state, next_line).trim();
        if text.is_empty() {
            break;
        }
        if state.s_count[next_line] - state.blk_indent >= 4 {
            break;
        }

        let cells = row_cells(text);
        // negative when rows are wider than the header; only growth is capped
        autocompleted_cells += column_count as i64 - cells.len() as i64;
        if autocompleted_cells > max_autocompleted {
            break;
        }

        if tbody_idx.is_none() {
            tbody_idx = Some(state.tokens.len());
            state.push("tbody_open", "tbody", Nesting::Opening);
        }

        state.push("tr_open", "tr", Nesting::Opening).map = Some([next_line, next_line + 1].into());
        for (i, align) in aligns.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            push_cell(state, "td", cell, *align);
        }
        state.push("tr_close", "tr", Nesting::Closing);

        next_line += 1;
    }

    if let Some(idx) = tbody_idx {
        state.push("tbody_close", "tbody", Nesting::Closing);
        state.tokens[idx].map = Some([start_line + 2, next_line].into());
    }
    state.push("table_close", "table", Nesting::Closing);
    state.tokens[table_idx].map = Some([start_line, next_line].into());

    state.line = next_line;
    Ok(())
}

fn push_cell(state: &mut StateBlock<'_>, tag: &str, content: &str, align: Align) {
    let open = state.push(&format!("{tag}_open"), tag, Nesting::Opening);
    if let Some(style) = align.style() {
        open.attr_push("style", style);
    }
    state.push("inline", "", Nesting::SelfClosing).content = content.trim().to_string();
    state.push(&format!("{tag}_close"), tag, Nesting::Closing);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Markdown;
    use crate::env::Env;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn renders_aligned_table() {
        let html = Markdown::new()
            .render("| a | b |\n|:--|--:|\n| 1 | 2 |")
            .unwrap();
        assert_eq!(
            html,
            "<table>\n<thead>\n<tr>\n<th style=\"text-align:left\">a</th>\n\
             <th style=\"text-align:right\">b</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n\
             <td style=\"text-align:left\">1</td>\n<td style=\"text-align:right\">2</td>\n\
             </tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn header_only_has_no_tbody() {
        let html = Markdown::new().render("a | b\n--- | ---").unwrap();
        assert_eq!(
            html,
            "<table>\n<thead>\n<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n</thead>\n</table>\n"
        );
    }

    #[rstest]
    #[case::column_mismatch("| a | b |\n| --- |")]
    #[case::no_pipe_in_header("a\n| --- |")]
    #[case::list_like_delimiter("| a |\n- --")]
    fn not_a_table(#[case] input: &str) {
        let tokens = Markdown::new().parse(input, &mut Env::new()).unwrap();
        assert!(tokens.iter().all(|t| t.kind != "table_open"));
    }

    #[test]
    fn short_rows_are_padded_and_capped() {
        let mut env = Env::new();
        env.max_autocompleted_cells = Some(1);
        let tokens = Markdown::new()
            .parse("| a | b |\n| - | - |\n| 1 |\n| 2 |", &mut env)
            .unwrap();
        let rows = tokens.iter().filter(|t| t.kind == "tr_open").count();
        // header plus the first short row; the second would exceed the cap
        assert_eq!(rows, 2);
    }

    #[rstest]
    #[case("a|b", vec!["a", "b"])]
    #[case(r"a\|b|c", vec!["a|b", "c"])]
    #[case("|a|", vec!["", "a", ""])]
    fn splits_on_unescaped_pipes(#[case] input: &str, #[case] expected: Vec<&str>) {
        assert_eq!(escaped_split(input), expected);
    }
}
