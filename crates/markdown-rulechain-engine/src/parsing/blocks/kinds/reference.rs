use crate::common::{is_space, normalize_reference};
use crate::env::Reference;
use crate::error::Result;
use crate::parsing::blocks::StateBlock;
use crate::parsing::helpers::{parse_link_destination, parse_link_title};

/// Link reference definition: `[label]: destination "title"`.
///
/// Produces no tokens; the definition is stored in `env.references`.
pub fn reference(state: &mut StateBlock<'_>, start_line: usize, _end_line: usize, silent: bool) -> Result<bool> {
    let mut pos = state.b_marks[start_line] + state.t_shift[start_line];
    let max = state.e_marks[start_line];

    if state.s_count[start_line] - state.blk_indent >= 4 {
        return Ok(false);
    }
    if state.byte_at(pos) != b'[' {
        return Ok(false);
    }

    // quick reject for `[link](url)` at line start
    loop {
        pos += 1;
        if pos >= max {
            break;
        }
        if state.byte_at(pos) == b']' && state.byte_at(pos - 1) != b'\\' {
            if pos + 1 == max || state.byte_at(pos + 1) != b':' {
                return Ok(false);
            }
            break;
        }
    }

    let old_parent_type = state.parent_type;
    state.parent_type = "reference";
    let result = scan_definition(state, start_line, silent);
    state.parent_type = old_parent_type;
    result
}

fn scan_definition(state: &mut StateBlock<'_>, start_line: usize, silent: bool) -> Result<bool> {
    let md = state.md;
    let end_line = state.line_max;
    let terminator_rules = md.block.ruler.get_rules("reference");

    // definitions run until an empty line or another block
    let mut next_line = start_line + 1;
    'lines: while next_line < end_line && !state.is_empty(next_line) {
        // indented or lazy lines are continuation text here
        if state.s_count[next_line] - state.blk_indent > 3 || state.s_count[next_line] < 0 {
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

    let text = state.get_lines(start_line, next_line, state.blk_indent, false);
    let text = text.trim();
    let bytes = text.as_bytes();
    let max = bytes.len();
    let mut lines = 0;

    let mut label_end = None;
    let mut pos = 1;
    while pos < max {
        match bytes[pos] {
            b'[' => return Ok(false),
            b']' => {
                label_end = Some(pos);
                break;
            }
            b'\n' => lines += 1,
            b'\\' => {
                pos += 1;
                if pos < max && bytes[pos] == b'\n' {
                    lines += 1;
                }
            }
            _ => {}
        }
        pos += 1;
    }

    let Some(label_end) = label_end else {
        return Ok(false);
    };
    if bytes.get(label_end + 1) != Some(&b':') {
        return Ok(false);
    }

    pos = label_end + 2;
    while pos < max {
        match bytes[pos] {
            b'\n' => lines += 1,
            ch if is_space(ch) => {}
            _ => break,
        }
        pos += 1;
    }

    let Some(destination) = parse_link_destination(text, pos, max) else {
        return Ok(false);
    };
    let href = (md.normalize_link)(&destination.value);
    if !(md.validate_link)(&href) {
        return Ok(false);
    }
    pos = destination.pos;
    lines += destination.lines;

    // rollback point if the title turns out to be followed by garbage
    let dest_end_pos = pos;
    let dest_end_lines = lines;

    let title_start = pos;
    while pos < max {
        match bytes[pos] {
            b'\n' => lines += 1,
            ch if is_space(ch) => {}
            _ => break,
        }
        pos += 1;
    }

    let mut title = String::new();
    match parse_link_title(text, pos, max) {
        Some(scanned) if pos < max && title_start != pos => {
            title = scanned.value;
            pos = scanned.pos;
            lines += scanned.lines;
        }
        _ => {
            pos = dest_end_pos;
            lines = dest_end_lines;
        }
    }

    pos = skip_spaces(bytes, pos);
    if pos < max && bytes[pos] != b'\n' && !title.is_empty() {
        // the definition may still be valid without the title
        title.clear();
        pos = skip_spaces(bytes, dest_end_pos);
        lines = dest_end_lines;
    }

    if pos < max && bytes[pos] != b'\n' {
        return Ok(false);
    }

    let label = normalize_reference(&text[1..label_end]);
    if label.is_empty() {
        return Ok(false);
    }

    // a definition never interrupts another block
    if silent {
        return Ok(true);
    }

    state
        .env
        .references
        .entry(label)
        .or_insert(Reference { href, title });

    state.line = start_line + lines + 1;
    Ok(true)
}

fn skip_spaces(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_space(bytes[pos]) {
        pos += 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use crate::Markdown;
    use crate::env::{Env, Reference};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::basic("[foo]: /url \"title\"\n\n[foo]", "<p><a href=\"/url\" title=\"title\">foo</a></p>\n")]
    #[case::first_definition_wins("[foo]: /first\n[foo]: /second\n\n[foo]", "<p><a href=\"/first\">foo</a></p>\n")]
    #[case::case_insensitive("[FOO]: /url\n\n[Foo]", "<p><a href=\"/url\">Foo</a></p>\n")]
    #[case::multiline_title("[foo]: /url '\ntitle\n'\n\n[foo]", "<p><a href=\"/url\" title=\"\ntitle\n\">foo</a></p>\n")]
    #[case::garbage_after_title("[foo]: /url \"title\" ok", "<p>[foo]: /url &quot;title&quot; ok</p>\n")]
    #[case::title_on_next_line_rolled_back("[foo]: /url\n\"title\" ok", "<p>&quot;title&quot; ok</p>\n")]
    #[case::empty_label("[]: /url", "<p>[]: /url</p>\n")]
    #[case::not_a_definition("[foo](/url)", "<p><a href=\"/url\">foo</a></p>\n")]
    fn definitions(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Markdown::new().render(input).unwrap(), expected);
    }

    #[test]
    fn definitions_land_in_env() {
        let md = Markdown::new();
        let mut env = Env::new();
        let tokens = md.parse("[Foo  Bar]: <my url> 'T'", &mut env).unwrap();
        assert!(tokens.is_empty());
        assert_eq!(
            env.references.get("FOO BAR"),
            Some(&Reference {
                href: "my%20url".to_string(),
                title: "T".to_string(),
            })
        );
    }
}
