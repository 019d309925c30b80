//! Link syntax scanners shared by the `reference` block rule and the `link`
//! and `image` inline rules.

use crate::common::unescape_all;
use crate::error::Result;
use crate::parsing::inline::StateInline;

/// Parenthesis depth limit inside an unbracketed destination.
const MAX_DESTINATION_PARENS: usize = 32;

/// A scanned destination or title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scanned {
    /// Unescaped text.
    pub value: String,
    /// Position right after the construct.
    pub pos: usize,
    /// Newlines crossed.
    pub lines: usize,
}

/// Finds the `]` closing the label whose `[` is at `start`, skipping over
/// nested inline constructs. Returns `None` when the label is unterminated
/// or, with `disable_nested`, contains a nested link.
///
/// `state.pos` is left unchanged.
pub fn parse_link_label(state: &mut StateInline<'_>, start: usize, disable_nested: bool) -> Result<Option<usize>> {
    let max = state.pos_max;
    let old_pos = state.pos;
    let md = state.md;

    state.pos = start + 1;
    let mut level = 1;
    let mut found = false;

    while state.pos < max {
        let marker = state.byte_at(state.pos);
        if marker == b']' {
            level -= 1;
            if level == 0 {
                found = true;
                break;
            }
        }

        let prev_pos = state.pos;
        md.inline.skip_token(state)?;
        if marker == b'[' {
            if prev_pos == state.pos - 1 {
                // a bare `[` that no rule consumed opens a nested bracket
                level += 1;
            } else if disable_nested {
                state.pos = old_pos;
                return Ok(None);
            }
        }
    }

    let label_end = found.then_some(state.pos);
    state.pos = old_pos;
    Ok(label_end)
}

/// Scans a link destination at `start`: either `<...>` or a run of
/// non-space characters with balanced parentheses.
pub fn parse_link_destination(src: &str, start: usize, max: usize) -> Option<Scanned> {
    let bytes = src.as_bytes();
    let mut pos = start;

    if bytes.get(pos) == Some(&b'<') {
        pos += 1;
        while pos < max {
            match bytes[pos] {
                b'\n' | b'<' => return None,
                b'>' => {
                    return Some(Scanned {
                        value: unescape_all(&src[start + 1..pos]).into_owned(),
                        pos: pos + 1,
                        lines: 0,
                    });
                }
                b'\\' if pos + 1 < max => pos += 2,
                _ => pos += 1,
            }
        }
        return None;
    }

    let mut level = 0;
    while pos < max {
        let code = bytes[pos];
        if code == b' ' {
            break;
        }
        // ascii control characters
        if code < 0x20 || code == 0x7F {
            break;
        }
        if code == b'\\' && pos + 1 < max {
            if bytes[pos + 1] == b' ' {
                break;
            }
            pos += 2;
            continue;
        }
        if code == b'(' {
            level += 1;
            if level > MAX_DESTINATION_PARENS {
                return None;
            }
        }
        if code == b')' {
            if level == 0 {
                break;
            }
            level -= 1;
        }
        pos += 1;
    }

    if start == pos || level != 0 {
        return None;
    }
    Some(Scanned {
        value: unescape_all(&src[start..pos]).into_owned(),
        pos,
        lines: 0,
    })
}

/// Scans a link title at `start`, quoted with `"`, `'` or parentheses.
pub fn parse_link_title(src: &str, start: usize, max: usize) -> Option<Scanned> {
    let bytes = src.as_bytes();
    let mut pos = start;
    let mut lines = 0;

    if pos >= max {
        return None;
    }

    let mut marker = bytes[pos];
    if marker != b'"' && marker != b'\'' && marker != b'(' {
        return None;
    }
    pos += 1;
    if marker == b'(' {
        marker = b')';
    }

    while pos < max {
        let code = bytes[pos];
        if code == marker {
            return Some(Scanned {
                value: unescape_all(&src[start + 1..pos]).into_owned(),
                pos: pos + 1,
                lines,
            });
        } else if code == b'(' && marker == b')' {
            return None;
        } else if code == b'\n' {
            lines += 1;
        } else if code == b'\\' && pos + 1 < max {
            pos += 1;
            if bytes[pos] == b'\n' {
                lines += 1;
            }
        }
        pos += 1;
    }
    None
}
