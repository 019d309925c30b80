//! `~~strikethrough~~`.

use crate::error::Result;
use crate::parsing::inline::{Delimiter, StateInline};
use crate::token::{Nesting, Token};

/// Turns a run of `~` into text tokens, registering one delimiter per pair.
pub fn tokenize(state: &mut StateInline<'_>, silent: bool) -> Result<bool> {
    if silent {
        return Ok(false);
    }
    let marker = state.byte_at(state.pos);
    if marker != b'~' {
        return Ok(false);
    }

    let scanned = state.scan_delims(state.pos, true);
    let mut len = scanned.length;
    if len < 2 {
        return Ok(false);
    }

    if len % 2 == 1 {
        state.push("text", "", Nesting::SelfClosing).content = "~".to_string();
        len -= 1;
    }

    for _ in (0..len).step_by(2) {
        state.push("text", "", Nesting::SelfClosing).content = "~~".to_string();
        let token = state.tokens.len() - 1;
        state.delimiters_mut().push(Delimiter {
            marker,
            // "rule of 3" does not apply
            length: 0,
            token,
            end: None,
            open: scanned.can_open,
            close: scanned.can_close,
        });
    }

    state.pos += scanned.length;
    Ok(true)
}

fn become_tag(token: &mut Token, kind: &str, nesting: Nesting) {
    token.kind = kind.to_string();
    token.tag = "s".to_string();
    token.nesting = nesting;
    token.markup = "~~".to_string();
    token.content.clear();
}

fn process_list(tokens: &mut [Token], delimiters: &[Delimiter]) {
    let mut lone_markers = Vec::new();

    for start in delimiters {
        if start.marker != b'~' {
            continue;
        }
        let Some(end) = start.end else {
            continue;
        };
        let end = &delimiters[end];

        become_tag(&mut tokens[start.token], "s_open", Nesting::Opening);
        become_tag(&mut tokens[end.token], "s_close", Nesting::Closing);

        let before_end = &tokens[end.token - 1];
        if before_end.kind == "text" && before_end.content == "~" {
            lone_markers.push(end.token - 1);
        }
    }

    // An odd run like `~~~~~` splits as `~` + `~~` + `~~`; the leftover `~`
    // belongs after the closing tags it precedes.
    while let Some(i) = lone_markers.pop() {
        let mut j = i + 1;
        while j < tokens.len() && tokens[j].kind == "s_close" {
            j += 1;
        }
        j -= 1;
        if i != j {
            tokens.swap(i, j);
        }
    }
}

/// Converts matched delimiter pairs into `s_open` / `s_close`.
pub fn post_process(state: &mut StateInline<'_>) -> Result<()> {
    for id in state.delimiter_list_ids() {
        process_list(&mut state.tokens[..], &state.delimiter_lists[id]);
    }
    Ok(())
}
