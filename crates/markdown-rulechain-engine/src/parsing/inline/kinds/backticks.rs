use crate::error::Result;
use crate::parsing::inline::StateInline;
use crate::token::Nesting;

/// Code span: a backtick run closed by a run of the same length.
///
/// Closer positions seen while scanning are remembered per run length, so a
/// string with many unmatched openers is scanned only once.
pub fn backticks(state: &mut StateInline<'_>, silent: bool) -> Result<bool> {
    let start = state.pos;
    if state.byte_at(start) != b'`' {
        return Ok(false);
    }

    let max = state.pos_max;
    let src = state.src;
    let mut pos = start + 1;
    while pos < max && state.byte_at(pos) == b'`' {
        pos += 1;
    }

    let marker = &src[start..pos];
    let opener_length = marker.len();

    let no_closer_after = state
        .backticks
        .get(&opener_length)
        .is_none_or(|&last| last <= start);
    if state.backticks_scanned && no_closer_after {
        if !silent {
            state.pending.push_str(marker);
        }
        state.pos += opener_length;
        return Ok(true);
    }

    let mut match_end = pos;
    while let Some(offset) = src[match_end..].find('`') {
        let match_start = match_end + offset;
        match_end = match_start + 1;
        while match_end < max && state.byte_at(match_end) == b'`' {
            match_end += 1;
        }

        let closer_length = match_end - match_start;
        if closer_length == opener_length {
            if !silent {
                let content = code_content(&src[pos..match_start]);
                let token = state.push("code_inline", "code", Nesting::SelfClosing);
                token.markup = marker.to_string();
                token.content = content;
            }
            state.pos = match_end;
            return Ok(true);
        }

        // upper bound for where a closer of this length can be found
        state.backticks.insert(closer_length, match_start);
    }

    state.backticks_scanned = true;
    if !silent {
        state.pending.push_str(marker);
    }
    state.pos += opener_length;
    Ok(true)
}

/// Line endings become spaces; one space is stripped from each side when
/// both sides have one and something lies between.
fn code_content(raw: &str) -> String {
    let content = raw.replace('\n', " ");
    if content.len() >= 3 && content.starts_with(' ') && content.ends_with(' ') {
        content[1..content.len() - 1].to_string()
    } else {
        content
    }
}
