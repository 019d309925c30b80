use crate::error::Result;
use crate::parsing::inline::StateInline;

/// Bytes that may start some other inline construct. Everything else is
/// swallowed into pending text in one go.
fn is_terminator(byte: u8) -> bool {
    matches!(
        byte,
        b'\n'
            | b'!'
            | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'*'
            | b'+'
            | b'-'
            | b':'
            | b'<'
            | b'='
            | b'@'
            | b'['
            | b'\\'
            | b']'
            | b'^'
            | b'_'
            | b'`'
            | b'{'
            | b'}'
            | b'~'
    )
}

pub fn text(state: &mut StateInline<'_>, silent: bool) -> Result<bool> {
    let start = state.pos;
    let mut pos = start;
    while pos < state.pos_max && !is_terminator(state.byte_at(pos)) {
        pos += 1;
    }
    if pos == start {
        return Ok(false);
    }

    if !silent {
        let src = state.src;
        state.pending.push_str(&src[start..pos]);
    }
    state.pos = pos;
    Ok(true)
}
