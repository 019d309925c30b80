use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::parsing::core::StateCore;

static NEWLINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n?").expect("valid newline regex"));

/// Folds `\r\n` and lone `\r` into `\n` and replaces NUL with U+FFFD.
pub fn normalize(state: &mut StateCore<'_>) -> Result<()> {
    if !state.src.contains(['\r', '\0']) {
        return Ok(());
    }
    state.src = NEWLINES_RE
        .replace_all(&state.src, "\n")
        .replace('\0', "\u{FFFD}");
    Ok(())
}
