use crate::error::Result;
use crate::parsing::core::StateCore;
use crate::span::LineSpan;
use crate::token::{Nesting, Token};

/// Runs the block parser, or in inline mode wraps the whole source in a
/// single `inline` token.
pub fn block(state: &mut StateCore<'_>) -> Result<()> {
    if state.inline_mode {
        let mut token = Token::new("inline", "", Nesting::SelfClosing);
        token.content = state.src.clone();
        token.map = Some(LineSpan::new(0, 1));
        state.tokens.push(token);
        return Ok(());
    }

    let md = state.md;
    md.block.parse(&state.src, md, &mut *state.env, &mut state.tokens)
}
