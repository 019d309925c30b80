use crate::error::Result;
use crate::parsing::core::StateCore;

/// Fills the children of every `inline` token.
pub fn inline(state: &mut StateCore<'_>) -> Result<()> {
    let md = state.md;
    for token in state.tokens.iter_mut().filter(|t| t.kind == "inline") {
        md.inline.parse(&token.content, md, &mut *state.env, &mut token.children)?;
    }
    Ok(())
}
