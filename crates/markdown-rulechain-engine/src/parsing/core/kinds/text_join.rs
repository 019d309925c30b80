use crate::error::Result;
use crate::parsing::core::StateCore;
use crate::token::Token;

/// Folds escapes and entities (`text_special`) back into plain text and
/// merges adjacent text tokens. Runs last so earlier rewrites can still tell
/// `\*` apart from `*`.
pub fn text_join(state: &mut StateCore<'_>) -> Result<()> {
    for block in state.tokens.iter_mut().filter(|t| t.kind == "inline") {
        let children = std::mem::take(&mut block.children);
        let mut joined: Vec<Token> = Vec::with_capacity(children.len());

        for mut token in children {
            if token.kind == "text_special" {
                token.kind = "text".to_string();
            }
            match joined.last_mut() {
                Some(prev) if prev.kind == "text" && token.kind == "text" => {
                    prev.content.push_str(&token.content);
                }
                _ => joined.push(token),
            }
        }

        block.children = joined;
    }
    Ok(())
}
