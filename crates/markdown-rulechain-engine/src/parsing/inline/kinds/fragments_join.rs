use crate::error::Result;
use crate::parsing::inline::StateInline;
use crate::token::{Nesting, Token};

/// Recomputes levels now that some text tokens became tags, and merges
/// adjacent text tokens left over from unmatched delimiters.
pub fn fragments_join(state: &mut StateInline<'_>) -> Result<()> {
    let tokens = std::mem::take(&mut *state.tokens);
    let mut joined: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut level = 0usize;

    for mut token in tokens {
        if token.nesting == Nesting::Closing {
            level = level.saturating_sub(1);
        }
        token.level = level;
        if token.nesting == Nesting::Opening {
            level += 1;
        }

        match joined.last_mut() {
            Some(prev) if prev.kind == "text" && token.kind == "text" => {
                prev.content.push_str(&token.content);
            }
            _ => joined.push(token),
        }
    }

    *state.tokens = joined;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::Markdown;
    use crate::env::Env;
    use pretty_assertions::assert_eq;

    #[test]
    fn unmatched_markers_merge_into_surrounding_text() {
        let md = Markdown::new();
        let mut env = Env::new();
        let mut tokens = Vec::new();
        md.inline.parse("a * b _ c", &md, &mut env, &mut tokens).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].content, "a * b _ c");
    }

    #[test]
    fn levels_follow_converted_tags() {
        let md = Markdown::new();
        let mut env = Env::new();
        let mut tokens = Vec::new();
        md.inline.parse("*a*", &md, &mut env, &mut tokens).unwrap();
        let levels: Vec<usize> = tokens.iter().map(|t| t.level).collect();
        assert_eq!(levels, vec![0, 1, 0]);
    }
}
