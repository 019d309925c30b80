//! # Inline parser
//!
//! Turns the content of one `inline` token into child tokens.
//!
//! Two rule chains run per string:
//!
//! - `ruler`: tokenizing rules, tried in order at each position. Anything no
//!   rule claims is collected into `pending` and flushed as a text token.
//! - `ruler2`: post-processing rules run once over the finished token list,
//!   pairing emphasis and strikethrough delimiters and merging text.
//!
//! `skip_token` runs the tokenizing rules in silent mode to find where the
//! construct at the cursor ends; link label scanning relies on it. Results
//! are cached per start position.

pub mod kinds;
mod state;

use std::sync::Arc;

pub use state::{Delimiter, DelimiterRun, StateInline};

use crate::Markdown;
use crate::env::Env;
use crate::error::{Error, Result};
use crate::ruler::Ruler;
use crate::token::Token;

pub type InlineRule = Arc<dyn Fn(&mut StateInline<'_>, bool) -> Result<bool> + Send + Sync>;
pub type InlineRule2 = Arc<dyn Fn(&mut StateInline<'_>) -> Result<()> + Send + Sync>;

pub struct ParserInline {
    pub ruler: Ruler<InlineRule>,
    pub ruler2: Ruler<InlineRule2>,
}

impl ParserInline {
    pub fn new() -> Self {
        let mut ruler = Ruler::<InlineRule>::new();
        ruler.push("text", Arc::new(kinds::text::text), &[]);
        ruler.push("linkify", Arc::new(kinds::linkify::linkify), &[]);
        ruler.push("newline", Arc::new(kinds::newline::newline), &[]);
        ruler.push("escape", Arc::new(kinds::escape::escape), &[]);
        ruler.push("backticks", Arc::new(kinds::backticks::backticks), &[]);
        ruler.push("strikethrough", Arc::new(kinds::strikethrough::tokenize), &[]);
        ruler.push("emphasis", Arc::new(kinds::emphasis::tokenize), &[]);
        ruler.push("link", Arc::new(kinds::link::link), &[]);
        ruler.push("image", Arc::new(kinds::image::image), &[]);
        ruler.push("autolink", Arc::new(kinds::autolink::autolink), &[]);
        ruler.push("html_inline", Arc::new(kinds::html_inline::html_inline), &[]);
        ruler.push("entity", Arc::new(kinds::entity::entity), &[]);

        let mut ruler2 = Ruler::<InlineRule2>::new();
        ruler2.push("balance_pairs", Arc::new(kinds::balance_pairs::balance_pairs), &[]);
        ruler2.push("strikethrough", Arc::new(kinds::strikethrough::post_process), &[]);
        ruler2.push("emphasis", Arc::new(kinds::emphasis::post_process), &[]);
        ruler2.push("fragments_join", Arc::new(kinds::fragments_join::fragments_join), &[]);

        Self { ruler, ruler2 }
    }

    /// Advances `state.pos` past the construct at the cursor without
    /// producing tokens.
    pub fn skip_token(&self, state: &mut StateInline<'_>) -> Result<()> {
        let pos = state.pos;
        if let Some(&cached) = state.cache.get(&pos) {
            state.pos = cached;
            return Ok(());
        }

        let rules = self.ruler.get_rules("");
        let max_nesting = state.md.options.max_nesting;
        let mut ok = false;

        if state.level < max_nesting {
            for rule in rules {
                // silent rules must not recurse deeper than real ones
                state.level += 1;
                let matched = rule(state, true);
                state.level -= 1;
                ok = matched?;
                if ok {
                    if pos >= state.pos {
                        return Err(Error::InlineRuleNoProgress { pos });
                    }
                    break;
                }
            }
        } else {
            // too deep: treat the rest as plain text
            state.pos = state.pos_max;
        }

        if !ok {
            let len = state.char_len_at(state.pos);
            state.pos += len;
        }
        state.cache.insert(pos, state.pos);
        Ok(())
    }

    /// Runs the tokenizing rules from `state.pos` to `state.pos_max`.
    pub fn tokenize(&self, state: &mut StateInline<'_>) -> Result<()> {
        let rules = self.ruler.get_rules("");
        let end = state.pos_max;
        let max_nesting = state.md.options.max_nesting;

        while state.pos < end {
            let prev_pos = state.pos;
            let mut ok = false;

            if state.level < max_nesting {
                for rule in rules {
                    if rule(state, false)? {
                        if prev_pos >= state.pos {
                            return Err(Error::InlineRuleNoProgress { pos: prev_pos });
                        }
                        ok = true;
                        break;
                    }
                }
            }

            if ok {
                if state.pos >= end {
                    break;
                }
                continue;
            }

            let len = state.char_len_at(state.pos);
            let next = (state.pos + len).min(state.src.len());
            state.pending.push_str(&state.src[state.pos..next]);
            state.pos += len;
        }

        if !state.pending.is_empty() {
            state.push_pending();
        }
        Ok(())
    }

    /// Parses `src` into `tokens`, then runs the post-processing chain.
    pub fn parse(&self, src: &str, md: &Markdown, env: &mut Env, tokens: &mut Vec<Token>) -> Result<()> {
        let mut state = StateInline::new(src, md, env, tokens);
        self.tokenize(&mut state)?;
        for rule in self.ruler2.get_rules("") {
            rule(&mut state)?;
        }
        Ok(())
    }
}

impl Default for ParserInline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unclaimed_text_becomes_one_text_token() {
        let md = Markdown::new();
        let mut env = Env::new();
        let mut tokens = Vec::new();
        md.inline.parse("héllo wörld", &md, &mut env, &mut tokens).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, "text");
        assert_eq!(tokens[0].content, "héllo wörld");
    }

    #[test]
    fn rule_that_matches_without_advancing_is_an_error() {
        let mut md = Markdown::new();
        md.inline
            .ruler
            .before(
                "text",
                "stuck",
                Arc::new(|_state: &mut StateInline<'_>, _silent: bool| -> Result<bool> { Ok(true) }),
                &[],
            )
            .unwrap();
        let err = md.render_inline("abc").unwrap_err();
        assert!(matches!(err, Error::InlineRuleNoProgress { pos: 0 }));
        assert!(err.to_string().contains("inline rule didn't increment state.pos"));
    }

    #[test]
    fn skip_token_caches_by_position() {
        let md = Markdown::new();
        let mut env = Env::new();
        let mut tokens = Vec::new();
        let mut state = StateInline::new("`code` rest", &md, &mut env, &mut tokens);
        md.inline.skip_token(&mut state).unwrap();
        assert_eq!(state.pos, 6);
        assert_eq!(state.cache.get(&0), Some(&6));
        assert!(state.tokens.is_empty());
    }
}
