use crate::Markdown;
use crate::env::Env;
use crate::token::Token;

/// Whole-document state threaded through the core chain.
pub struct StateCore<'a> {
    /// Source text; `normalize` rewrites it in place.
    pub src: String,
    pub env: &'a mut Env,
    pub md: &'a Markdown,
    pub tokens: Vec<Token>,
    /// Parse `src` as a single inline run, skipping block rules.
    pub inline_mode: bool,
}

impl<'a> StateCore<'a> {
    pub fn new(src: &str, md: &'a Markdown, env: &'a mut Env) -> Self {
        Self {
            src: src.to_string(),
            env,
            md,
            tokens: Vec::new(),
            inline_mode: false,
        }
    }
}
