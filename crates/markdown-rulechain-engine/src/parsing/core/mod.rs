//! # Core pipeline
//!
//! The outermost rule chain. Its rules run once per document in order:
//! normalize the source, run the block parser, run the inline parser over
//! every `inline` token, then the optional token rewrites (linkify,
//! typographic replacements, smart quotes) and the final text merge.
//!
//! Core rules own the whole token stream, so plugins that need to see the
//! document at once (tables of contents, attribute syntaxes) belong here.

pub mod kinds;
mod state;

use std::sync::Arc;

pub use state::StateCore;

use crate::error::Result;
use crate::ruler::Ruler;

pub type CoreRule = Arc<dyn Fn(&mut StateCore<'_>) -> Result<()> + Send + Sync>;

pub struct ParserCore {
    pub ruler: Ruler<CoreRule>,
}

impl ParserCore {
    pub fn new() -> Self {
        let mut ruler = Ruler::<CoreRule>::new();
        ruler.push("normalize", Arc::new(kinds::normalize::normalize), &[]);
        ruler.push("block", Arc::new(kinds::block::block), &[]);
        ruler.push("inline", Arc::new(kinds::inline::inline), &[]);
        ruler.push("linkify", Arc::new(kinds::linkify::linkify), &[]);
        ruler.push("replacements", Arc::new(kinds::replacements::replacements), &[]);
        ruler.push("smartquotes", Arc::new(kinds::smartquotes::smartquotes), &[]);
        ruler.push("text_join", Arc::new(kinds::text_join::text_join), &[]);
        Self { ruler }
    }

    /// Runs every enabled core rule over `state`.
    pub fn process(&self, state: &mut StateCore<'_>) -> Result<()> {
        for rule in self.ruler.get_rules("") {
            rule(state)?;
        }
        Ok(())
    }
}

impl Default for ParserCore {
    fn default() -> Self {
        Self::new()
    }
}
