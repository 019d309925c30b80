//! # Block parser
//!
//! Scans the normalized source line by line. At each unconsumed line every
//! enabled block rule is tried in chain order; the first one that matches
//! pushes tokens and moves `state.line` past what it consumed.
//!
//! ## Rule contract
//!
//! A block rule receives `(state, start_line, end_line, silent)`. In silent
//! mode it only answers whether it would match, without pushing tokens or
//! moving the cursor. Alternate chains name the rules allowed to interrupt a
//! construct: `"paragraph"`, `"reference"`, `"blockquote"` and `"list"`.
//!
//! ## Key Invariants
//!
//! - A matching rule always advances `state.line`.
//! - Container rules restore every per-line array entry they patched.
//! - Nesting deeper than `max_nesting` keeps the rest of the range as one
//!   literal paragraph instead of recursing.

pub mod kinds;
mod state;

use std::sync::Arc;

pub use state::StateBlock;

use crate::Markdown;
use crate::env::Env;
use crate::error::{Error, Result};
use crate::ruler::Ruler;
use crate::token::{Nesting, Token};

pub type BlockRule = Arc<dyn Fn(&mut StateBlock<'_>, usize, usize, bool) -> Result<bool> + Send + Sync>;

/// Rules that may interrupt a paragraph, reference, blockquote or list.
const INTERRUPTS_ALL: &[&str] = &["paragraph", "reference", "blockquote", "list"];
const INTERRUPTS_NO_LIST: &[&str] = &["paragraph", "reference", "blockquote"];

/// Emits lines `[start_line, end_line)` as one paragraph without looking for
/// further block structure.
fn push_literal(state: &mut StateBlock<'_>, start_line: usize, end_line: usize) {
    let content = state
        .get_lines(start_line, end_line, state.blk_indent, false)
        .trim()
        .to_string();
    state.line = end_line;
    if content.is_empty() {
        return;
    }
    log::trace!("nesting limit reached at line {start_line}");

    let map = Some([start_line, end_line].into());
    state.push("paragraph_open", "p", Nesting::Opening).map = map;
    let token = state.push("inline", "", Nesting::SelfClosing);
    token.content = content;
    token.map = map;
    state.push("paragraph_close", "p", Nesting::Closing);
}

pub struct ParserBlock {
    pub ruler: Ruler<BlockRule>,
}

impl ParserBlock {
    pub fn new() -> Self {
        let mut ruler = Ruler::<BlockRule>::new();
        ruler.push("table", Arc::new(kinds::table::table), &["paragraph", "reference"]);
        ruler.push("code", Arc::new(kinds::code::code), &[]);
        ruler.push("fence", Arc::new(kinds::fence::fence), INTERRUPTS_ALL);
        ruler.push("blockquote", Arc::new(kinds::blockquote::blockquote), INTERRUPTS_ALL);
        ruler.push("hr", Arc::new(kinds::hr::hr), INTERRUPTS_ALL);
        ruler.push("list", Arc::new(kinds::list::list), INTERRUPTS_NO_LIST);
        ruler.push("reference", Arc::new(kinds::reference::reference), &[]);
        ruler.push("html_block", Arc::new(kinds::html_block::html_block), INTERRUPTS_NO_LIST);
        ruler.push("heading", Arc::new(kinds::heading::heading), INTERRUPTS_NO_LIST);
        ruler.push("lheading", Arc::new(kinds::lheading::lheading), &[]);
        ruler.push("paragraph", Arc::new(kinds::paragraph::paragraph), &[]);
        Self { ruler }
    }

    /// Runs the rule chain over lines `[start_line, end_line)`.
    pub fn tokenize(&self, state: &mut StateBlock<'_>, start_line: usize, end_line: usize) -> Result<()> {
        let rules = self.ruler.get_rules("");
        let max_nesting = state.md.options.max_nesting;
        let mut line = start_line;
        let mut has_empty_lines = false;

        while line < end_line {
            line = state.skip_empty_lines(line);
            state.line = line;
            if line >= end_line {
                break;
            }

            // nested calls (blockquotes, lists) end at the first outdented line
            if state.s_count[line] < state.blk_indent {
                break;
            }

            if state.level >= max_nesting {
                push_literal(state, line, end_line);
                break;
            }

            let prev_line = state.line;
            let mut matched = false;
            for rule in rules {
                if rule(state, line, end_line, false)? {
                    if prev_line >= state.line {
                        return Err(Error::BlockRuleNoProgress { line: prev_line });
                    }
                    matched = true;
                    break;
                }
            }
            if !matched {
                return Err(Error::NoBlockRuleMatched { line });
            }

            // an empty line before the current block makes the container loose
            state.tight = !has_empty_lines;

            line = state.line;

            // paragraphs may eat one trailing empty line in nested lists
            if line > 0 && line - 1 < end_line && state.is_empty(line - 1) {
                has_empty_lines = true;
            }

            if line < end_line && state.is_empty(line) {
                has_empty_lines = true;
                line += 1;
                state.line = line;
            }
        }
        Ok(())
    }

    /// Parses `src` into block tokens appended to `tokens`.
    pub fn parse(&self, src: &str, md: &Markdown, env: &mut Env, tokens: &mut Vec<Token>) -> Result<()> {
        if src.is_empty() {
            return Ok(());
        }
        let mut state = StateBlock::new(src, md, env, tokens);
        let (start, end) = (state.line, state.line_max);
        self.tokenize(&mut state, start, end)
    }
}

impl Default for ParserBlock {
    fn default() -> Self {
        Self::new()
    }
}
