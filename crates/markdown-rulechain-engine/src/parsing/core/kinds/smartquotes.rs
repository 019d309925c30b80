//! Converts straight quotes into typographic ones when `typographer` is on.
//!
//! Quotes are paired per nesting level across the text tokens of one inline
//! run. A quote that cannot be paired inside a word becomes an apostrophe.

use crate::Markdown;
use crate::common::{is_md_ascii_punct, is_punct_char, is_white_space};
use crate::error::Result;
use crate::parsing::core::StateCore;
use crate::token::Token;

const APOSTROPHE: &str = "\u{2019}";

/// An opening quote waiting for its partner.
struct OpenQuote {
    token: usize,
    pos: usize,
    single: bool,
    level: usize,
}

/// Replaces the one-byte quote at `index`.
fn replace_at(text: &mut String, index: usize, with: &str) {
    text.replace_range(index..index + 1, with);
}

fn is_break(token: &Token) -> bool {
    token.kind == "softbreak" || token.kind == "hardbreak"
}

/// Last character before the quote, looking into earlier tokens of the same
/// line. Line starts count as a space.
fn char_before(tokens: &[Token], i: usize, index: usize) -> char {
    if index > 0 {
        return tokens[i].content[..index].chars().next_back().unwrap_or(' ');
    }
    for token in tokens[..i].iter().rev() {
        if is_break(token) {
            break;
        }
        if let Some(ch) = token.content.chars().next_back() {
            return ch;
        }
    }
    ' '
}

/// First character after the quote; see [`char_before`].
fn char_after(tokens: &[Token], i: usize, pos: usize) -> char {
    if pos < tokens[i].content.len() {
        return tokens[i].content[pos..].chars().next().unwrap_or(' ');
    }
    for token in &tokens[i + 1..] {
        if is_break(token) {
            break;
        }
        if let Some(ch) = token.content.chars().next() {
            return ch;
        }
    }
    ' '
}

fn process_inlines(tokens: &mut [Token], md: &Markdown) {
    let quotes = &md.options.quotes;
    let mut stack: Vec<OpenQuote> = Vec::new();

    for i in 0..tokens.len() {
        let this_level = tokens[i].level;
        while stack.last().is_some_and(|item| item.level > this_level) {
            stack.pop();
        }

        if tokens[i].kind != "text" {
            continue;
        }

        let mut pos = 0;
        'outer: while let Some(offset) = tokens[i].content[pos..].find(['\'', '"']) {
            let index = pos + offset;
            let is_single = tokens[i].content.as_bytes()[index] == b'\'';
            pos = index + 1;

            let last_char = char_before(tokens, i, index);
            let next_char = char_after(tokens, i, pos);

            let is_last_punct = is_md_ascii_punct(last_char) || is_punct_char(last_char);
            let is_next_punct = is_md_ascii_punct(next_char) || is_punct_char(next_char);
            let is_last_white = is_white_space(last_char);
            let is_next_white = is_white_space(next_char);

            let mut can_open = !is_next_white && (!is_next_punct || is_last_white || is_last_punct);
            let mut can_close = !is_last_white && (!is_last_punct || is_next_white || is_next_punct);

            // 1"" reads as an inch mark followed by an empty quote
            if next_char == '"' && !is_single && last_char.is_ascii_digit() {
                can_open = false;
                can_close = false;
            }

            if can_open && can_close {
                // inside a word stays literal, between punctuation converts
                can_open = is_last_punct;
                can_close = is_next_punct;
            }

            if !can_open && !can_close {
                if is_single {
                    replace_at(&mut tokens[i].content, index, APOSTROPHE);
                    pos = index + APOSTROPHE.len();
                }
                continue;
            }

            if can_close {
                for j in (0..stack.len()).rev() {
                    let item = &stack[j];
                    if item.level < this_level {
                        break;
                    }
                    if item.single != is_single || item.level != this_level {
                        continue;
                    }

                    let (open, close) = if is_single {
                        (quotes.single_open(), quotes.single_close())
                    } else {
                        (quotes.double_open(), quotes.double_close())
                    };

                    // the closer sits after the opener, so replace it first
                    replace_at(&mut tokens[i].content, index, close);
                    let (item_token, item_pos) = (item.token, item.pos);
                    replace_at(&mut tokens[item_token].content, item_pos, open);

                    pos = index + close.len();
                    if item_token == i {
                        pos += open.len() - 1;
                    }
                    stack.truncate(j);
                    continue 'outer;
                }
            }

            if can_open {
                stack.push(OpenQuote {
                    token: i,
                    pos: index,
                    single: is_single,
                    level: this_level,
                });
            } else if can_close && is_single {
                replace_at(&mut tokens[i].content, index, APOSTROPHE);
                pos = index + APOSTROPHE.len();
            }
        }
    }
}

pub fn smartquotes(state: &mut StateCore<'_>) -> Result<()> {
    let md = state.md;
    if !md.options.typographer {
        return Ok(());
    }

    for token in state.tokens.iter_mut().rev() {
        if token.kind != "inline" || !token.content.contains(['\'', '"']) {
            continue;
        }
        process_inlines(&mut token.children, md);
    }
    Ok(())
}
