//! Typographic replacements, applied to text tokens when `typographer` is on:
//!
//! - `(c)` `(r)` `(tm)` become `©` `®` `™`
//! - `+-` becomes `±`
//! - `..` and longer become `…`, except after `?` and `!`
//! - runs of four or more `?`/`!` shrink to three, `,,` to `,`
//! - `---` becomes an em dash, `--` an en dash
//!
//! Text inside autolinks is never touched.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::Result;
use crate::parsing::core::StateCore;
use crate::token::Token;

static RARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+-|\.\.|\?\?\?\?|!!!!|,,|--").expect("valid replacements regex"));

static SCOPED_ABBR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\((c|tm|r)\)").expect("valid abbreviation regex"));

static ELLIPSIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.{2,}").expect("valid ellipsis regex"));

static PUNCT_ELLIPSIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([?!])…").expect("valid punctuation ellipsis regex"));

static PUNCT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([?!]){4,}").expect("valid punctuation run regex"));

static COMMAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",{2,}").expect("valid comma regex"));

fn replace_abbr(caps: &Captures<'_>) -> &'static str {
    match caps[1].to_ascii_lowercase().as_str() {
        "c" => "©",
        "r" => "®",
        _ => "™",
    }
}

/// Replaces dash runs of exactly three with an em dash, and runs of exactly
/// two with an en dash when both neighbors are whitespace (or a line
/// boundary) or both are not.
fn replace_dashes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '-' {
            out.push(ch);
            prev = Some(ch);
            continue;
        }

        let mut run = 1;
        while chars.peek() == Some(&'-') {
            chars.next();
            run += 1;
        }
        let next = chars.peek().copied();

        let before_space = prev.is_none_or(char::is_whitespace);
        let after_space = next.is_none_or(char::is_whitespace);
        let before_word = prev.is_none_or(|c| !c.is_whitespace());
        let after_word = next.is_none_or(|c| !c.is_whitespace());

        match run {
            3 => out.push('\u{2014}'),
            2 if (before_space && after_space) || (before_word && after_word) => out.push('\u{2013}'),
            _ => out.extend(std::iter::repeat_n('-', run)),
        }
        prev = Some('-');
    }
    out
}

fn replace_rare_text(text: &str) -> String {
    let text = text.replace("+-", "±");
    let text = ELLIPSIS_RE.replace_all(&text, "…");
    let text = PUNCT_ELLIPSIS_RE.replace_all(&text, "$1..");
    let text = PUNCT_RUN_RE.replace_all(&text, "${1}${1}${1}");
    let text = COMMAS_RE.replace_all(&text, ",");
    replace_dashes(&text)
}

/// Applies `replace` to text tokens outside autolinks, walking backwards.
fn for_each_text_outside_autolinks(tokens: &mut [Token], mut replace: impl FnMut(&str) -> String) {
    let mut inside_autolink = 0i32;
    for token in tokens.iter_mut().rev() {
        if token.kind == "text" && inside_autolink == 0 {
            token.content = replace(&token.content);
        }
        if token.info == "auto" {
            match token.kind.as_str() {
                "link_open" => inside_autolink -= 1,
                "link_close" => inside_autolink += 1,
                _ => {}
            }
        }
    }
}

pub fn replacements(state: &mut StateCore<'_>) -> Result<()> {
    if !state.md.options.typographer {
        return Ok(());
    }

    for token in state.tokens.iter_mut().rev().filter(|t| t.kind == "inline") {
        if SCOPED_ABBR_RE.is_match(&token.content) {
            for_each_text_outside_autolinks(&mut token.children, |text| {
                SCOPED_ABBR_RE.replace_all(text, replace_abbr).into_owned()
            });
        }
        if RARE_RE.is_match(&token.content) {
            for_each_text_outside_autolinks(&mut token.children, |text| {
                if RARE_RE.is_match(text) {
                    replace_rare_text(text)
                } else {
                    text.to_string()
                }
            });
        }
    }
    Ok(())
}
