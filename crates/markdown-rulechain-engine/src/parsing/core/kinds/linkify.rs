//! Turns bare URLs and e-mail addresses in text tokens into links.
//!
//! Runs after the inline parser. Text inside Markdown links and inside raw
//! `<a>...</a>` HTML is left alone.

use crate::Markdown;
use crate::common::LinkMatch;
use crate::common::html_re::{is_link_close, is_link_open};
use crate::error::Result;
use crate::parsing::core::StateCore;
use crate::token::{Nesting, Token};

/// Display text for a match: scheme-less and `mailto:` links are normalized
/// with a scheme and then shown without it.
fn link_text(md: &Markdown, link: &LinkMatch) -> String {
    if link.schema.is_empty() {
        let normalized = (md.normalize_link_text)(&format!("http://{}", link.text));
        return normalized
            .strip_prefix("http://")
            .map(str::to_string)
            .unwrap_or(normalized);
    }
    if link.schema == "mailto:" && !link.text.to_ascii_lowercase().starts_with("mailto:") {
        let normalized = (md.normalize_link_text)(&format!("mailto:{}", link.text));
        return normalized
            .strip_prefix("mailto:")
            .map(str::to_string)
            .unwrap_or(normalized);
    }
    (md.normalize_link_text)(&link.text)
}

fn text_token(content: &str, level: usize) -> Token {
    let mut token = Token::new("text", "", Nesting::SelfClosing);
    token.content = content.to_string();
    token.level = level;
    token
}

/// Splits one text token into text and link tokens.
fn split_links(md: &Markdown, text: &str, level: usize, links: &[LinkMatch]) -> Vec<Token> {
    let mut nodes = Vec::new();
    let mut last_pos = 0;

    for link in links {
        let full_url = (md.normalize_link)(&link.url);
        if !(md.validate_link)(&full_url) {
            continue;
        }

        if link.index > last_pos {
            nodes.push(text_token(&text[last_pos..link.index], level));
        }

        let mut open = Token::new("link_open", "a", Nesting::Opening);
        open.attrs = vec![("href".to_string(), full_url)];
        open.level = level;
        open.markup = "linkify".to_string();
        open.info = "auto".to_string();
        nodes.push(open);

        nodes.push(text_token(&link_text(md, link), level + 1));

        let mut close = Token::new("link_close", "a", Nesting::Closing);
        close.level = level;
        close.markup = "linkify".to_string();
        close.info = "auto".to_string();
        nodes.push(close);

        last_pos = link.last_index;
    }

    if last_pos < text.len() {
        nodes.push(text_token(&text[last_pos..], level));
    }
    nodes
}

fn linkify_children(md: &Markdown, tokens: &mut Vec<Token>) {
    let mut html_link_level = 0usize;

    // backwards, so splicing never shifts unvisited tokens
    let mut i = tokens.len();
    while i > 0 {
        i -= 1;

        if tokens[i].kind == "link_close" {
            let level = tokens[i].level;
            while i > 0 {
                i -= 1;
                if tokens[i].level == level || tokens[i].kind == "link_open" {
                    break;
                }
            }
            continue;
        }

        if tokens[i].kind == "html_inline" {
            if is_link_open(&tokens[i].content) && html_link_level > 0 {
                html_link_level -= 1;
            }
            if is_link_close(&tokens[i].content) {
                html_link_level += 1;
            }
        }
        if html_link_level > 0 {
            continue;
        }

        if tokens[i].kind != "text" || !md.linkify.test(&tokens[i].content) {
            continue;
        }

        let mut links = md.linkify.matches(&tokens[i].content);
        // `http\://x` must not become `http:<a href="//x">`
        if links.first().is_some_and(|l| l.index == 0) && i > 0 && tokens[i - 1].kind == "text_special" {
            links.remove(0);
        }

        let nodes = split_links(md, &tokens[i].content, tokens[i].level, &links);
        tokens.splice(i..=i, nodes);
    }
}

pub fn linkify(state: &mut StateCore<'_>) -> Result<()> {
    let md = state.md;
    if !md.options.linkify {
        return Ok(());
    }

    for token in state.tokens.iter_mut() {
        if token.kind != "inline" || !md.linkify.pretest(&token.content) {
            continue;
        }
        linkify_children(md, &mut token.children);
    }
    Ok(())
}
