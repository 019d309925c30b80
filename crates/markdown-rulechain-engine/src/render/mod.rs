//! # HTML renderer
//!
//! Walks a token stream and concatenates one HTML fragment per token.
//!
//! Token kinds with an entry in [`Renderer::rules`] are rendered by that
//! rule; everything else goes through [`Renderer::render_token`], which
//! prints the token as a plain tag from its `tag`, `attrs` and `nesting`.
//! Plugins add or replace entries with [`Renderer::set_rule`].
//!
//! ## Newlines
//!
//! Block tokens end with `\n` unless an opening tag is directly followed by
//! its inline content, a hidden token, or its own closing tag. Hidden tokens
//! (paragraphs of tight lists) print nothing, and the next block opener after
//! one starts on a new line.

mod rules;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::common::escape_html;
use crate::env::Env;
use crate::error::Result;
use crate::options::Options;
use crate::token::{Nesting, Token};

/// `(tokens, idx, options, env, renderer) -> html` for `tokens[idx]`.
pub type RenderRule =
    Arc<dyn Fn(&[Token], usize, &Options, &Env, &Renderer) -> Result<String> + Send + Sync>;

pub struct Renderer {
    pub rules: HashMap<String, RenderRule>,
}

impl Renderer {
    pub fn new() -> Self {
        let mut renderer = Self {
            rules: HashMap::new(),
        };
        renderer.set_rule("code_inline", Arc::new(rules::code_inline));
        renderer.set_rule("code_block", Arc::new(rules::code_block));
        renderer.set_rule("fence", Arc::new(rules::fence));
        renderer.set_rule("image", Arc::new(rules::image));
        renderer.set_rule("hardbreak", Arc::new(rules::hardbreak));
        renderer.set_rule("softbreak", Arc::new(rules::softbreak));
        renderer.set_rule("text", Arc::new(rules::text));
        renderer.set_rule("html_block", Arc::new(rules::html_block));
        renderer.set_rule("html_inline", Arc::new(rules::html_inline));
        renderer
    }

    /// Registers `rule` for token kind `kind`, returning the rule it
    /// replaced.
    pub fn set_rule(&mut self, kind: &str, rule: RenderRule) -> Option<RenderRule> {
        self.rules.insert(kind.to_string(), rule)
    }

    pub fn rule(&self, kind: &str) -> Option<&RenderRule> {
        self.rules.get(kind)
    }

    /// ` name="value"` for each pair, both sides escaped.
    pub fn render_attrs(&self, attrs: &[(String, String)]) -> String {
        attrs
            .iter()
            .map(|(name, value)| format!(" {}=\"{}\"", escape_html(name), escape_html(value)))
            .collect()
    }

    /// Generic tag output for `tokens[idx]`.
    pub fn render_token(&self, tokens: &[Token], idx: usize, options: &Options) -> String {
        self.render_token_with_attrs(tokens, idx, options, &tokens[idx].attrs)
    }

    /// [`Renderer::render_token`] with replacement attributes, for rules that
    /// adjust attributes without touching the token.
    pub fn render_token_with_attrs(
        &self,
        tokens: &[Token],
        idx: usize,
        options: &Options,
        attrs: &[(String, String)],
    ) -> String {
        let token = &tokens[idx];
        if token.hidden {
            return String::new();
        }

        let mut result = String::new();

        // newline between a hidden paragraph and the next block opener
        if token.block && token.nesting != Nesting::Closing && idx > 0 && tokens[idx - 1].hidden {
            result.push('\n');
        }

        result.push_str(if token.nesting == Nesting::Closing { "</" } else { "<" });
        result.push_str(&token.tag);
        result.push_str(&self.render_attrs(attrs));

        if token.nesting == Nesting::SelfClosing && options.xhtml_out {
            result.push_str(" /");
        }

        let mut need_lf = token.block;
        if token.block && token.nesting == Nesting::Opening {
            if let Some(next) = tokens.get(idx + 1) {
                if next.kind == "inline" || next.hidden {
                    need_lf = false;
                } else if next.nesting == Nesting::Closing && next.tag == token.tag {
                    need_lf = false;
                }
            }
        }

        result.push_str(if need_lf { ">\n" } else { ">" });
        result
    }

    fn render_one(&self, tokens: &[Token], idx: usize, options: &Options, env: &Env) -> Result<String> {
        match self.rules.get(&tokens[idx].kind) {
            Some(rule) => rule(tokens, idx, options, env, self),
            None => Ok(self.render_token(tokens, idx, options)),
        }
    }

    /// Renders inline children.
    pub fn render_inline(&self, tokens: &[Token], options: &Options, env: &Env) -> Result<String> {
        let mut result = String::new();
        for idx in 0..tokens.len() {
            result.push_str(&self.render_one(tokens, idx, options, env)?);
        }
        Ok(result)
    }

    /// Plain text of inline children, used for image `alt`. Only text,
    /// raw HTML, nested images and line breaks contribute.
    pub fn render_inline_as_text(&self, tokens: &[Token], options: &Options, env: &Env) -> String {
        let mut result = String::new();
        for token in tokens {
            match token.kind.as_str() {
                "text" | "html_inline" | "html_block" => result.push_str(&token.content),
                "image" => result.push_str(&self.render_inline_as_text(&token.children, options, env)),
                "softbreak" | "hardbreak" => result.push('\n'),
                _ => {}
            }
        }
        result
    }

    /// Renders a full token stream as produced by `Markdown::parse`.
    pub fn render(&self, tokens: &[Token], options: &Options, env: &Env) -> Result<String> {
        let mut result = String::new();
        for idx in 0..tokens.len() {
            if tokens[idx].kind == "inline" {
                result.push_str(&self.render_inline(&tokens[idx].children, options, env)?);
            } else {
                result.push_str(&self.render_one(tokens, idx, options, env)?);
            }
        }
        Ok(result)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("Renderer").field("rules", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(kind: &str, tag: &str, nesting: Nesting) -> Token {
        let mut token = Token::new(kind, tag, nesting);
        token.block = true;
        token
    }

    #[test]
    fn attrs_are_escaped() {
        let renderer = Renderer::new();
        let attrs = vec![("title".to_string(), "a \"b\" <c>".to_string())];
        assert_eq!(
            renderer.render_attrs(&attrs),
            " title=\"a &quot;b&quot; &lt;c&gt;\""
        );
    }

    #[test]
    fn unknown_kinds_use_generic_tag_output() {
        let renderer = Renderer::new();
        let tokens = vec![
            block("custom_open", "aside", Nesting::Opening),
            block("custom_close", "aside", Nesting::Closing),
        ];
        let html = renderer.render(&tokens, &Options::default(), &Env::new()).unwrap();
        assert_eq!(html, "<aside></aside>\n");
    }

    #[test]
    fn hidden_tokens_print_nothing_and_break_the_next_block() {
        let renderer = Renderer::new();
        let mut hidden = block("paragraph_close", "p", Nesting::Closing);
        hidden.hidden = true;
        let tokens = vec![hidden, block("blockquote_open", "blockquote", Nesting::Opening)];
        let options = Options::default();
        assert_eq!(renderer.render_token(&tokens, 0, &options), "");
        assert_eq!(renderer.render_token(&tokens, 1, &options), "\n<blockquote>\n");
    }

    #[test]
    fn self_closing_follows_xhtml_option() {
        let renderer = Renderer::new();
        let tokens = vec![block("hr", "hr", Nesting::SelfClosing)];
        let mut options = Options::default();
        assert_eq!(renderer.render_token(&tokens, 0, &options), "<hr>\n");
        options.xhtml_out = true;
        assert_eq!(renderer.render_token(&tokens, 0, &options), "<hr />\n");
    }

    #[test]
    fn set_rule_overrides_a_kind() {
        let mut renderer = Renderer::new();
        let previous = renderer.set_rule(
            "text",
            Arc::new(|tokens: &[Token], idx: usize, _: &Options, _: &Env, _: &Renderer| -> Result<String> {
                Ok(tokens[idx].content.to_uppercase())
            }),
        );
        assert!(previous.is_some());
        let mut text = Token::new("text", "", Nesting::SelfClosing);
        text.content = "hi".into();
        let html = renderer
            .render_inline(&[text], &Options::default(), &Env::new())
            .unwrap();
        assert_eq!(html, "HI");
    }
}
