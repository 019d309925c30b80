//! Default render rules.

use crate::common::{escape_html, unescape_all};
use crate::env::Env;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::render::Renderer;
use crate::token::Token;

fn line_break(options: &Options) -> &'static str {
    if options.xhtml_out { "<br />\n" } else { "<br>\n" }
}

pub(super) fn code_inline(
    tokens: &[Token],
    idx: usize,
    _options: &Options,
    _env: &Env,
    renderer: &Renderer,
) -> Result<String> {
    let token = &tokens[idx];
    Ok(format!(
        "<code{}>{}</code>",
        renderer.render_attrs(&token.attrs),
        escape_html(&token.content)
    ))
}

pub(super) fn code_block(
    tokens: &[Token],
    idx: usize,
    _options: &Options,
    _env: &Env,
    renderer: &Renderer,
) -> Result<String> {
    let token = &tokens[idx];
    Ok(format!(
        "<pre{}><code>{}</code></pre>\n",
        renderer.render_attrs(&token.attrs),
        escape_html(&token.content)
    ))
}

/// Splits a fence info string into the language and the rest.
fn split_info(info: &str) -> (&str, &str) {
    match info.find(char::is_whitespace) {
        Some(end) => (&info[..end], info[end..].trim_start()),
        None => (info, ""),
    }
}

pub(super) fn fence(
    tokens: &[Token],
    idx: usize,
    options: &Options,
    _env: &Env,
    renderer: &Renderer,
) -> Result<String> {
    let token = &tokens[idx];
    let info = unescape_all(&token.info);
    let info = info.trim();
    let (lang, lang_attrs) = split_info(info);

    let highlighted = match &options.highlight {
        Some(highlight) => highlight(&token.content, lang, lang_attrs)
            .map_err(|source| Error::Highlight { source })?,
        None => String::new(),
    };
    let highlighted = if highlighted.is_empty() {
        escape_html(&token.content).into_owned()
    } else {
        highlighted
    };

    if highlighted.starts_with("<pre") {
        return Ok(highlighted + "\n");
    }

    if info.is_empty() {
        return Ok(format!(
            "<pre><code{}>{highlighted}</code></pre>\n",
            renderer.render_attrs(&token.attrs)
        ));
    }

    // add the language class on a copy, leaving the token as parsed
    let class = format!("{}{lang}", options.lang_prefix);
    let mut attrs = token.attrs.clone();
    match attrs.iter_mut().find(|(name, _)| name == "class") {
        Some((_, value)) => {
            value.push(' ');
            value.push_str(&class);
        }
        None => attrs.push(("class".to_string(), class)),
    }

    Ok(format!(
        "<pre><code{}>{highlighted}</code></pre>\n",
        renderer.render_attrs(&attrs)
    ))
}

pub(super) fn image(
    tokens: &[Token],
    idx: usize,
    options: &Options,
    env: &Env,
    renderer: &Renderer,
) -> Result<String> {
    let token = &tokens[idx];
    let alt = renderer.render_inline_as_text(&token.children, options, env);

    let mut attrs = token.attrs.clone();
    match attrs.iter_mut().find(|(name, _)| name == "alt") {
        Some((_, value)) => *value = alt,
        None => attrs.push(("alt".to_string(), alt)),
    }

    Ok(renderer.render_token_with_attrs(tokens, idx, options, &attrs))
}

pub(super) fn hardbreak(
    _tokens: &[Token],
    _idx: usize,
    options: &Options,
    _env: &Env,
    _renderer: &Renderer,
) -> Result<String> {
    Ok(line_break(options).to_string())
}

pub(super) fn softbreak(
    _tokens: &[Token],
    _idx: usize,
    options: &Options,
    _env: &Env,
    _renderer: &Renderer,
) -> Result<String> {
    Ok(if options.breaks {
        line_break(options).to_string()
    } else {
        "\n".to_string()
    })
}

pub(super) fn text(
    tokens: &[Token],
    idx: usize,
    _options: &Options,
    _env: &Env,
    _renderer: &Renderer,
) -> Result<String> {
    Ok(escape_html(&tokens[idx].content).into_owned())
}

pub(super) fn html_block(
    tokens: &[Token],
    idx: usize,
    _options: &Options,
    _env: &Env,
    _renderer: &Renderer,
) -> Result<String> {
    Ok(tokens[idx].content.clone())
}

pub(super) fn html_inline(
    tokens: &[Token],
    idx: usize,
    _options: &Options,
    _env: &Env,
    _renderer: &Renderer,
) -> Result<String> {
    Ok(tokens[idx].content.clone())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::Markdown;
    use crate::error::{BoxError, Error};
    use crate::options::{Highlighter, OptionsUpdate};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::plain("```\nx < y\n```", "<pre><code>x &lt; y\n</code></pre>\n")]
    #[case::lang("```rust\nfn\n```", "<pre><code class=\"language-rust\">fn\n</code></pre>\n")]
    #[case::lang_with_attrs("``` js {1,2}\nx\n```", "<pre><code class=\"language-js\">x\n</code></pre>\n")]
    #[case::escaped_info("```a\\_b\nx\n```", "<pre><code class=\"language-a_b\">x\n</code></pre>\n")]
    fn fences(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Markdown::new().render(input).unwrap(), expected);
    }

    fn highlighted(highlight: Highlighter) -> Markdown {
        let mut md = Markdown::new();
        md.options.highlight = Some(highlight);
        md
    }

    #[test]
    fn highlighter_gets_lang_and_attrs() {
        let md = highlighted(Arc::new(|code: &str, lang: &str, attrs: &str| -> Result<String, BoxError> {
            Ok(format!("[{lang}|{attrs}]{}", code.trim_end()))
        }));
        assert_eq!(
            md.render("```py title=x\nprint\n```").unwrap(),
            "<pre><code class=\"language-py\">[py|title=x]print</code></pre>\n"
        );
    }

    #[test]
    fn highlighter_pre_output_is_verbatim() {
        let md = highlighted(Arc::new(|_: &str, _: &str, _: &str| -> Result<String, BoxError> {
            Ok("<pre>custom</pre>".to_string())
        }));
        assert_eq!(md.render("```\nx\n```").unwrap(), "<pre>custom</pre>\n");
    }

    #[test]
    fn empty_highlight_falls_back_to_escaping() {
        let md = highlighted(Arc::new(|_: &str, _: &str, _: &str| -> Result<String, BoxError> { Ok(String::new()) }));
        assert_eq!(md.render("```\n<\n```").unwrap(), "<pre><code>&lt;\n</code></pre>\n");
    }

    #[test]
    fn highlighter_may_block_on_background_work() {
        let md = highlighted(Arc::new(|code: &str, _: &str, _: &str| -> Result<String, BoxError> {
            let code = code.to_string();
            let worker = std::thread::spawn(move || format!("<b>{}</b>", code.trim_end()));
            worker.join().map_err(|_| BoxError::from("highlight worker panicked"))
        }));
        assert_eq!(
            md.render("```
x
```").unwrap(),
            "<pre><code><b>x</b></code></pre>\n"
        );
    }

    #[test]
    fn highlight_errors_propagate() {
        let md = highlighted(Arc::new(|_: &str, _: &str, _: &str| -> Result<String, BoxError> { Err("boom".into()) }));
        let err = md.render("```\nx\n```").unwrap_err();
        assert!(matches!(err, Error::Highlight { .. }));
    }

    #[rstest]
    #[case::html(false, false, "a<br>\nb")]
    #[case::xhtml(false, true, "a<br />\nb")]
    fn hard_breaks(#[case] breaks: bool, #[case] xhtml: bool, #[case] expected: &str) {
        let md = Markdown::with_options(OptionsUpdate {
            breaks: Some(breaks),
            xhtml_out: Some(xhtml),
            ..Default::default()
        });
        assert_eq!(md.render_inline("a  \nb").unwrap(), expected);
    }

    #[test]
    fn soft_breaks_follow_breaks_option() {
        assert_eq!(Markdown::new().render_inline("a\nb").unwrap(), "a\nb");
        let md = Markdown::with_options(OptionsUpdate {
            breaks: Some(true),
            ..Default::default()
        });
        assert_eq!(md.render_inline("a\nb").unwrap(), "a<br>\nb");
    }

    #[test]
    fn rendering_leaves_image_tokens_untouched() {
        let md = Markdown::new();
        let mut env = crate::env::Env::new();
        let tokens = md.parse("![alt *x*](/i)", &mut env).unwrap();
        let first = md.renderer.render(&tokens, &md.options, &env).unwrap();
        let second = md.renderer.render(&tokens, &md.options, &env).unwrap();
        assert_eq!(first, second);
        assert_eq!(tokens[1].children[0].attr_get("alt"), Some(""));
    }
}
