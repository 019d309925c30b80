mod support;

use std::sync::Arc;

use markdown_rulechain_engine::error::{Error, Result};
use markdown_rulechain_engine::parsing::blocks::StateBlock;
use markdown_rulechain_engine::parsing::core::StateCore;
use markdown_rulechain_engine::render::Renderer;
use markdown_rulechain_engine::{Env, Markdown, Nesting, Options, OptionsUpdate, Token};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case::heading("# hello", "<h1>hello</h1>\n")]
#[case::emphasis("*b*", "<p><em>b</em></p>\n")]
#[case::empty("", "")]
#[case::hr("---", "<hr>\n")]
fn literal_scenarios(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(Markdown::new().render(input).unwrap(), expected);
}

#[test]
fn xhtml_out_self_closes_hr() {
    let md = Markdown::with_options(OptionsUpdate {
        xhtml_out: Some(true),
        ..Default::default()
    });
    assert_eq!(md.render("---").unwrap(), "<hr />\n");
}

#[test]
fn no_enabled_block_rules_is_an_error() {
    let mut md = Markdown::new();
    md.block.ruler.enable_only(Vec::<&str>::new(), false).unwrap();
    md.inline.ruler.enable_only(Vec::<&str>::new(), false).unwrap();
    md.inline.ruler2.enable_only(Vec::<&str>::new(), false).unwrap();

    let err = md.render(" - *foo*\n - `bar`").unwrap_err();
    assert!(matches!(err, Error::NoBlockRuleMatched { line: 0 }));
    assert!(err.to_string().contains("none of the block rules matched"));
}

#[test]
fn block_rule_without_progress_is_an_error() {
    let mut md = Markdown::new();
    md.block
        .ruler
        .before(
            "paragraph",
            "stuck",
            Arc::new(
                |_state: &mut StateBlock<'_>, _start: usize, _end: usize, _silent: bool| -> Result<bool> {
                    Ok(true)
                },
            ),
            &[],
        )
        .unwrap();

    let err = md.render("plain text").unwrap_err();
    assert!(err.to_string().contains("block rule didn't increment state.line"));
}

#[test]
fn inserting_relative_to_a_missing_rule_fails() {
    let mut md = Markdown::new();
    let err = md
        .block
        .ruler
        .after(
            "nope",
            "x",
            Arc::new(|_: &mut StateBlock<'_>, _: usize, _: usize, _: bool| -> Result<bool> { Ok(false) }),
            &[],
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Parser rule not found: nope");
}

#[rstest]
#[case::crlf("a\r\nb")]
#[case::cr("a\rb")]
#[case::lf("a\nb")]
fn line_endings_are_equivalent(#[case] input: &str) {
    assert_eq!(Markdown::new().render(input).unwrap(), "<p>a\nb</p>\n");
}

#[test]
fn nul_renders_as_replacement_character() {
    assert_eq!(Markdown::new().render("\0").unwrap(), "<p>\u{FFFD}</p>\n");
}

fn rule_names(md: &Markdown) -> Vec<Vec<String>> {
    vec![
        md.core.ruler.enabled_names().map(String::from).collect(),
        md.block.ruler.enabled_names().map(String::from).collect(),
        md.inline.ruler.enabled_names().map(String::from).collect(),
        md.inline.ruler2.enabled_names().map(String::from).collect(),
    ]
}

#[rstest]
#[case::single(&["table"])]
#[case::shared_name(&["emphasis", "strikethrough"])]
#[case::across_chains(&["linkify", "heading", "text_join"])]
fn disable_then_enable_restores_chains(#[case] names: &[&str]) {
    let mut md = Markdown::new();
    let before = rule_names(&md);

    md.disable(names, false).unwrap();
    assert_ne!(rule_names(&md), before);
    md.enable(names, false).unwrap();

    assert_eq!(rule_names(&md), before);
}

#[test]
fn toggling_a_rule_changes_chain_length_by_one() {
    let mut md = Markdown::new();
    let before = md.block.ruler.get_rules("").len();
    md.disable(["hr"], false).unwrap();
    assert_eq!(md.block.ruler.get_rules("").len(), before - 1);
    md.enable(["hr"], false).unwrap();
    assert_eq!(md.block.ruler.get_rules("").len(), before);
}

#[test]
fn unknown_rule_leaves_enabled_state_untouched() {
    let mut md = Markdown::new();
    let before = rule_names(&md);
    let err = md.disable(["hr", "no_such_rule"], false).unwrap_err();
    assert!(matches!(err, Error::UnknownRules { .. }));
    assert_eq!(rule_names(&md), before);
}

#[test]
fn token_attribute_round_trips() {
    let mut token = Token::new("link_open", "a", Nesting::Opening);
    token.attr_set("href", "v1");
    token.attr_set("href", "v2");
    assert_eq!(token.attrs, vec![("href".to_string(), "v2".to_string())]);

    token.attr_join("class", "a");
    token.attr_join("class", "b");
    assert_eq!(token.attr_get("class"), Some("a b"));
}

#[test]
fn rendering_is_deterministic() {
    let md = Markdown::new();
    let mut env = Env::new();
    let src = support::fixture("document");
    let tokens = md.parse(&src, &mut env).unwrap();
    let first = md.renderer.render(&tokens, &md.options, &env).unwrap();
    let second = md.renderer.render(&tokens, &md.options, &env).unwrap();
    assert_eq!(first, second);
}

#[test]
fn deep_nesting_is_capped_without_recursing() {
    let md = Markdown::with_options(OptionsUpdate {
        max_nesting: Some(3),
        ..Default::default()
    });
    let src = format!("{} x", ">".repeat(10_000));
    let html = md.render(&src).unwrap();
    assert_eq!(html.matches("<blockquote>").count(), 3);
    assert!(html.contains("&gt;&gt;&gt;"));
}

#[test]
fn inline_nesting_cap_keeps_markup_literal() {
    let md = Markdown::with_options(OptionsUpdate {
        max_nesting: Some(1),
        ..Default::default()
    });
    assert_eq!(md.render_inline("[*a*](/u)").unwrap(), "<a href=\"/u\">*a*</a>");
}

#[test]
fn references_are_visible_in_env() {
    let md = Markdown::new();
    let mut env = Env::new();
    md.render_with_env("[a]: /one\n[A]: /two\n\n[a]", &mut env).unwrap();
    assert_eq!(env.references.len(), 1);
    assert_eq!(env.references["A"].href, "/one");
}

#[derive(Debug, Default)]
struct HeadingCount(usize);

/// A plugin adding a core rule that counts headings into the env, and a
/// renderer rule that numbers them.
fn heading_numbers(md: &mut Markdown) -> std::result::Result<(), markdown_rulechain_engine::error::BoxError> {
    md.core.ruler.after(
        "inline",
        "heading_count",
        Arc::new(|state: &mut StateCore<'_>| -> Result<()> {
            let count = state.tokens.iter().filter(|t| t.kind == "heading_open").count();
            state.env.extensions.insert(HeadingCount(count));
            Ok(())
        }),
        &[],
    )?;
    md.renderer.set_rule(
        "heading_open",
        Arc::new(
            |tokens: &[Token], idx: usize, options: &Options, _env: &Env, renderer: &Renderer| -> Result<String> {
                let number = tokens[..=idx].iter().filter(|t| t.kind == "heading_open").count();
                Ok(format!("{}{number}. ", renderer.render_token(tokens, idx, options)))
            },
        ),
    );
    Ok(())
}

#[test]
fn plugins_extend_core_and_renderer() {
    let mut md = Markdown::new();
    md.use_plugin(heading_numbers).unwrap();

    let mut env = Env::new();
    let html = md.render_with_env("# a\n\n## b", &mut env).unwrap();
    assert_eq!(html, "<h1>1. a</h1>\n<h2>2. b</h2>\n");
    assert_eq!(env.extensions.get::<HeadingCount>().map(|c| c.0), Some(2));
}

#[test]
fn one_instance_serves_parallel_renders() {
    let md = Arc::new(Markdown::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let md = Arc::clone(&md);
            std::thread::spawn(move || md.render(&format!("# {i}")).unwrap())
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("<h1>{i}</h1>\n"));
    }
}
