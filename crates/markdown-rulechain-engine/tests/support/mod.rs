//! Shared helpers for the integration tests: fixture loading, a compact
//! token dump for snapshots and a structural invariant checker.

#![allow(dead_code)]

use std::fmt::Write;

use markdown_rulechain_engine::{Nesting, Token};

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.md",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

/// One line per token, indented by nesting depth. Block tokens show their
/// line map, leaf tokens their content.
pub fn dump(tokens: &[Token]) -> String {
    let mut out = String::new();
    dump_into(tokens, 0, &mut out);
    out
}

fn dump_into(tokens: &[Token], base: usize, out: &mut String) {
    for token in tokens {
        let depth = base + token.level;
        let _ = write!(out, "{}{}", "  ".repeat(depth), token.kind);
        if let Some(map) = token.map {
            let _ = write!(out, " [{},{}]", map.start, map.end);
        }
        if token.hidden {
            out.push_str(" hidden");
        }
        if token.kind != "inline" && !token.content.is_empty() {
            let _ = write!(out, " {:?}", token.content);
        }
        out.push('\n');
        if !token.children.is_empty() {
            dump_into(&token.children, depth + 1, out);
        }
    }
}

/// Checks the token stream shape every rule set must produce:
///
/// - opening and closing tokens pair up with matching tags and levels
/// - levels follow nesting
/// - attribute names are unique per token
/// - only `inline` tokens carry children
pub fn check_invariants(tokens: &[Token]) {
    let mut open: Vec<&Token> = Vec::new();
    for token in tokens {
        match token.nesting {
            Nesting::Opening => {
                assert_eq!(token.level, open.len(), "level of {} out of step", token.kind);
                open.push(token);
            }
            Nesting::Closing => {
                let opener = open
                    .pop()
                    .unwrap_or_else(|| panic!("{} closes nothing", token.kind));
                assert_eq!(opener.tag, token.tag, "{} closed by {}", opener.kind, token.kind);
                assert_eq!(opener.level, token.level, "{} level mismatch", token.kind);
            }
            Nesting::SelfClosing => {
                assert_eq!(token.level, open.len(), "level of {} out of step", token.kind);
            }
        }

        let mut names: Vec<&str> = token.attrs.iter().map(|(name, _)| name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), token.attrs.len(), "duplicate attrs on {}", token.kind);

        if token.kind == "inline" {
            check_invariants(&token.children);
        } else {
            assert!(token.children.is_empty() || token.kind == "image", "{} has children", token.kind);
        }
    }
    assert!(open.is_empty(), "unclosed: {:?}", open.iter().map(|t| &t.kind).collect::<Vec<_>>());
}
