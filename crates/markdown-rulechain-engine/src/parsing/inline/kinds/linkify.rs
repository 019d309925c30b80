//! Bare `scheme://` links found while tokenizing. Triggered at `:` with the
//! scheme already sitting in pending text, which gets trimmed back.
//!
//! Scheme-less links (`www.`, e-mail) are left to the core `linkify` rule.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::parsing::inline::StateInline;
use crate::token::Nesting;

static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9.+\-])([a-z][a-z0-9.+\-]*)$").expect("valid scheme regex")
});

pub fn linkify(state: &mut StateInline<'_>, silent: bool) -> Result<bool> {
    let md = state.md;
    if !md.options.linkify || state.link_level > 0 {
        return Ok(false);
    }

    let pos = state.pos;
    let max = state.pos_max;
    if pos + 3 > max {
        return Ok(false);
    }
    if state.byte_at(pos) != b':' || state.byte_at(pos + 1) != b'/' || state.byte_at(pos + 2) != b'/' {
        return Ok(false);
    }

    let Some(proto) = SCHEME_RE
        .captures(&state.pending)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
    else {
        return Ok(false);
    };
    let proto_len = proto.len();

    // pending may hold text from outside the current range (link labels)
    let src = state.src;
    let Some(start) = pos.checked_sub(proto_len) else {
        return Ok(false);
    };
    if !src.get(start..pos).is_some_and(|s| s.eq_ignore_ascii_case(&proto)) {
        return Ok(false);
    }
    let Some(rest) = src.get(start..max) else {
        return Ok(false);
    };

    let Some(found) = md.linkify.match_at_start(rest) else {
        return Ok(false);
    };
    if !found.schema.eq_ignore_ascii_case(&format!("{proto}:")) {
        return Ok(false);
    }

    let url = found.text.trim_end_matches('*');
    if url.len() <= proto_len + 1 {
        return Ok(false);
    }

    let full_url = (md.normalize_link)(url);
    if !(md.validate_link)(&full_url) {
        return Ok(false);
    }

    if !silent {
        let keep = state.pending.len() - proto_len;
        state.pending.truncate(keep);

        let token = state.push("link_open", "a", Nesting::Opening);
        token.attr_push("href", full_url);
        token.markup = "linkify".to_string();
        token.info = "auto".to_string();

        state.push("text", "", Nesting::SelfClosing).content = (md.normalize_link_text)(url);

        let token = state.push("link_close", "a", Nesting::Closing);
        token.markup = "linkify".to_string();
        token.info = "auto".to_string();
    }

    state.pos += url.len() - proto_len;
    Ok(true)
}
