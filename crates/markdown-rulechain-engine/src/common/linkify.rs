//! Bare link detection used by the `linkify` core and inline rules.
//!
//! The engine only depends on the [`LinkMatcher`] trait; [`RegexLinkMatcher`]
//! is the default and recognizes `http(s)://`, `ftp://`, `mailto:` and
//! `www.` links plus bare e-mail addresses.

use std::sync::LazyLock;

use regex::Regex;

/// One detected link inside a text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch {
    /// Scheme including the colon (`"https:"`, `"mailto:"`), empty for
    /// scheme-less `www.` links.
    pub schema: String,
    /// Byte offset of the match.
    pub index: usize,
    /// Byte offset right after the match.
    pub last_index: usize,
    /// Matched text as it appears in the input.
    pub text: String,
    /// Target URL, with a scheme added where the text had none.
    pub url: String,
}

pub trait LinkMatcher: Send + Sync {
    /// Cheap filter run before [`LinkMatcher::test`].
    fn pretest(&self, text: &str) -> bool {
        text.contains("://") || text.contains("www.") || text.contains('@')
    }

    fn test(&self, text: &str) -> bool {
        !self.matches(text).is_empty()
    }

    /// All non-overlapping links in `text`, left to right.
    fn matches(&self, text: &str) -> Vec<LinkMatch>;

    /// A link starting exactly at the beginning of `text`.
    fn match_at_start(&self, text: &str) -> Option<LinkMatch> {
        self.matches(text).into_iter().find(|m| m.index == 0)
    }
}

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        (?P<url>
            \b(?:(?:https?|ftp)://|www\.)[^\s<>]+
        )
        |
        (?P<email>
            (?:\bmailto:)?
            [a-z0-9.!\#$%&'*+/=?^_`{|}~-]+
            @
            [a-z0-9](?:[a-z0-9-]*[a-z0-9])?
            (?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)+
        )",
    )
    .expect("valid linkify regex")
});

/// Default regex-backed matcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexLinkMatcher;

impl RegexLinkMatcher {
    pub fn new() -> Self {
        Self
    }
}

/// Drops trailing punctuation that usually belongs to the sentence, and
/// closing brackets without an opening partner inside the link.
fn trim_link_tail(candidate: &str) -> &str {
    let mut end = candidate.len();
    loop {
        let Some(last) = candidate[..end].chars().next_back() else {
            break;
        };
        let body = &candidate[..end];
        let unbalanced = |open: char, close: char| {
            last == close && body.matches(close).count() > body.matches(open).count()
        };
        if ".,;:!?'\"*".contains(last) || unbalanced('(', ')') || unbalanced('[', ']') {
            end -= last.len_utf8();
        } else {
            break;
        }
    }
    &candidate[..end]
}

impl LinkMatcher for RegexLinkMatcher {
    fn matches(&self, text: &str) -> Vec<LinkMatch> {
        let mut found = Vec::new();
        for caps in LINK_RE.captures_iter(text) {
            if let Some(m) = caps.name("url") {
                let linked = trim_link_tail(m.as_str());
                let host_start = linked.find("://").map_or(4, |i| i + 3);
                if linked.len() <= host_start {
                    continue;
                }
                let lower = linked.to_ascii_lowercase();
                let (schema, url) = if lower.starts_with("www.") {
                    (String::new(), format!("http://{linked}"))
                } else {
                    let colon = linked.find(':').unwrap_or(0);
                    (lower[..=colon].to_string(), linked.to_string())
                };
                found.push(LinkMatch {
                    schema,
                    index: m.start(),
                    last_index: m.start() + linked.len(),
                    text: linked.to_string(),
                    url,
                });
            } else if let Some(m) = caps.name("email") {
                let email = m.as_str();
                let url = if email.to_ascii_lowercase().starts_with("mailto:") {
                    email.to_string()
                } else {
                    format!("mailto:{email}")
                };
                found.push(LinkMatch {
                    schema: "mailto:".to_string(),
                    index: m.start(),
                    last_index: m.end(),
                    text: email.to_string(),
                    url,
                });
            }
        }
        found
    }
}
