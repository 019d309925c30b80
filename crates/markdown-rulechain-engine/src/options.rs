//! # Options and presets
//!
//! [`Options`] is the full option record read by rules and the renderer.
//! [`OptionsUpdate`] is the shallow patch accepted by `Markdown::set`.
//! A [`Preset`] pairs options with a per-chain whitelist of enabled rules.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{BoxError, Error};

/// Fence highlighter: `(code, lang, attrs) -> html`.
///
/// An empty result falls back to escaping the code. A result starting with
/// `<pre` replaces the whole fence wrapper.
///
/// Rendering is synchronous. A highlighter backed by async work blocks on it
/// inside the callback; its error is returned from `render`.
pub type Highlighter = Arc<dyn Fn(&str, &str, &str) -> Result<String, BoxError> + Send + Sync>;

/// Replacement strings for smart quotes: double open, double close, single
/// open, single close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuotesRepr", into = "QuotesRepr")]
pub struct Quotes([String; 4]);

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum QuotesRepr {
    Chars(String),
    List(Vec<String>),
}

impl Quotes {
    pub fn new(
        double_open: impl Into<String>,
        double_close: impl Into<String>,
        single_open: impl Into<String>,
        single_close: impl Into<String>,
    ) -> Self {
        Self([
            double_open.into(),
            double_close.into(),
            single_open.into(),
            single_close.into(),
        ])
    }

    pub fn double_open(&self) -> &str {
        &self.0[0]
    }

    pub fn double_close(&self) -> &str {
        &self.0[1]
    }

    pub fn single_open(&self) -> &str {
        &self.0[2]
    }

    pub fn single_close(&self) -> &str {
        &self.0[3]
    }
}

impl Default for Quotes {
    fn default() -> Self {
        Self::new("\u{201C}", "\u{201D}", "\u{2018}", "\u{2019}")
    }
}

impl FromStr for Quotes {
    type Err = String;

    /// Four characters, e.g. `«»„“`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars = s.chars().map(String::from).collect::<Vec<_>>();
        Quotes::try_from(QuotesRepr::List(chars))
    }
}

impl TryFrom<QuotesRepr> for Quotes {
    type Error = String;

    fn try_from(repr: QuotesRepr) -> Result<Self, Self::Error> {
        let list = match repr {
            QuotesRepr::Chars(s) => return s.parse(),
            QuotesRepr::List(list) => list,
        };
        match <[String; 4]>::try_from(list) {
            Ok(quotes) => Ok(Self(quotes)),
            Err(list) => Err(format!("expected 4 quote strings, got {}", list.len())),
        }
    }
}

impl From<Quotes> for QuotesRepr {
    fn from(quotes: Quotes) -> Self {
        QuotesRepr::List(quotes.0.into())
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Pass raw HTML through.
    pub html: bool,
    /// Self-close void tags (`<br />`).
    pub xhtml_out: bool,
    /// Render soft line breaks as `<br>`.
    pub breaks: bool,
    /// CSS class prefix for fenced code languages.
    pub lang_prefix: String,
    /// Autolink bare URLs and e-mail addresses.
    pub linkify: bool,
    /// Typographic replacements and smart quotes.
    pub typographer: bool,
    pub quotes: Quotes,
    #[serde(skip)]
    pub highlight: Option<Highlighter>,
    /// Depth cap for block containers and inline spans.
    pub max_nesting: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            html: false,
            xhtml_out: false,
            breaks: false,
            lang_prefix: "language-".to_string(),
            linkify: false,
            typographer: false,
            quotes: Quotes::default(),
            highlight: None,
            max_nesting: 100,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("html", &self.html)
            .field("xhtml_out", &self.xhtml_out)
            .field("breaks", &self.breaks)
            .field("lang_prefix", &self.lang_prefix)
            .field("linkify", &self.linkify)
            .field("typographer", &self.typographer)
            .field("quotes", &self.quotes)
            .field("highlight", &self.highlight.is_some())
            .field("max_nesting", &self.max_nesting)
            .finish()
    }
}

impl Options {
    /// Shallow merge: every field present in `update` overwrites ours.
    pub fn apply(&mut self, update: &OptionsUpdate) {
        if let Some(v) = update.html {
            self.html = v;
        }
        if let Some(v) = update.xhtml_out {
            self.xhtml_out = v;
        }
        if let Some(v) = update.breaks {
            self.breaks = v;
        }
        if let Some(v) = &update.lang_prefix {
            self.lang_prefix = v.clone();
        }
        if let Some(v) = update.linkify {
            self.linkify = v;
        }
        if let Some(v) = update.typographer {
            self.typographer = v;
        }
        if let Some(v) = &update.quotes {
            self.quotes = v.clone();
        }
        if let Some(v) = update.max_nesting {
            self.max_nesting = v;
        }
    }
}

/// Patch for [`Options`]; `None` leaves the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xhtml_out: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breaks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typographer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quotes: Option<Quotes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_nesting: Option<usize>,
}

/// Built-in preset names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresetName {
    /// Every rule on, HTML off.
    #[default]
    Default,
    /// Strict CommonMark rule set.
    CommonMark,
    /// Paragraphs and text only; enable what you need.
    Zero,
}

impl PresetName {
    pub fn as_str(self) -> &'static str {
        match self {
            PresetName::Default => "default",
            PresetName::CommonMark => "commonmark",
            PresetName::Zero => "zero",
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(Error::EmptyPreset),
            "default" => Ok(PresetName::Default),
            "commonmark" => Ok(PresetName::CommonMark),
            "zero" => Ok(PresetName::Zero),
            other => Err(Error::UnknownPreset {
                name: other.to_string(),
            }),
        }
    }
}

/// Enabled-rule whitelist for one chain; `None` leaves the chain untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainRules {
    pub rules: Option<Vec<String>>,
    /// Inline post-processing chain, only meaningful for the inline parser.
    pub rules2: Option<Vec<String>>,
}

impl ChainRules {
    fn only(rules: &[&str]) -> Self {
        Self {
            rules: Some(rules.iter().map(|r| r.to_string()).collect()),
            rules2: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Components {
    pub core: ChainRules,
    pub block: ChainRules,
    pub inline: ChainRules,
}

/// Options plus rule whitelists, applied by `Markdown::configure`.
#[derive(Debug, Clone, Default)]
pub struct Preset {
    pub options: Options,
    pub components: Components,
}

impl Preset {
    pub fn named(name: PresetName) -> Self {
        match name {
            PresetName::Default => Self::default(),
            PresetName::CommonMark => Self::commonmark(),
            PresetName::Zero => Self::zero(),
        }
    }

    fn commonmark() -> Self {
        let mut inline = ChainRules::only(&[
            "autolink",
            "backticks",
            "emphasis",
            "entity",
            "escape",
            "html_inline",
            "image",
            "link",
            "newline",
            "text",
        ]);
        inline.rules2 = Some(
            ["balance_pairs", "emphasis", "fragments_join"]
                .map(String::from)
                .into(),
        );

        Self {
            options: Options {
                html: true,
                xhtml_out: true,
                max_nesting: 20,
                ..Options::default()
            },
            components: Components {
                core: ChainRules::only(&["normalize", "block", "inline", "text_join"]),
                block: ChainRules::only(&[
                    "blockquote",
                    "code",
                    "fence",
                    "heading",
                    "hr",
                    "html_block",
                    "lheading",
                    "list",
                    "reference",
                    "paragraph",
                ]),
                inline,
            },
        }
    }

    fn zero() -> Self {
        let mut inline = ChainRules::only(&["text"]);
        inline.rules2 = Some(["balance_pairs", "fragments_join"].map(String::from).into());

        Self {
            options: Options {
                max_nesting: 20,
                ..Options::default()
            },
            components: Components {
                core: ChainRules::only(&["normalize", "block", "inline", "text_join"]),
                block: ChainRules::only(&["paragraph"]),
                inline,
            },
        }
    }
}
