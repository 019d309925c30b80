//! # Parser instance
//!
//! [`Markdown`] ties the three parsers, the renderer, the active options and
//! the link helpers together. Configure it once (preset, options, rule
//! toggles, plugins), then share it: parsing takes `&self` and builds fresh
//! state per call, so one instance can serve concurrent parses.
//!
//! ```
//! use markdown_rulechain_engine::Markdown;
//!
//! let md = Markdown::new();
//! assert_eq!(md.render("# hello").unwrap(), "<h1>hello</h1>\n");
//! ```

use std::fmt;
use std::sync::Arc;

use crate::common::{self, LinkMatcher, RegexLinkMatcher};
use crate::env::Env;
use crate::error::{BoxError, Error, Result, RuleAction};
use crate::options::{Options, OptionsUpdate, Preset, PresetName};
use crate::parsing::blocks::ParserBlock;
use crate::parsing::core::{ParserCore, StateCore};
use crate::parsing::inline::ParserInline;
use crate::render::Renderer;
use crate::token::Token;

/// Decides whether a normalized URL may be emitted as a link target.
pub type LinkValidator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Rewrites a URL, for the `href` or for display.
pub type LinkNormalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

pub struct Markdown {
    pub options: Options,
    pub core: ParserCore,
    pub block: ParserBlock,
    pub inline: ParserInline,
    pub renderer: Renderer,
    /// Bare link detection for the `linkify` rules.
    pub linkify: Arc<dyn LinkMatcher>,
    pub validate_link: LinkValidator,
    /// Applied to link destinations before they become `href`s.
    pub normalize_link: LinkNormalizer,
    /// Applied to autolink URLs before they are shown as link text.
    pub normalize_link_text: LinkNormalizer,
}

impl Markdown {
    /// The `default` preset.
    pub fn new() -> Self {
        Self::from_preset(PresetName::Default)
    }

    pub fn from_preset(name: PresetName) -> Self {
        let mut md = Self {
            options: Options::default(),
            core: ParserCore::new(),
            block: ParserBlock::new(),
            inline: ParserInline::new(),
            renderer: Renderer::new(),
            linkify: Arc::new(RegexLinkMatcher::new()),
            validate_link: Arc::new(common::validate_link),
            normalize_link: Arc::new(common::normalize_link),
            normalize_link_text: Arc::new(common::normalize_link_text),
        };
        md.apply_preset(&Preset::named(name));
        md
    }

    /// Like [`Markdown::from_preset`], taking the preset name as a string.
    pub fn with_preset(name: &str) -> Result<Self> {
        Ok(Self::from_preset(name.parse()?))
    }

    /// The `default` preset with `update` applied on top.
    pub fn with_options(update: OptionsUpdate) -> Self {
        let mut md = Self::new();
        md.set(&update);
        md
    }

    /// Shallow-merges `update` into the current options.
    pub fn set(&mut self, update: &OptionsUpdate) -> &mut Self {
        self.options.apply(update);
        self
    }

    /// Replaces the options and restricts each chain to the preset's
    /// whitelist. Chains the preset leaves unspecified keep their state.
    ///
    /// Every whitelist is checked first; a name its chain does not define
    /// fails the call before anything changes.
    pub fn configure(&mut self, preset: &Preset) -> Result<&mut Self> {
        let missing = self.preset_missing_rules(preset);
        if !missing.is_empty() {
            return Err(Error::InvalidRuleName { names: missing });
        }
        self.apply_preset(preset);
        Ok(self)
    }

    /// [`Markdown::configure`] with a built-in preset, by name.
    pub fn configure_preset(&mut self, name: &str) -> Result<&mut Self> {
        let name: PresetName = name.parse()?;
        log::debug!("applying preset {name}");
        self.configure(&Preset::named(name))
    }

    fn preset_missing_rules(&self, preset: &Preset) -> Vec<String> {
        let components = &preset.components;
        let mut missing = Vec::new();
        if let Some(rules) = &components.core.rules {
            missing.extend(self.core.ruler.missing(rules));
        }
        if let Some(rules) = &components.block.rules {
            missing.extend(self.block.ruler.missing(rules));
        }
        if let Some(rules) = &components.inline.rules {
            missing.extend(self.inline.ruler.missing(rules));
        }
        if let Some(rules) = &components.inline.rules2 {
            missing.extend(self.inline.ruler2.missing(rules));
        }
        missing
    }

    /// Applies an already validated preset.
    fn apply_preset(&mut self, preset: &Preset) {
        debug_assert!(
            self.preset_missing_rules(preset).is_empty(),
            "preset names rules its chains do not define"
        );
        let components = &preset.components;
        if let Some(rules) = &components.core.rules {
            self.core.ruler.restrict_to(rules);
        }
        if let Some(rules) = &components.block.rules {
            self.block.ruler.restrict_to(rules);
        }
        if let Some(rules) = &components.inline.rules {
            self.inline.ruler.restrict_to(rules);
        }
        if let Some(rules) = &components.inline.rules2 {
            self.inline.ruler2.restrict_to(rules);
        }
        self.options = preset.options.clone();
    }

    /// Names from `names` that no chain knows.
    fn unknown_rules(&self, names: &[String]) -> Vec<String> {
        names
            .iter()
            .filter(|name| {
                !(self.core.ruler.contains(name)
                    || self.block.ruler.contains(name)
                    || self.inline.ruler.contains(name)
                    || self.inline.ruler2.contains(name))
            })
            .cloned()
            .collect()
    }

    fn collect_names<I, S>(names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().map(|n| n.as_ref().to_string()).collect()
    }

    fn check_rules(&self, names: &[String], action: RuleAction, ignore_invalid: bool) -> Result<()> {
        let unknown = self.unknown_rules(names);
        if unknown.is_empty() || ignore_invalid {
            return Ok(());
        }
        Err(Error::UnknownRules {
            action,
            names: unknown,
        })
    }

    /// Enables the named rules in whichever chains define them. A name may
    /// live in several chains (`emphasis` is both a tokenizer and a
    /// post-processor); all of them are switched.
    ///
    /// Unless `ignore_invalid` is set, a name no chain knows fails the call
    /// before anything changes.
    pub fn enable<I, S>(&mut self, names: I, ignore_invalid: bool) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = Self::collect_names(names);
        self.check_rules(&names, RuleAction::Enable, ignore_invalid)?;
        log::debug!("enabling rules {names:?}");
        self.core.ruler.enable(&names, true)?;
        self.block.ruler.enable(&names, true)?;
        self.inline.ruler.enable(&names, true)?;
        self.inline.ruler2.enable(&names, true)?;
        Ok(self)
    }

    /// Disables the named rules; see [`Markdown::enable`].
    pub fn disable<I, S>(&mut self, names: I, ignore_invalid: bool) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = Self::collect_names(names);
        self.check_rules(&names, RuleAction::Disable, ignore_invalid)?;
        log::debug!("disabling rules {names:?}");
        self.core.ruler.disable(&names, true)?;
        self.block.ruler.disable(&names, true)?;
        self.inline.ruler.disable(&names, true)?;
        self.inline.ruler2.disable(&names, true)?;
        Ok(self)
    }

    /// Disables every rule of every chain, then enables exactly `names`.
    pub fn enable_only<I, S>(&mut self, names: I, ignore_invalid: bool) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = Self::collect_names(names);
        self.check_rules(&names, RuleAction::Enable, ignore_invalid)?;
        log::debug!("enabling only rules {names:?}");
        self.core.ruler.enable_only(&names, true)?;
        self.block.ruler.enable_only(&names, true)?;
        self.inline.ruler.enable_only(&names, true)?;
        self.inline.ruler2.enable_only(&names, true)?;
        Ok(self)
    }

    /// Applies a plugin right away. Plugins add rules, renderer entries or
    /// options through the `&mut Markdown` they receive.
    ///
    /// Setup that needs async work blocks on it inside the plugin. The
    /// instance is ready once this returns, and plugins apply in call order.
    ///
    /// ```
    /// use markdown_rulechain_engine::Markdown;
    ///
    /// let mut md = Markdown::new();
    /// md.use_plugin(|md| {
    ///     md.disable(["heading"], false)?;
    ///     Ok(())
    /// })
    /// .unwrap();
    /// assert_eq!(md.render("# x").unwrap(), "<p># x</p>\n");
    /// ```
    pub fn use_plugin<P>(&mut self, plugin: P) -> Result<&mut Self>
    where
        P: FnOnce(&mut Markdown) -> std::result::Result<(), BoxError>,
    {
        plugin(self).map_err(|source| Error::Plugin { source })?;
        log::debug!("plugin applied");
        Ok(self)
    }

    /// Runs the core chain over `src`, returning block tokens with inline
    /// children filled in. `env` collects references and plugin data.
    pub fn parse(&self, src: &str, env: &mut Env) -> Result<Vec<Token>> {
        log::trace!("parsing {} bytes", src.len());
        let mut state = StateCore::new(src, self, env);
        self.core.process(&mut state)?;
        Ok(state.tokens)
    }

    pub fn render(&self, src: &str) -> Result<String> {
        self.render_with_env(src, &mut Env::new())
    }

    pub fn render_with_env(&self, src: &str, env: &mut Env) -> Result<String> {
        let tokens = self.parse(src, env)?;
        self.renderer.render(&tokens, &self.options, env)
    }

    /// Parses `src` as a single inline run: no paragraphs or other blocks.
    /// The result is one `inline` token.
    pub fn parse_inline(&self, src: &str, env: &mut Env) -> Result<Vec<Token>> {
        let mut state = StateCore::new(src, self, env);
        state.inline_mode = true;
        self.core.process(&mut state)?;
        Ok(state.tokens)
    }

    /// Renders `src` without the paragraph wrapper.
    pub fn render_inline(&self, src: &str) -> Result<String> {
        self.render_inline_with_env(src, &mut Env::new())
    }

    pub fn render_inline_with_env(&self, src: &str, env: &mut Env) -> Result<String> {
        let tokens = self.parse_inline(src, env)?;
        self.renderer.render(&tokens, &self.options, env)
    }
}

impl Default for Markdown {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Markdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Markdown")
            .field("options", &self.options)
            .field("core", &self.core.ruler)
            .field("block", &self.block.ruler)
            .field("inline", &self.inline.ruler)
            .field("inline2", &self.inline.ruler2)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn default_preset_enables_everything() {
        let md = Markdown::new();
        assert_eq!(
            md.block.ruler.enabled_names().count(),
            md.block.ruler.names().count()
        );
        assert!(!md.options.html);
        assert_eq!(md.options.max_nesting, 100);
    }

    #[rstest]
    #[case::commonmark("commonmark")]
    #[case::zero("zero")]
    fn restricted_presets_drop_tables(#[case] preset: &str) {
        let md = Markdown::with_preset(preset).unwrap();
        assert!(!md.block.ruler.enabled_names().any(|name| name == "table"));
        assert_eq!(md.options.max_nesting, 20);
    }

    #[test]
    fn zero_preset_renders_only_paragraphs() {
        let md = Markdown::from_preset(PresetName::Zero);
        assert_eq!(md.render("# *a*").unwrap(), "<p># *a*</p>\n");
    }

    #[test]
    fn bad_preset_names_fail() {
        assert!(matches!(Markdown::with_preset("nope"), Err(Error::UnknownPreset { .. })));
        assert!(matches!(Markdown::with_preset(""), Err(Error::EmptyPreset)));
    }

    #[test]
    fn unknown_rule_names_fail_without_changes() {
        let mut md = Markdown::new();
        let err = md.disable(["heading", "nope"], false).unwrap_err();
        assert_eq!(err.to_string(), "Failed to disable unknown rule(s): nope");
        assert!(md.block.ruler.enabled_names().any(|name| name == "heading"));

        md.disable(["heading", "nope"], true).unwrap();
        assert!(!md.block.ruler.enabled_names().any(|name| name == "heading"));
    }

    #[test]
    fn shared_names_toggle_every_chain() {
        let mut md = Markdown::new();
        md.disable(["emphasis"], false).unwrap();
        assert!(!md.inline.ruler.enabled_names().any(|name| name == "emphasis"));
        assert!(!md.inline.ruler2.enabled_names().any(|name| name == "emphasis"));
        assert_eq!(md.render_inline("*a*").unwrap(), "*a*");
    }

    #[test]
    fn enable_only_spans_chains() {
        let mut md = Markdown::new();
        md.enable_only(
            ["normalize", "block", "inline", "paragraph", "text", "balance_pairs", "fragments_join"],
            false,
        )
        .unwrap();
        assert_eq!(md.render("# *a*").unwrap(), "<p># *a*</p>\n");
    }

    #[test]
    fn set_merges_and_chains() {
        let mut md = Markdown::new();
        md.set(&OptionsUpdate {
            html: Some(true),
            ..Default::default()
        })
        .set(&OptionsUpdate {
            breaks: Some(true),
            ..Default::default()
        });
        assert!(md.options.html);
        assert!(md.options.breaks);
    }

    #[test]
    fn configure_preset_switches_rules_and_options() {
        let mut md = Markdown::new();
        md.configure_preset("commonmark").unwrap();
        assert!(md.options.xhtml_out);
        assert_eq!(md.render("---").unwrap(), "<hr />\n");
        assert_eq!(md.render("~~a~~").unwrap(), "<p>~~a~~</p>\n");
    }

    #[test]
    fn configure_rejects_unknown_whitelist_before_changing_anything() {
        let mut md = Markdown::new();
        let mut preset = Preset::named(PresetName::Zero);
        preset.components.block.rules = Some(vec!["paragraph".to_string(), "tables".to_string()]);

        let err = md.configure(&preset).unwrap_err();

        assert!(matches!(err, Error::InvalidRuleName { ref names } if names == &["tables"]));
        assert_eq!(md.core.ruler.enabled_names().count(), md.core.ruler.names().count());
        assert_eq!(md.block.ruler.enabled_names().count(), md.block.ruler.names().count());
        assert_eq!(md.options.max_nesting, 100);
    }

    #[test]
    fn plugin_errors_are_wrapped() {
        let mut md = Markdown::new();
        let err = md
            .use_plugin(|md| {
                md.enable(["missing"], false)?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, Error::Plugin { .. }));
    }

    #[test]
    fn instance_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Markdown>();
    }
}
