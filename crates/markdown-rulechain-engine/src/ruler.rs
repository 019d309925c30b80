//! # Rule chains
//!
//! A [`Ruler`] keeps an ordered list of named rule functions. Insertion order
//! is execution order. Each rule may also belong to alternate chains, named
//! subsets replayed in restricted contexts: for example the block rules that
//! may terminate a paragraph live in the `"paragraph"` chain.
//!
//! Active rules per chain are compiled lazily and cached until the next
//! mutation.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{Error, Result};

struct Rule<F> {
    name: String,
    enabled: bool,
    func: F,
    alt: Vec<String>,
}

pub struct Ruler<F> {
    rules: Vec<Rule<F>>,
    /// chain name -> enabled rule functions, `""` is the default chain
    cache: OnceLock<HashMap<String, Vec<F>>>,
}

impl<F: Clone> Ruler<F> {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            cache: OnceLock::new(),
        }
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.name == name)
    }

    fn invalidate(&mut self) {
        self.cache.take();
    }

    fn compile(&self) -> HashMap<String, Vec<F>> {
        let mut chains = vec![String::new()];
        for rule in self.rules.iter().filter(|rule| rule.enabled) {
            for alt in &rule.alt {
                if !chains.contains(alt) {
                    chains.push(alt.clone());
                }
            }
        }

        let compiled = chains
            .into_iter()
            .map(|chain| {
                let funcs = self
                    .rules
                    .iter()
                    .filter(|rule| rule.enabled && (chain.is_empty() || rule.alt.contains(&chain)))
                    .map(|rule| rule.func.clone())
                    .collect();
                (chain, funcs)
            })
            .collect::<HashMap<_, _>>();
        log::trace!("compiled {} rule chain(s)", compiled.len());
        compiled
    }

    fn make_rule(name: &str, func: F, alt: &[&str]) -> Rule<F> {
        Rule {
            name: name.to_string(),
            enabled: true,
            func,
            alt: alt.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Replaces the function and alternate chains of rule `name`.
    pub fn at(&mut self, name: &str, func: F, alt: &[&str]) -> Result<()> {
        let idx = self.find(name).ok_or_else(|| Error::RuleNotFound {
            name: name.to_string(),
        })?;
        let rule = &mut self.rules[idx];
        rule.func = func;
        rule.alt = alt.iter().map(|a| a.to_string()).collect();
        self.invalidate();
        Ok(())
    }

    /// Inserts a new rule right before `before_name`.
    pub fn before(&mut self, before_name: &str, name: &str, func: F, alt: &[&str]) -> Result<()> {
        let idx = self.find(before_name).ok_or_else(|| Error::RuleNotFound {
            name: before_name.to_string(),
        })?;
        self.rules.insert(idx, Self::make_rule(name, func, alt));
        self.invalidate();
        Ok(())
    }

    /// Inserts a new rule right after `after_name`.
    pub fn after(&mut self, after_name: &str, name: &str, func: F, alt: &[&str]) -> Result<()> {
        let idx = self.find(after_name).ok_or_else(|| Error::RuleNotFound {
            name: after_name.to_string(),
        })?;
        self.rules.insert(idx + 1, Self::make_rule(name, func, alt));
        self.invalidate();
        Ok(())
    }

    /// Appends a rule to the end of the chain. Names are not deduplicated;
    /// lookups address the first match.
    pub fn push(&mut self, name: &str, func: F, alt: &[&str]) {
        self.rules.push(Self::make_rule(name, func, alt));
        self.invalidate();
    }

    fn set_enabled<I, S>(&mut self, names: I, enabled: bool, ignore_invalid: bool) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|n| n.as_ref().to_string())
            .collect::<Vec<_>>();

        let missing = self.missing(&names);
        if !missing.is_empty() && !ignore_invalid {
            return Err(Error::InvalidRuleName { names: missing });
        }

        let mut found = Vec::new();
        for name in names {
            if let Some(idx) = self.find(&name) {
                self.rules[idx].enabled = enabled;
                found.push(name);
            }
        }
        self.invalidate();
        Ok(found)
    }

    /// Enables the named rules and returns the names that exist.
    ///
    /// Unless `ignore_invalid` is set, an unknown name fails the whole call
    /// before anything changes.
    pub fn enable<I, S>(&mut self, names: I, ignore_invalid: bool) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_enabled(names, true, ignore_invalid)
    }

    /// Disables the named rules; see [`Ruler::enable`].
    pub fn disable<I, S>(&mut self, names: I, ignore_invalid: bool) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_enabled(names, false, ignore_invalid)
    }

    /// Disables every rule, then enables exactly `names`.
    pub fn enable_only<I, S>(&mut self, names: I, ignore_invalid: bool) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|n| n.as_ref().to_string())
            .collect::<Vec<_>>();
        if !ignore_invalid {
            let missing = self.missing(&names);
            if !missing.is_empty() {
                return Err(Error::InvalidRuleName { names: missing });
            }
        }
        Ok(self.restrict_to(&names))
    }

    /// Names from `names` this ruler does not define.
    pub fn missing(&self, names: &[String]) -> Vec<String> {
        names
            .iter()
            .filter(|n| self.find(n).is_none())
            .cloned()
            .collect()
    }

    /// Enables exactly the known rules among `names`, returning them.
    pub(crate) fn restrict_to(&mut self, names: &[String]) -> Vec<String> {
        let mut found = Vec::new();
        for rule in &mut self.rules {
            rule.enabled = names.contains(&rule.name);
            if rule.enabled {
                found.push(rule.name.clone());
            }
        }
        self.invalidate();
        found
    }

    /// Enabled rule functions of `chain` in execution order. `""` is the
    /// default chain; an unknown chain yields nothing.
    pub fn get_rules(&self, chain: &str) -> &[F] {
        self.cache
            .get_or_init(|| self.compile())
            .get(chain)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// All rule names in execution order, enabled or not.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name.as_str())
    }

    /// Names of currently enabled rules in execution order.
    pub fn enabled_names(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|rule| rule.enabled)
            .map(|rule| rule.name.as_str())
    }
}

impl<F: Clone> Default for Ruler<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> fmt::Debug for Ruler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| {
                format!(
                    "{}{}",
                    rule.name,
                    if rule.enabled { "" } else { " (disabled)" }
                )
            }))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    type F = fn() -> u32;

    fn one() -> u32 {
        1
    }
    fn two() -> u32 {
        2
    }
    fn three() -> u32 {
        3
    }

    fn results(ruler: &Ruler<F>, chain: &str) -> Vec<u32> {
        ruler.get_rules(chain).iter().map(|f| f()).collect()
    }

    #[test]
    fn at_replaces_rule_in_place() {
        let mut ruler = Ruler::<F>::new();
        ruler.push("test", one, &[]);
        ruler.at("test", two, &[]).unwrap();

        assert_eq!(results(&ruler, ""), vec![2]);
    }

    #[test]
    fn before_and_after_inject_relative_to_anchor() {
        let mut ruler = Ruler::<F>::new();
        ruler.push("middle", two, &[]);
        ruler.before("middle", "first", one, &[]).unwrap();
        ruler.after("middle", "last", three, &[]).unwrap();

        assert_eq!(results(&ruler, ""), vec![1, 2, 3]);
        assert_eq!(ruler.names().collect::<Vec<_>>(), vec!["first", "middle", "last"]);
    }

    #[test]
    fn missing_anchor_is_rule_not_found() {
        let mut ruler = Ruler::<F>::new();
        let err = ruler.before("nope", "x", one, &[]).unwrap_err();
        assert_eq!(err.to_string(), "Parser rule not found: nope");
        assert!(ruler.after("nope", "x", one, &[]).is_err());
        assert!(ruler.at("nope", one, &[]).is_err());
    }

    #[test]
    fn enable_and_disable_toggle_rules() {
        let mut ruler = Ruler::<F>::new();
        ruler.push("a", one, &[]);
        ruler.push("b", two, &[]);
        ruler.push("c", three, &[]);

        ruler.disable(["a", "c"], false).unwrap();
        assert_eq!(results(&ruler, ""), vec![2]);

        ruler.enable(["a"], false).unwrap();
        assert_eq!(results(&ruler, ""), vec![1, 2]);
    }

    #[test]
    fn disable_then_enable_restores_order() {
        let mut ruler = Ruler::<F>::new();
        ruler.push("a", one, &[]);
        ruler.push("b", two, &[]);
        ruler.push("c", three, &[]);
        let before = results(&ruler, "");

        ruler.disable(["b", "a"], false).unwrap();
        ruler.enable(["b", "a"], false).unwrap();

        assert_eq!(results(&ruler, ""), before);
    }

    #[test]
    fn enable_only_disables_everything_else() {
        let mut ruler = Ruler::<F>::new();
        ruler.push("a", one, &[]);
        ruler.push("b", two, &[]);
        ruler.push("c", three, &[]);

        ruler.enable_only(["b"], false).unwrap();
        assert_eq!(results(&ruler, ""), vec![2]);
        assert_eq!(ruler.enabled_names().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn alt_chains_contain_only_members() {
        let mut ruler = Ruler::<F>::new();
        ruler.push("a", one, &[]);
        ruler.push("b", two, &["foo", "bar"]);
        ruler.push("c", three, &["foo"]);

        assert_eq!(results(&ruler, ""), vec![1, 2, 3]);
        assert_eq!(results(&ruler, "foo"), vec![2, 3]);
        assert_eq!(results(&ruler, "bar"), vec![2]);
        assert!(results(&ruler, "unknown").is_empty());

        ruler.disable(["b"], false).unwrap();
        assert_eq!(results(&ruler, "foo"), vec![3]);
        assert!(results(&ruler, "bar").is_empty());
    }

    #[test]
    fn unknown_name_fails_without_partial_mutation() {
        let mut ruler = Ruler::<F>::new();
        ruler.push("a", one, &[]);
        ruler.push("b", two, &[]);

        let err = ruler.disable(["a", "nope", "missing"], false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Rules manager: invalid rule name nope, missing"
        );
        assert_eq!(results(&ruler, ""), vec![1, 2]);

        assert!(ruler.enable_only(["nope"], false).is_err());
        assert_eq!(results(&ruler, ""), vec![1, 2]);
    }

    #[test]
    fn ignore_invalid_reports_found_names() {
        let mut ruler = Ruler::<F>::new();
        ruler.push("a", one, &[]);

        let found = ruler.disable(["a", "nope"], true).unwrap();
        assert_eq!(found, vec!["a".to_string()]);
        assert!(results(&ruler, "").is_empty());
    }

    #[test]
    fn cache_is_rebuilt_after_push() {
        let mut ruler = Ruler::<F>::new();
        ruler.push("a", one, &[]);
        assert_eq!(results(&ruler, ""), vec![1]);
        ruler.push("b", two, &[]);
        assert_eq!(results(&ruler, ""), vec![1, 2]);
    }
}
