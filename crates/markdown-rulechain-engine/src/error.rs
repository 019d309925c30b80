use std::fmt;

use thiserror::Error;

/// Boxed error returned by user callbacks (highlighters, plugins).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which bulk rule operation produced an [`Error::UnknownRules`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    Enable,
    Disable,
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleAction::Enable => f.write_str("enable"),
            RuleAction::Disable => f.write_str("disable"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Wrong preset \"{name}\", check name")]
    UnknownPreset { name: String },

    #[error("Wrong preset, can't be empty")]
    EmptyPreset,

    #[error("Parser rule not found: {name}")]
    RuleNotFound { name: String },

    #[error("Rules manager: invalid rule name {}", names.join(", "))]
    InvalidRuleName { names: Vec<String> },

    #[error("Failed to {action} unknown rule(s): {}", names.join(", "))]
    UnknownRules {
        action: RuleAction,
        names: Vec<String>,
    },

    #[error("none of the block rules matched (line {line})")]
    NoBlockRuleMatched { line: usize },

    #[error("block rule didn't increment state.line (line {line})")]
    BlockRuleNoProgress { line: usize },

    #[error("inline rule didn't increment state.pos (pos {pos})")]
    InlineRuleNoProgress { pos: usize },

    #[error("highlight callback failed")]
    Highlight {
        #[source]
        source: BoxError,
    },

    #[error("plugin failed to apply")]
    Plugin {
        #[source]
        source: BoxError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_messages_keep_their_wording() {
        let err = Error::NoBlockRuleMatched { line: 0 };
        assert!(err.to_string().contains("none of the block rules matched"));

        let err = Error::BlockRuleNoProgress { line: 3 };
        assert!(
            err.to_string()
                .contains("block rule didn't increment state.line")
        );

        let err = Error::InlineRuleNoProgress { pos: 7 };
        assert!(
            err.to_string()
                .contains("inline rule didn't increment state.pos")
        );
    }

    #[test]
    fn unknown_rules_lists_every_name() {
        let err = Error::UnknownRules {
            action: RuleAction::Disable,
            names: vec!["foo".into(), "bar".into()],
        };
        assert_eq!(
            err.to_string(),
            "Failed to disable unknown rule(s): foo, bar"
        );
    }
}
