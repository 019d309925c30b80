//! # markdown-rulechain engine
//!
//! A Markdown to HTML pipeline built from ordered, named rule chains.
//!
//! ## Architecture
//!
//! ```text
//! source ─► core chain ─┬─ normalize
//!                       ├─ block ──► block chain  (table, code, fence, ... paragraph)
//!                       ├─ inline ─► inline chain (text, escape, emphasis, link, ...)
//!                       │            + post-processing (balance_pairs, fragments_join)
//!                       └─ linkify, replacements, smartquotes, text_join
//!        ─► Vec<Token> ─► Renderer ─► HTML
//! ```
//!
//! Every stage is a [`Ruler`](ruler::Ruler): rules can be enabled, disabled,
//! reordered or added by plugins. The [`Renderer`](render::Renderer) maps
//! token kinds to output functions and falls back to a generic tag printer.
//!
//! ## Presets
//!
//! - `default`: every rule on, raw HTML off.
//! - `commonmark`: the CommonMark rule set, raw HTML on, XHTML output.
//! - `zero`: paragraphs and text only, a base for enabling rules one by one.

pub mod common;
pub mod env;
pub mod error;
pub mod markdown;
pub mod options;
pub mod parsing;
pub mod render;
pub mod ruler;
pub mod span;
pub mod token;

pub use env::{Env, Extensions, Reference};
pub use error::{Error, Result};
pub use markdown::Markdown;
pub use options::{Options, OptionsUpdate, Preset, PresetName, Quotes};
pub use token::{Nesting, Token};
