//! Built-in core rules, in their default chain order.

pub mod block;
pub mod inline;
pub mod linkify;
pub mod normalize;
pub mod replacements;
pub mod smartquotes;
pub mod text_join;
