//! # Parsers
//!
//! Three nested parsers, each driven by its own [`Ruler`](crate::ruler::Ruler):
//!
//! - [`core`]: document-level chain that calls the other two.
//! - [`blocks`]: line-oriented structure (paragraphs, lists, fences...).
//! - [`inline`]: spans inside one block's text.
//!
//! [`helpers`] holds the link label, destination and title scanners shared by
//! block references and inline links.

pub mod blocks;
pub mod core;
pub mod helpers;
pub mod inline;
