//! Built-in block rules, one module per construct.

pub mod blockquote;
pub mod code;
pub mod fence;
pub mod heading;
pub mod hr;
pub mod html_block;
pub mod lheading;
pub mod list;
pub mod paragraph;
pub mod reference;
pub mod table;
