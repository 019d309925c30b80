//! Built-in inline rules. Tokenizing rules take `(state, silent)`; the
//! post-processing rules (`balance_pairs`, `fragments_join` and the
//! `post_process` halves of emphasis and strikethrough) take only `state`.

pub mod autolink;
pub mod backticks;
pub mod balance_pairs;
pub mod emphasis;
pub mod entity;
pub mod escape;
pub mod fragments_join;
pub mod html_inline;
pub mod image;
pub mod link;
pub mod linkify;
pub mod newline;
pub mod strikethrough;
pub mod text;
