use std::collections::HashMap;

use crate::Markdown;
use crate::common::{is_md_ascii_punct, is_punct_char, is_white_space};
use crate::env::Env;
use crate::token::{Nesting, Token};

/// One run of emphasis-like markers waiting to be paired.
///
/// `token` indexes the text token holding the marker; `end` is set on an
/// opener once its closer is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiter {
    pub marker: u8,
    /// Total length of the marker run, used by the "rule of 3". Zero
    /// disables that check.
    pub length: usize,
    pub token: usize,
    pub end: Option<usize>,
    pub open: bool,
    pub close: bool,
}

/// Result of [`StateInline::scan_delims`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterRun {
    pub can_open: bool,
    pub can_close: bool,
    pub length: usize,
}

/// Cursor over one inline string, writing into a token list.
///
/// Delimiter lists are kept in an arena: each opening token gets a fresh
/// list so markers never pair across tag boundaries, and `tokens_meta`
/// records which list belongs to which opening token.
pub struct StateInline<'a> {
    pub src: &'a str,
    pub md: &'a Markdown,
    pub env: &'a mut Env,
    pub tokens: &'a mut Vec<Token>,

    pub pos: usize,
    pub pos_max: usize,
    pub level: usize,
    /// Plain text accumulated until the next token push.
    pub pending: String,
    pub pending_level: usize,

    /// `skip_token` results by start position.
    pub cache: HashMap<usize, usize>,

    pub delimiter_lists: Vec<Vec<Delimiter>>,
    current_delimiters: usize,
    prev_delimiters: Vec<usize>,
    /// Per token, the delimiter list opened by it.
    pub tokens_meta: Vec<Option<usize>>,

    /// Closing backtick run length -> last position seen.
    pub backticks: HashMap<usize, usize>,
    pub backticks_scanned: bool,

    /// Depth inside `<a>`; positive disables autolinking.
    pub link_level: i32,
}

impl<'a> StateInline<'a> {
    pub fn new(src: &'a str, md: &'a Markdown, env: &'a mut Env, tokens: &'a mut Vec<Token>) -> Self {
        let tokens_meta = vec![None; tokens.len()];
        Self {
            src,
            md,
            env,
            tokens,
            pos: 0,
            pos_max: src.len(),
            level: 0,
            pending: String::new(),
            pending_level: 0,
            cache: HashMap::new(),
            delimiter_lists: vec![Vec::new()],
            current_delimiters: 0,
            prev_delimiters: Vec::new(),
            tokens_meta,
            backticks: HashMap::new(),
            backticks_scanned: false,
            link_level: 0,
        }
    }

    /// Byte at `pos`, or 0 past the end.
    pub fn byte_at(&self, pos: usize) -> u8 {
        self.src.as_bytes().get(pos).copied().unwrap_or(0)
    }

    /// Character starting at `pos`, if `pos` is in range and on a boundary.
    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.src.get(pos..).and_then(|rest| rest.chars().next())
    }

    /// Byte length of the character at `pos`; 1 past the end.
    pub fn char_len_at(&self, pos: usize) -> usize {
        self.char_at(pos).map_or(1, char::len_utf8)
    }

    /// Delimiters of the innermost open tag.
    pub fn delimiters(&self) -> &Vec<Delimiter> {
        &self.delimiter_lists[self.current_delimiters]
    }

    pub fn delimiters_mut(&mut self) -> &mut Vec<Delimiter> {
        &mut self.delimiter_lists[self.current_delimiters]
    }

    /// Arena indices of every delimiter list: the top level first, then one
    /// per opening token.
    pub fn delimiter_list_ids(&self) -> Vec<usize> {
        std::iter::once(self.current_delimiters)
            .chain(self.tokens_meta.iter().flatten().copied())
            .collect()
    }

    /// Flushes `pending` as a text token.
    pub fn push_pending(&mut self) -> &mut Token {
        let mut token = Token::new("text", "", Nesting::SelfClosing);
        token.content = std::mem::take(&mut self.pending);
        token.level = self.pending_level;
        self.tokens.push(token);
        self.tokens_meta.push(None);
        let last = self.tokens.len() - 1;
        &mut self.tokens[last]
    }

    /// Appends a token after flushing pending text, maintaining `level` and
    /// the delimiter list stack.
    pub fn push(&mut self, kind: &str, tag: &str, nesting: Nesting) -> &mut Token {
        if !self.pending.is_empty() {
            self.push_pending();
        }

        let mut token = Token::new(kind, tag, nesting);
        let mut meta = None;

        if nesting == Nesting::Closing {
            self.level = self.level.saturating_sub(1);
            if let Some(prev) = self.prev_delimiters.pop() {
                self.current_delimiters = prev;
            }
        }

        token.level = self.level;

        if nesting == Nesting::Opening {
            self.level += 1;
            self.prev_delimiters.push(self.current_delimiters);
            self.delimiter_lists.push(Vec::new());
            self.current_delimiters = self.delimiter_lists.len() - 1;
            meta = Some(self.current_delimiters);
        }

        self.pending_level = self.level;
        self.tokens.push(token);
        self.tokens_meta.push(meta);
        let last = self.tokens.len() - 1;
        &mut self.tokens[last]
    }

    /// Measures the marker run at `start` and decides, from the characters
    /// around it, whether it may open or close emphasis.
    ///
    /// `can_split_word` is true for `*` and false for `_`, which may not
    /// open or close inside a word.
    pub fn scan_delims(&self, start: usize, can_split_word: bool) -> DelimiterRun {
        let max = self.pos_max;
        let marker = self.byte_at(start);

        // line boundaries count as whitespace
        let last_char = self.src[..start].chars().next_back().unwrap_or(' ');

        let mut pos = start;
        while pos < max && self.byte_at(pos) == marker {
            pos += 1;
        }
        let length = pos - start;

        let next_char = if pos < max {
            self.char_at(pos).unwrap_or(' ')
        } else {
            ' '
        };

        let is_last_punct = is_md_ascii_punct(last_char) || is_punct_char(last_char);
        let is_next_punct = is_md_ascii_punct(next_char) || is_punct_char(next_char);
        let is_last_white = is_white_space(last_char);
        let is_next_white = is_white_space(next_char);

        let left_flanking = !is_next_white && (!is_next_punct || is_last_white || is_last_punct);
        let right_flanking = !is_last_white && (!is_last_punct || is_next_white || is_next_punct);

        DelimiterRun {
            can_open: left_flanking && (can_split_word || !right_flanking || is_last_punct),
            can_close: right_flanking && (can_split_word || !left_flanking || is_next_punct),
            length,
        }
    }
}
