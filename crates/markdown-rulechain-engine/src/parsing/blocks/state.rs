use crate::Markdown;
use crate::common::is_space;
use crate::env::Env;
use crate::token::{Nesting, Token};

/// Line-indexed cursor for one block-level parse.
///
/// Per-line arrays are indexed by line number and have one extra sentinel
/// entry at `line_max`. Container rules patch `b_marks`, `t_shift`,
/// `s_count` and `bs_count` for the lines they own and restore them after the
/// nested tokenize call.
pub struct StateBlock<'a> {
    pub src: &'a str,
    pub md: &'a Markdown,
    pub env: &'a mut Env,
    pub tokens: &'a mut Vec<Token>,

    /// Byte offset of each line start.
    pub b_marks: Vec<usize>,
    /// Byte offset of each line end (the `\n` or end of input).
    pub e_marks: Vec<usize>,
    /// Bytes of leading whitespace per line.
    pub t_shift: Vec<usize>,
    /// Columns of leading whitespace per line, tabs expanded. Negative marks
    /// a lazy continuation line inside a blockquote.
    pub s_count: Vec<i32>,
    /// Virtual column a line starts at, so tabs expand correctly after
    /// blockquote markers.
    pub bs_count: Vec<i32>,

    /// Required indent of the current container.
    pub blk_indent: i32,
    pub line: usize,
    pub line_max: usize,
    /// Set by the tokenizer; read by lists to decide tightness.
    pub tight: bool,
    /// Indent of the enclosing list, -1 outside lists.
    pub list_indent: i32,
    /// Container kind being parsed: `"root"`, `"blockquote"`, `"list"`,
    /// `"paragraph"`, `"reference"`, `"table"` or a plugin name.
    pub parent_type: &'static str,
    pub level: usize,
}

impl<'a> StateBlock<'a> {
    pub fn new(
        src: &'a str,
        md: &'a Markdown,
        env: &'a mut Env,
        tokens: &'a mut Vec<Token>,
    ) -> Self {
        let mut state = Self {
            src,
            md,
            env,
            tokens,
            b_marks: Vec::new(),
            e_marks: Vec::new(),
            t_shift: Vec::new(),
            s_count: Vec::new(),
            bs_count: Vec::new(),
            blk_indent: 0,
            line: 0,
            line_max: 0,
            tight: false,
            list_indent: -1,
            parent_type: "root",
            level: 0,
        };
        state.scan_lines();
        state
    }

    fn scan_lines(&mut self) {
        let bytes = self.src.as_bytes();
        let len = bytes.len();
        let mut start = 0;
        let mut indent = 0;
        let mut offset = 0;
        let mut indent_found = false;

        let mut pos = 0;
        while pos < len {
            let ch = bytes[pos];
            if !indent_found {
                if is_space(ch) {
                    indent += 1;
                    if ch == b'\t' {
                        offset += 4 - offset % 4;
                    } else {
                        offset += 1;
                    }
                    pos += 1;
                    continue;
                }
                indent_found = true;
            }

            if ch == b'\n' || pos == len - 1 {
                if ch != b'\n' {
                    pos += 1;
                }
                self.b_marks.push(start);
                self.e_marks.push(pos);
                self.t_shift.push(indent);
                self.s_count.push(offset);
                self.bs_count.push(0);

                indent_found = false;
                indent = 0;
                offset = 0;
                start = pos + 1;
            }
            pos += 1;
        }

        // sentinel line simplifies bounds checks
        self.b_marks.push(len);
        self.e_marks.push(len);
        self.t_shift.push(0);
        self.s_count.push(0);
        self.bs_count.push(0);

        self.line_max = self.b_marks.len() - 1;
    }

    /// Byte at `pos`, or 0 past the end of the source.
    pub fn byte_at(&self, pos: usize) -> u8 {
        self.src.as_bytes().get(pos).copied().unwrap_or(0)
    }

    /// Appends a block token, maintaining `level`.
    pub fn push(&mut self, kind: &str, tag: &str, nesting: Nesting) -> &mut Token {
        let mut token = Token::new(kind, tag, nesting);
        token.block = true;

        if nesting == Nesting::Closing {
            self.level = self.level.saturating_sub(1);
        }
        token.level = self.level;
        if nesting == Nesting::Opening {
            self.level += 1;
        }

        self.tokens.push(token);
        let last = self.tokens.len() - 1;
        &mut self.tokens[last]
    }

    pub fn is_empty(&self, line: usize) -> bool {
        self.b_marks[line] + self.t_shift[line] >= self.e_marks[line]
    }

    pub fn skip_empty_lines(&self, mut from: usize) -> usize {
        while from < self.line_max {
            if self.b_marks[from] + self.t_shift[from] < self.e_marks[from] {
                break;
            }
            from += 1;
        }
        from
    }

    pub fn skip_spaces(&self, mut pos: usize) -> usize {
        let bytes = self.src.as_bytes();
        while pos < bytes.len() && is_space(bytes[pos]) {
            pos += 1;
        }
        pos
    }

    /// Skips spaces backwards from `pos`, never going below `min`.
    pub fn skip_spaces_back(&self, mut pos: usize, min: usize) -> usize {
        let bytes = self.src.as_bytes();
        while pos > min {
            if !is_space(bytes[pos - 1]) {
                return pos;
            }
            pos -= 1;
        }
        pos
    }

    pub fn skip_chars(&self, mut pos: usize, byte: u8) -> usize {
        let bytes = self.src.as_bytes();
        while pos < bytes.len() && bytes[pos] == byte {
            pos += 1;
        }
        pos
    }

    pub fn skip_chars_back(&self, mut pos: usize, byte: u8, min: usize) -> usize {
        let bytes = self.src.as_bytes();
        while pos > min {
            if bytes[pos - 1] != byte {
                return pos;
            }
            pos -= 1;
        }
        pos
    }

    /// Source text of lines `[begin, end)` with up to `indent` columns of
    /// leading whitespace stripped from each line.
    pub fn get_lines(&self, begin: usize, end: usize, indent: i32, keep_last_lf: bool) -> String {
        if begin >= end {
            return String::new();
        }

        let bytes = self.src.as_bytes();
        let mut out = String::new();
        for line in begin..end {
            let line_start = self.b_marks[line];
            let mut first = line_start;
            let last = if line + 1 < end || keep_last_lf {
                (self.e_marks[line] + 1).min(bytes.len())
            } else {
                self.e_marks[line]
            };

            let mut line_indent = 0;
            while first < last && line_indent < indent {
                let ch = bytes[first];
                if is_space(ch) {
                    if ch == b'\t' {
                        line_indent += 4 - (line_indent + self.bs_count[line]) % 4;
                    } else {
                        line_indent += 1;
                    }
                } else if first - line_start < self.t_shift[line] {
                    // patched t_shift masks markers as spaces (blockquotes, list markers)
                    line_indent += 1;
                } else {
                    break;
                }
                first += 1;
            }

            if line_indent > indent {
                // partially expanded tab, e.g. "\t\tfoo" at indent 2 becomes "  \tfoo"
                out.extend(std::iter::repeat_n(' ', (line_indent - indent) as usize));
            }
            out.push_str(&self.src[first..last]);
        }
        out
    }
}
