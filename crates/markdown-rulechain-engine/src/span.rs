use serde::Serialize;

/// A line range `[start, end)` into the normalized source.
///
/// Block tokens record the lines they were parsed from so plugins can map
/// rendered output back to the input (e.g. for scroll sync).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct LineSpan {
    /// First line, zero based.
    pub start: usize,
    /// One past the last line.
    pub end: usize,
}

impl LineSpan {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the number of lines. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span covers no lines (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl From<[usize; 2]> for LineSpan {
    fn from([start, end]: [usize; 2]) -> Self {
        Self { start, end }
    }
}
