//! Source positions for parsed markup.

use text_size::TextSize;

/// A span representing a byte range in the template source.
///
/// Spans are half-open intervals `[start, end)`. Nodes created by the compiler
/// rather than the parser carry an empty span at offset zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// The start byte offset (inclusive).
    pub start: TextSize,
    /// The end byte offset (exclusive).
    pub end: TextSize,
}

impl Span {
    /// Creates a new span from start and end byte offsets.
    #[inline]
    pub fn new(start: impl Into<TextSize>, end: impl Into<TextSize>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates a span from `usize` offsets as produced by the lexer.
    #[inline]
    pub fn from_range(range: std::ops::Range<usize>) -> Self {
        Self::new(
            TextSize::from(range.start as u32),
            TextSize::from(range.end as u32),
        )
    }

    /// Creates an empty span at the given offset.
    #[inline]
    pub fn empty(offset: impl Into<TextSize>) -> Self {
        let offset = offset.into();
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns true if this span is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns a span covering both this span and another.
    #[inline]
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: std::cmp::min(self.start, other.start),
            end: std::cmp::max(self.end, other.end),
        }
    }

    /// Returns the source text covered by this span.
    pub fn slice(self, source: &str) -> &str {
        let start = u32::from(self.start) as usize;
        let end = u32::from(self.end) as usize;
        source.get(start..end).unwrap_or("")
    }
}

/// A 0-indexed line and column (column counted in bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Maps byte offsets of a template source to line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    /// Builds the index for `text`.
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(TextSize::from(0))
            .chain(
                text.match_indices('\n')
                    .map(|(offset, _)| TextSize::from((offset + 1) as u32)),
            )
            .collect();
        Self { line_starts }
    }

    /// Returns the number of lines in the source.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset to a line/column position.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let col = u32::from(offset) - u32::from(self.line_starts[line]);
        LineCol::new(line as u32, col)
    }
}
