//! Zero-based source positions and half-open ranges.

use std::fmt;

/// A location in the source text.
///
/// Both fields are zero-based. Columns count Unicode scalar values, not
/// bytes. Ordering compares the line first, then the column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open span `[start, end)` of source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Create a range. `start` must not come after `end`.
    #[must_use]
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "range start {start} is after end {end}");
        Self { start, end }
    }

    /// A zero-width range at `position`.
    #[must_use]
    pub const fn empty_at(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `position` falls inside the range (end excluded).
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }

    /// Smallest range covering every range in `ranges`.
    ///
    /// Returns `(0,0)-(0,0)` when `ranges` is empty.
    #[must_use]
    pub fn combine<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        ranges
            .into_iter()
            .reduce(|acc, range| Self {
                start: acc.start.min(range.start),
                end: acc.end.max(range.end),
            })
            .unwrap_or_default()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
