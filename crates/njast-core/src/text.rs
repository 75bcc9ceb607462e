//! Text model primitives: positions and spans.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 1-based (line, column) pair. Columns count UTF-8 bytes.
///
/// Ordering is lexicographic: line first, then column.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Position {
    pub line: u32,
    pub ch: u32,
}

impl Position {
    #[inline]
    pub const fn new(line: u32, ch: u32) -> Self {
        Self { line, ch }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.ch)
    }
}

/// Half-open source span `[start, end)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[inline]
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "span start {start} is after end {end}");
        Self { start, end }
    }

    #[inline]
    pub const fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if `pos` lies within `[start, end)`.
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Returns `true` if `other` lies entirely within this span.
    #[inline]
    pub fn contains_span(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns `true` if the two spans share at least one position.
    #[inline]
    pub fn overlaps(&self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn contains_is_half_open() {
        let span = Span::new(Position::new(1, 5), Position::new(2, 3));
        assert!(span.contains(Position::new(1, 5)));
        assert!(span.contains(Position::new(1, 400)));
        assert!(span.contains(Position::new(2, 2)));
        assert!(!span.contains(Position::new(2, 3)));
        assert!(!span.contains(Position::new(1, 4)));
    }

    #[test]
    fn empty_span_contains_nothing() {
        let span = Span::point(Position::new(3, 3));
        assert!(span.is_empty());
        assert!(!span.contains(Position::new(3, 3)));
    }

    #[test]
    fn cover_takes_extremes() {
        let a = Span::new(Position::new(1, 1), Position::new(1, 4));
        let b = Span::new(Position::new(2, 1), Position::new(3, 1));
        assert_eq!(
            a.cover(b),
            Span::new(Position::new(1, 1), Position::new(3, 1))
        );
    }

    proptest! {
        #[test]
        fn cover_contains_both(
            a in (1u32..50, 1u32..80, 0u32..3, 0u32..80),
            b in (1u32..50, 1u32..80, 0u32..3, 0u32..80),
        ) {
            let make = |(line, ch, dl, dc): (u32, u32, u32, u32)| {
                let start = Position::new(line, ch);
                let end = Position::new(line + dl, if dl == 0 { ch + dc } else { dc + 1 });
                Span::new(start, end)
            };
            let (a, b) = (make(a), make(b));
            let covered = a.cover(b);
            prop_assert!(covered.contains_span(a));
            prop_assert!(covered.contains_span(b));
        }
    }
}
