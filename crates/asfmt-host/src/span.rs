//! Source spans
//!
//! Spans are half-open byte ranges into the text handed to the parser.

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Placeholder span for synthesized nodes
    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Smallest span covering both `self` and `other`
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slice the covered text out of `source`, clamped to its bounds
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        let end = self.end.min(source.len());
        let start = self.start.min(end);
        source.get(start..end).unwrap_or("")
    }
}

/// 1-based line and column (in characters) of a byte offset
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |pos| pos + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// 0-based line index of a byte offset
pub fn line_of(source: &str, offset: usize) -> usize {
    source
        .get(..offset.min(source.len()))
        .map_or(0, |prefix| prefix.matches('\n').count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_covers_both() {
        let merged = Span::new(4, 8).merge(Span::new(1, 5));
        assert_eq!(merged, Span::new(1, 8));
    }

    #[test]
    fn test_text_is_clamped() {
        assert_eq!(Span::new(2, 100).text("hello"), "llo");
        assert_eq!(Span::new(9, 12).text("hello"), "");
    }

    #[test]
    fn test_line_col() {
        let source = "let a = 1;\n  let b = 2;";
        assert_eq!(line_col(source, 0), (1, 1));
        assert_eq!(line_col(source, 13), (2, 3));
        assert_eq!(line_of(source, 13), 1);
    }
}
