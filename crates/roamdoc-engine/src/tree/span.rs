use serde::{Deserialize, Serialize};

/// A byte range `[start, end)` within one source line.
///
/// Inline matching works in these units: `start` and `end` are absolute
/// columns on the line being scanned, so nested scans keep the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start column.
    pub start: usize,
    /// Exclusive end column.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// True when `other` lies entirely inside this span.
    #[must_use]
    pub fn contains(self, other: Span) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

/// Where a tree node came from in its source buffer.
///
/// Lines are zero-based and `end_line` is inclusive. Columns are byte offsets
/// on the start and end line, present only for nodes narrower than a line
/// (inline objects, heading text, table cells). Fixed once the node exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start_line: usize,
    pub end_line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_col: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_col: Option<usize>,
}

impl SourceSpan {
    /// A whole-line span covering `start..=end`. An inverted range collapses
    /// to the start line.
    pub fn lines(start: usize, end: usize) -> Self {
        Self {
            start_line: start,
            end_line: end.max(start),
            start_col: None,
            end_col: None,
        }
    }

    pub fn line(line: usize) -> Self {
        Self::lines(line, line)
    }

    /// A span inside a single line.
    pub fn within(line: usize, cols: Span) -> Self {
        Self {
            start_line: line,
            end_line: line,
            start_col: Some(cols.start),
            end_col: Some(cols.end),
        }
    }

    #[must_use]
    pub fn line_count(self) -> usize {
        self.end_line - self.start_line + 1
    }

    #[must_use]
    pub fn contains_line(self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_len_and_empty() {
        assert_eq!(Span::new(2, 7).len(), 5);
        assert!(Span::new(4, 4).is_empty());
        assert!(Span::new(5, 3).is_empty());
    }

    #[test]
    fn span_contains_nested_range() {
        let outer = Span::new(0, 10);
        assert!(outer.contains(Span::new(2, 8)));
        assert!(outer.contains(outer));
        assert!(!outer.contains(Span::new(8, 12)));
    }

    #[test]
    fn inverted_line_range_collapses() {
        let sp = SourceSpan::lines(5, 3);
        assert_eq!(sp.start_line, 5);
        assert_eq!(sp.end_line, 5);
        assert_eq!(sp.line_count(), 1);
    }

    #[test]
    fn within_records_columns() {
        let sp = SourceSpan::within(3, Span::new(4, 9));
        assert_eq!(sp.start_col, Some(4));
        assert_eq!(sp.end_col, Some(9));
        assert!(sp.contains_line(3));
        assert!(!sp.contains_line(4));
    }
}
