//! Span and byte offset types for template positions.

use std::ops::Range;
use text_size::{TextRange, TextSize};

/// A byte offset into a template string.
pub type ByteOffset = TextSize;

/// A half-open byte range `[start, end)` in template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// The start byte offset (inclusive).
    pub start: ByteOffset,
    /// The end byte offset (exclusive).
    pub end: ByteOffset,
}

impl Span {
    /// Creates a new span from start and end byte offsets.
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates an empty span at the given offset.
    #[inline]
    pub fn empty(offset: impl Into<ByteOffset>) -> Self {
        let offset = offset.into();
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Creates a span from a `usize` byte range, as produced by `logos`.
    #[inline]
    pub fn from_range(range: Range<usize>) -> Self {
        Self {
            start: TextSize::from(range.start as u32),
            end: TextSize::from(range.end as u32),
        }
    }

    /// Returns the span as a `usize` range suitable for slicing.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        u32::from(self.start) as usize..u32::from(self.end) as usize
    }

    /// Returns the text covered by this span, or `None` when it falls outside `text`
    /// or splits a UTF-8 sequence.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.range())
    }

    /// Returns the length of this span in bytes.
    #[inline]
    pub fn len(&self) -> TextSize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<TextRange> for Span {
    fn from(range: TextRange) -> Self {
        Self {
            start: range.start(),
            end: range.end(),
        }
    }
}

impl From<Span> for TextRange {
    fn from(span: Span) -> Self {
        TextRange::new(span.start, span.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_span_from_range() {
        let span = Span::from_range(3..9);
        assert_eq!(span.start, TextSize::from(3));
        assert_eq!(span.end, TextSize::from(9));
        assert_eq!(span.range(), 3..9);
    }

    #[test]
    fn test_span_empty() {
        let span = Span::empty(5u32);
        assert!(span.is_empty());
        assert_eq!(span.len(), TextSize::from(0));
    }

    #[test]
    fn test_span_slice() {
        let text = "a<var>b</var>c";
        let span = Span::from_range(1..6);
        assert_eq!(span.slice(text), Some("<var>"));
        assert_eq!(Span::from_range(10..40).slice(text), None);
    }
}
