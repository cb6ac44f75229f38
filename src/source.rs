use std::fmt;

/// A half-open byte range `[start, end)` over a [`SourceBuffer`].
///
/// Spans are plain values; all line/column derivation goes through the
/// buffer that produced them. Offsets are assumed valid for that buffer --
/// handing a span to a different buffer is a contract violation, not a
/// recoverable error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Starting byte offset (inclusive).
    pub start: usize,
    /// Ending byte offset (exclusive).
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted span {}..{}", start, end);
        Self { start, end }
    }

    /// Zero-length span at `offset`, used for insertions.
    pub fn empty_at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// True if the spans share at least one byte position.
    pub fn intersects(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Two spans conflict if they intersect and at least one is non-empty.
    ///
    /// Under the half-open definition two empty spans can never intersect,
    /// so two insertions at the same offset are not a conflict. An empty
    /// span strictly inside a non-empty span still intersects it.
    pub fn conflicts_with(&self, other: &Span) -> bool {
        self.intersects(other)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A 1-based line/column pair derived from a span start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Loc {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.line, self.column)
    }
}

/// Immutable source text with a precomputed line-start index.
///
/// Owned exclusively for the duration of one analysis run; rules share it
/// by reference and never mutate it.
#[derive(Debug)]
pub struct SourceBuffer {
    text: String,
    line_starts: Vec<usize>,
}

impl SourceBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// 1-based line number of a byte offset.
    pub fn line_of(&self, offset: usize) -> usize {
        // partition_point: number of line starts at or before `offset`.
        self.line_starts.partition_point(|&s| s <= offset)
    }

    /// 1-based column number of a byte offset.
    pub fn column_of(&self, offset: usize) -> usize {
        offset - self.line_start(self.line_of(offset)) + 1
    }

    pub fn loc_of(&self, offset: usize) -> Loc {
        let line = self.line_of(offset);
        Loc {
            line,
            column: offset - self.line_start(line) + 1,
        }
    }

    /// Byte offset of the first character of a 1-based line.
    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts[line - 1]
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// The text of a 1-based line, without its trailing newline.
    pub fn line_text(&self, line: usize) -> &str {
        let start = self.line_start(line);
        let end = self
            .line_starts
            .get(line)
            .map(|&next| next - 1)
            .unwrap_or(self.text.len());
        &self.text[start..end]
    }

    pub fn slice(&self, span: Span) -> &str {
        &self.text[span.start..span.end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_containment_and_overlap() {
        let a = Span::new(2, 6);
        assert!(a.contains(2));
        assert!(a.contains(5));
        assert!(!a.contains(6));

        assert!(a.intersects(&Span::new(5, 9)));
        assert!(!a.intersects(&Span::new(6, 9)));
        assert!(!a.intersects(&Span::empty_at(4)));
    }

    #[test]
    fn empty_spans_conflict_only_inside_nonempty_spans() {
        let insert_a = Span::empty_at(3);
        let insert_b = Span::empty_at(3);
        // Two insertions at the same offset are not a conflict.
        assert!(!insert_a.conflicts_with(&insert_b));
        // An insertion strictly inside a replaced region is.
        assert!(insert_a.conflicts_with(&Span::new(0, 10)));
        // At a region boundary it is not.
        assert!(!Span::empty_at(0).conflicts_with(&Span::new(0, 10)));
        assert!(!Span::empty_at(10).conflicts_with(&Span::new(0, 10)));
    }

    #[test]
    fn line_and_column_are_one_based() {
        let buf = SourceBuffer::new("abc\ndef\n\nghi");
        assert_eq!(buf.loc_of(0), Loc { line: 1, column: 1 });
        assert_eq!(buf.loc_of(2), Loc { line: 1, column: 3 });
        assert_eq!(buf.loc_of(4), Loc { line: 2, column: 1 });
        assert_eq!(buf.loc_of(8), Loc { line: 3, column: 1 });
        assert_eq!(buf.loc_of(9), Loc { line: 4, column: 1 });
    }

    #[test]
    fn line_text_excludes_newline() {
        let buf = SourceBuffer::new("abc\ndef");
        assert_eq!(buf.line_text(1), "abc");
        assert_eq!(buf.line_text(2), "def");
        assert_eq!(buf.line_count(), 2);
    }

    #[test]
    fn offset_at_newline_belongs_to_its_line() {
        let buf = SourceBuffer::new("ab\ncd");
        assert_eq!(buf.line_of(2), 1);
        assert_eq!(buf.column_of(2), 3);
    }
}
