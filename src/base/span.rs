//! Spans over source text and the line index that maps them to positions.

use serde::Serialize;
use text_size::{TextRange, TextSize};

use super::position::{Position, Range};

/// `{start, length}` over UTF-8 byte offsets.
///
/// The zero/zero span doubles as "no match" for queries that must always return
/// a span (see enclosing-comment lookup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct TextSpan {
    pub start: u32,
    pub length: u32,
}

impl TextSpan {
    pub const fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    pub fn from_bounds(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start {start} past end {end}");
        Self {
            start,
            length: end - start,
        }
    }

    pub fn end(&self) -> u32 {
        self.start + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// `start <= offset < end`
    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end()
    }

    /// Inclusive on both ends, so empty spans intersect their own position.
    pub fn intersects(&self, other: TextSpan) -> bool {
        self.start <= other.end() && other.start <= self.end()
    }

    pub fn to_range(self) -> TextRange {
        TextRange::at(TextSize::new(self.start), TextSize::new(self.length))
    }
}

impl From<TextRange> for TextSpan {
    fn from(range: TextRange) -> Self {
        Self {
            start: range.start().into(),
            length: range.len().into(),
        }
    }
}

/// Precomputed line starts for one file's text.
///
/// Converts byte offsets to zero-based `(line, character)` with `character`
/// counted in UTF-16 code units, and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset at which each line begins.
    line_starts: Vec<TextSize>,
    /// Total text length.
    len: TextSize,
    /// Lines holding non-ASCII text; only these need a UTF-16 walk.
    wide_lines: Vec<u32>,
    text: std::sync::Arc<str>,
}

impl LineIndex {
    pub fn new(text: impl Into<std::sync::Arc<str>>) -> Self {
        let text: std::sync::Arc<str> = text.into();
        let mut line_starts = vec![TextSize::new(0)];
        let mut wide_lines = Vec::new();
        let mut line = 0u32;
        let mut line_is_wide = false;

        for (offset, ch) in text.char_indices() {
            if !ch.is_ascii() {
                line_is_wide = true;
            }
            if ch == '\n' {
                if line_is_wide {
                    wide_lines.push(line);
                }
                line += 1;
                line_is_wide = false;
                line_starts.push(TextSize::new(offset as u32 + 1));
            }
        }
        if line_is_wide {
            wide_lines.push(line);
        }

        Self {
            line_starts,
            len: TextSize::of(&*text),
            wide_lines,
            text,
        }
    }

    pub fn len(&self) -> TextSize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == TextSize::new(0)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line containing `offset`. Offsets past the end clamp to the last line.
    pub fn line_of(&self, offset: TextSize) -> u32 {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line as u32,
            Err(next) => (next - 1) as u32,
        }
    }

    /// Convert a byte offset to a zero-based position.
    pub fn line_col(&self, offset: TextSize) -> Position {
        let offset = offset.min(self.len);
        let line = self.line_of(offset);
        let line_start = self.line_starts[line as usize];
        let character = if self.wide_lines.binary_search(&line).is_ok() {
            let slice = &self.text[usize::from(line_start)..usize::from(offset)];
            slice.chars().map(|c| c.len_utf16() as u32).sum()
        } else {
            u32::from(offset - line_start)
        };
        Position::new(line, character)
    }

    /// Convert a byte range to a line/character range.
    pub fn range(&self, range: TextRange) -> Range {
        Range::new(self.line_col(range.start()), self.line_col(range.end()))
    }

    /// Convert a position back to a byte offset, if it lies inside the text.
    pub fn offset(&self, position: Position) -> Option<TextSize> {
        let line_range = self.line_range(position.line)?;
        let line_text = &self.text[line_range];
        let mut utf16 = 0u32;
        for (byte_idx, ch) in line_text.char_indices() {
            if utf16 == position.character {
                return Some(line_range.start() + TextSize::new(byte_idx as u32));
            }
            utf16 += ch.len_utf16() as u32;
        }
        (utf16 == position.character).then_some(line_range.end())
    }

    /// Byte range of a line, excluding its terminating newline.
    pub fn line_range(&self, line: u32) -> Option<TextRange> {
        let start = *self.line_starts.get(line as usize)?;
        let end = match self.line_starts.get(line as usize + 1) {
            Some(next) => *next - TextSize::new(1),
            None => self.len,
        };
        let mut range = TextRange::new(start, end);
        if self.text[range].ends_with('\r') {
            range = TextRange::new(start, end - TextSize::new(1));
        }
        Some(range)
    }

    /// Text of a line without its line terminator.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        self.line_range(line).map(|range| &self.text[range])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_ascii() {
        let index = LineIndex::new("let a = 1;\nlet b = 2;\n");
        assert_eq!(index.line_col(TextSize::new(0)), Position::new(0, 0));
        assert_eq!(index.line_col(TextSize::new(4)), Position::new(0, 4));
        assert_eq!(index.line_col(TextSize::new(11)), Position::new(1, 0));
        assert_eq!(index.line_col(TextSize::new(15)), Position::new(1, 4));
        assert_eq!(index.line_col(TextSize::new(22)), Position::new(2, 0));
    }

    #[test]
    fn test_line_col_counts_utf16_units() {
        // 'é' is two UTF-8 bytes but one UTF-16 unit; '😀' is four bytes and two units.
        let index = LineIndex::new("\"é😀\" + x");
        let x_offset = TextSize::new("\"é😀\" + ".len() as u32);
        assert_eq!(index.line_col(x_offset), Position::new(0, 8));
        assert_eq!(index.offset(Position::new(0, 8)), Some(x_offset));
    }

    #[test]
    fn test_offset_round_trip_and_out_of_range() {
        let index = LineIndex::new("a\nbc");
        assert_eq!(index.offset(Position::new(1, 2)), Some(TextSize::new(4)));
        assert_eq!(index.offset(Position::new(1, 3)), None);
        assert_eq!(index.offset(Position::new(5, 0)), None);
    }

    #[test]
    fn test_line_text_strips_crlf() {
        let index = LineIndex::new("first\r\nsecond");
        assert_eq!(index.line_text(0), Some("first"));
        assert_eq!(index.line_text(1), Some("second"));
        assert_eq!(index.line_text(2), None);
    }

    #[test]
    fn test_span_intersects_is_inclusive() {
        let span = TextSpan::new(4, 3);
        assert!(span.intersects(TextSpan::new(7, 0)));
        assert!(span.intersects(TextSpan::new(0, 4)));
        assert!(!span.intersects(TextSpan::new(8, 2)));
        assert!(span.contains(6));
        assert!(!span.contains(7));
    }
}
