/// Read cursor over an in-memory source file.
///
/// Offsets handed to `char_at` and `sub_sequence` are character offsets
/// relative to the cursor, never byte offsets.
#[derive(Debug, Clone)]
pub struct SourceText {
    source: String,
    offset: usize,
    line: usize,
    column: usize,
}

/// Saved cursor state, see [`SourceText::position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl SourceText {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Characters left after the cursor.
    pub fn len(&self) -> usize {
        self.remaining().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.offset >= self.source.len()
    }

    pub fn char_at(&self, index: usize) -> Option<char> {
        self.remaining().chars().nth(index)
    }

    pub fn sub_sequence(&self, start: usize, end: usize) -> String {
        self.remaining()
            .chars()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect()
    }

    pub fn remaining(&self) -> &str {
        &self.source[self.offset..]
    }

    /// Up to `length` characters of lookahead.
    pub fn slice(&self, length: usize) -> String {
        self.sub_sequence(0, length)
    }

    /// Moves the cursor forward by `bytes`, clamped to a char boundary at or
    /// before the end of input.
    pub fn advance(&mut self, bytes: usize) {
        let mut end = (self.offset + bytes).min(self.source.len());
        while !self.source.is_char_boundary(end) {
            end -= 1;
        }
        for c in self.source[self.offset..end].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset = end;
    }

    pub fn position(&self) -> Position {
        Position {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    pub fn set_position(&mut self, position: Position) {
        self.offset = position.offset.min(self.source.len());
        self.line = position.line;
        self.column = position.column;
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }
}

/// 1-based line and column of a byte offset into `source`.
pub fn line_col(source: &str, byte_offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, c) in source.char_indices() {
        if i >= byte_offset {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_offsets_are_unicode_aware() {
        let text = SourceText::new("ñña b");
        assert_eq!(text.len(), 5);
        assert_eq!(text.char_at(1), Some('ñ'));
        assert_eq!(text.sub_sequence(1, 3), "ña");
        assert_eq!(text.char_at(9), None);
    }

    #[test]
    fn test_advance_tracks_lines() {
        let mut text = SourceText::new("ab\ncd");
        text.advance(4);
        assert_eq!(text.line(), 2);
        assert_eq!(text.column(), 2);
        assert_eq!(text.remaining(), "d");
    }

    #[test]
    fn test_restore_position() {
        let mut text = SourceText::new("hello");
        let saved = text.position();
        text.advance(3);
        assert_eq!(text.slice(10), "lo");
        text.set_position(saved);
        assert_eq!(text.remaining(), "hello");
        assert_eq!(text.column(), 1);
    }

    #[test]
    fn test_line_col() {
        assert_eq!(line_col("a = 1;\nb", 7), (2, 1));
        assert_eq!(line_col("abc", 2), (1, 3));
    }
}
