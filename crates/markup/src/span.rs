//! Span and position types carried by markup events.

/// Byte span into the buffer an event was emitted with.
///
/// Invariant: `start` and `end` sit on UTF-8 char boundaries of that buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must be <= end");
        Self { start, end }
    }

    pub fn empty_at(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn len(self) -> usize {
        self.end - self.start
    }

    pub fn slice(self, buffer: &str) -> &str {
        &buffer[self.start..self.end]
    }

    /// The same span relative to a buffer that starts at `origin`.
    pub(crate) fn rebase(self, origin: usize) -> Self {
        Self::new(self.start - origin, self.end - origin)
    }
}

/// 1-based line and column of an event in the source document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const START: Position = Position { line: 1, col: 1 };
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Incremental offset to line/column translation.
///
/// Lookups must be requested at non-decreasing offsets; an earlier offset
/// restarts the scan from the beginning of the buffer.
#[derive(Debug)]
pub(crate) struct LineCursor {
    offset: usize,
    line: usize,
    col: usize,
}

impl LineCursor {
    pub(crate) fn new() -> Self {
        Self {
            offset: 0,
            line: 1,
            col: 1,
        }
    }

    pub(crate) fn position(&mut self, buffer: &str, offset: usize) -> Position {
        if offset < self.offset {
            *self = Self::new();
        }
        let chunk = &buffer[self.offset..offset];
        match memchr::memrchr(b'\n', chunk.as_bytes()) {
            Some(last_nl) => {
                self.line += memchr::memchr_iter(b'\n', chunk.as_bytes()).count();
                self.col = 1 + chunk[last_nl + 1..].chars().count();
            }
            None => self.col += chunk.chars().count(),
        }
        self.offset = offset;
        Position {
            line: self.line,
            col: self.col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_tracks_lines_and_chars() {
        let text = "ab\ncd\n\u{e9}f";
        let mut cursor = LineCursor::new();
        assert_eq!(cursor.position(text, 0), Position { line: 1, col: 1 });
        assert_eq!(cursor.position(text, 1), Position { line: 1, col: 2 });
        assert_eq!(cursor.position(text, 4), Position { line: 2, col: 2 });
        // 'é' is two bytes but one column.
        assert_eq!(cursor.position(text, 8), Position { line: 3, col: 2 });
        assert_eq!(cursor.position(text, 3), Position { line: 2, col: 1 });
    }

    #[test]
    fn span_slices_and_rebases() {
        let span = Span::new(3, 7);
        assert_eq!(span.slice("<a href>"), "href");
        assert_eq!(span.rebase(3), Span::new(0, 4));
        assert!(Span::empty_at(5).is_empty());
    }
}
