use std::fmt;

/// An immutable snapshot of where the character stream is, attached to
/// every error and usable for diagnostics.
///
/// `last_character` is the most recent character returned by the
/// [`CharacterSource`](crate::source::CharacterSource), or `'\0'` before
/// anything has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub last_character: char,
}

impl Position {
    /// The position at the very start of a stream, before any character
    /// has been read.
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 0,
            last_character: '\0',
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {} (offset {})", self.line, self.column, self.offset)
    }
}
