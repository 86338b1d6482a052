use std::fmt;

use crate::position::Position;

/// A pointer to a location within the document being built, following
/// [RFC 6901](https://www.rfc-editor.org/rfc/rfc6901). Built up one
/// segment at a time from a [`TreeBuilder`](crate::builder::TreeBuilder)
/// frame stack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPointer(String);

impl JsonPointer {
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Append an object field segment, escaping `~` and `/` per RFC 6901.
    pub fn push_field(mut self, key: &str) -> Self {
        self.0.push('/');
        for c in key.chars() {
            match c {
                '~' => self.0.push_str("~0"),
                '/' => self.0.push_str("~1"),
                c => self.0.push(c),
            }
        }
        self
    }

    /// Append an array index segment.
    pub fn push_index(mut self, index: usize) -> Self {
        self.0.push('/');
        self.0.push_str(&index.to_string());
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The broad category of failure, used for `match`-based handling by
/// callers. See spec §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Illegal control character, bad escape, bad `\uXXXX`, unterminated
    /// string, malformed number, unexpected character at a token boundary.
    Lexical,
    /// A token arrived at a state the grammar does not accept in.
    Grammar,
    /// One of the six `BuilderLimits` caps was breached.
    Limit,
    /// Duplicate key, or numeric overflow for a narrower requested type.
    Semantic,
    /// Propagated unchanged from a caller-supplied collector.
    Collector,
}

/// A single fatal parse failure, carrying a human-readable message plus
/// machine-readable `(line, column, offset, pointer?)`.
///
/// Every error raised anywhere in the scanner, lexer, event reader, or
/// tree builder is this one concrete type; there is no per-layer error
/// enum. All errors are fatal for the parser instance that raised them —
/// there is no local retry.
#[derive(Clone, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    position: Position,
    pointer: Option<JsonPointer>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
            pointer: None,
        }
    }

    pub(crate) fn lexical(message: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::Lexical, message, position)
    }

    pub(crate) fn grammar(message: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::Grammar, message, position)
    }

    pub(crate) fn limit(message: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::Limit, message, position)
    }

    pub(crate) fn semantic(message: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::Semantic, message, position)
    }

    pub(crate) fn collector(message: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::Collector, message, position)
    }

    /// Attach (or replace) the JSON Pointer to the value being built when
    /// this error was raised.
    pub fn with_pointer(mut self, pointer: JsonPointer) -> Self {
        self.pointer = Some(pointer);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn pointer(&self) -> Option<&JsonPointer> {
        self.pointer.as_ref()
    }

    pub fn is_limit(&self) -> bool {
        matches!(self.kind, ErrorKind::Limit)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.position)?;
        if let Some(pointer) = &self.pointer {
            write!(f, " ({pointer})")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} error at {}:{} (offset {}): {}",
            self.kind, self.position.line, self.position.column, self.position.offset, self.message
        )?;
        if let Some(pointer) = &self.pointer {
            write!(f, " [{pointer}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}
