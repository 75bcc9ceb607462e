use njast_core::Position;
use serde::Serialize;

/// What kind of problem a [`SyntaxError`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxErrorKind {
    /// The input did not match the production being parsed.
    Unexpected,
    /// A construct that is not available at the configured language level.
    Level,
    /// A construct the grammar does not implement. Always fatal.
    Unsupported,
    /// A second declaration under an already-registered qualified name.
    Duplicate,
}

/// A positioned syntax error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[error("{message} @{line},{ch}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub line: u32,
    pub ch: u32,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, message: impl Into<String>, at: Position) -> Self {
        Self {
            kind,
            message: message.into(),
            line: at.line,
            ch: at.ch,
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        Position::new(self.line, self.ch)
    }

    #[inline]
    pub fn is_unsupported(&self) -> bool {
        self.kind == SyntaxErrorKind::Unsupported
    }
}

pub(crate) type PResult<T> = Result<T, SyntaxError>;
