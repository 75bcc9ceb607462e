//! Java source parsing for editor queries.
//!
//! [`parse`] turns a source buffer into an [`Ast`]: an arena of positioned
//! nodes plus a registry of every declared type, method and field, keyed by
//! qualified name. The tree answers position queries ([`Ast::locate`]) and
//! lexical scope queries ([`Ast::search_scope`] and friends); type evaluation
//! lives in `njast-resolve`.
//!
//! Parsing is strict by default: the first syntax error is returned. Lenient
//! parsing records errors in [`Ast::errors`] and keeps going, which is what
//! editors want for half-typed buffers. Lambdas, method references and
//! explicit generic invocation at primary position are rejected in both
//! modes.

mod ast;
mod error;
pub mod keywords;
mod language_level;
mod listeners;
pub mod literals;
mod locate;
mod nodes;
pub mod operators;
mod parser;
mod scope;
mod tokenizer;

use std::path::PathBuf;

pub use ast::Ast;
pub use error::{SyntaxError, SyntaxErrorKind};
pub use language_level::{JavaFeature, JavaLevel};
pub use listeners::Listeners;
pub use njast_core::{Position, Span};
pub use nodes::*;

/// How a buffer is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Return the first syntax error instead of recording it.
    pub strict: bool,
    pub level: JavaLevel,
    /// Position of the first byte of the buffer.
    pub line: u32,
    pub ch: u32,
    /// Parse the buffer as a run of members and statements rather than a
    /// compilation unit.
    pub partial: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: true,
            level: JavaLevel::JDK7,
            line: 1,
            ch: 1,
            partial: false,
        }
    }
}

impl ParseOptions {
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    /// Lenient fragment parsing.
    pub fn partial() -> Self {
        Self {
            partial: true,
            ..Self::lenient()
        }
    }

    pub fn with_start(mut self, line: u32, ch: u32) -> Self {
        self.line = line;
        self.ch = ch;
        self
    }

    pub fn with_level(mut self, level: JavaLevel) -> Self {
        self.level = level;
        self
    }
}

/// Parses `text`. `path` is only used for diagnostics and cache keys.
pub fn parse(
    path: impl Into<PathBuf>,
    text: &str,
    options: &ParseOptions,
) -> Result<Ast, SyntaxError> {
    parser::parse(path.into(), text, options, &mut ())
}

/// Like [`parse`], handing each finished node to the subscribed listeners.
pub fn parse_with_listeners(
    path: impl Into<PathBuf>,
    text: &str,
    options: &ParseOptions,
    listeners: &mut Listeners<'_>,
) -> Result<Ast, SyntaxError> {
    parser::parse(path.into(), text, options, listeners)
}
