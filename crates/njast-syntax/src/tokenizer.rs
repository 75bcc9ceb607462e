//! Character-level reader used by the recursive-descent parser.
//!
//! There is no separate token stream: the parser asks the tokenizer whether
//! the next lexeme is of a given shape, and the tokenizer either consumes it
//! or leaves the cursor untouched. Blank space, line comments and block
//! comments are skipped before every read. The most recently skipped block
//! comment is retained so declarations can pick it up as javadoc.

use njast_core::Position;

use crate::error::{PResult, SyntaxError, SyntaxErrorKind};
use crate::language_level::{JavaFeature, JavaLevel};
use crate::literals::{self, LiteralKind};
use crate::operators::{AssignOp, InfixOp, PostfixOp, PrefixOp};
use crate::ParseOptions;

/// Saved tokenizer state for backtracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    offset: usize,
    line: u32,
    ch: u32,
    last_end: Position,
    javadoc: Option<(usize, usize)>,
    errors: usize,
}

pub struct Tokenizer<'a> {
    text: &'a str,
    offset: usize,
    line: u32,
    ch: u32,
    /// End of the most recently consumed lexeme.
    last_end: Position,
    javadoc: Option<(usize, usize)>,
    strict: bool,
    /// Non-zero while the parser is looking ahead; recoverable errors fail
    /// instead of being recorded.
    speculating: u32,
    level: JavaLevel,
    errors: Vec<SyntaxError>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str, options: &ParseOptions) -> Self {
        let start = Position::new(options.line, options.ch);
        let offset = if text.starts_with('\u{feff}') { 3 } else { 0 };
        Self {
            text,
            offset,
            line: start.line,
            ch: start.ch,
            last_end: start,
            javadoc: None,
            strict: options.strict,
            speculating: 0,
            level: options.level,
            errors: Vec::new(),
        }
    }

    pub fn save(&self) -> Checkpoint {
        Checkpoint {
            offset: self.offset,
            line: self.line,
            ch: self.ch,
            last_end: self.last_end,
            javadoc: self.javadoc,
            errors: self.errors.len(),
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.offset = checkpoint.offset;
        self.line = checkpoint.line;
        self.ch = checkpoint.ch;
        self.last_end = checkpoint.last_end;
        self.javadoc = checkpoint.javadoc;
        self.errors.truncate(checkpoint.errors);
    }

    pub(crate) fn begin_speculation(&mut self) {
        self.speculating += 1;
    }

    pub(crate) fn end_speculation(&mut self) {
        self.speculating = self.speculating.saturating_sub(1);
    }

    /// Current cursor position, without skipping blank space.
    #[inline]
    pub fn position(&self) -> Position {
        Position::new(self.line, self.ch)
    }

    /// Skips blank space and returns the start of the next lexeme.
    pub fn prepare(&mut self) -> Position {
        self.skip_blank();
        self.position()
    }

    /// End of the last consumed lexeme. Trailing blank space is excluded.
    #[inline]
    pub fn last_end(&self) -> Position {
        self.last_end
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn rest(&self) -> &'a str {
        &self.text[self.offset..]
    }

    /// Consumes `len` bytes that contain no line terminators.
    fn advance(&mut self, len: usize) {
        self.offset += len;
        self.ch += len as u32;
        self.last_end = self.position();
    }

    fn skip_blank(&mut self) {
        loop {
            let bytes = self.rest().as_bytes();
            match bytes.first() {
                Some(b' ' | b'\t' | b'\x0c') => {
                    self.offset += 1;
                    self.ch += 1;
                }
                Some(b'\n') => self.newline(1),
                Some(b'\r') => self.newline(if bytes.get(1) == Some(&b'\n') { 2 } else { 1 }),
                Some(b'/') if bytes.get(1) == Some(&b'/') => {
                    let len = bytes
                        .iter()
                        .position(|&b| b == b'\n' || b == b'\r')
                        .unwrap_or(bytes.len());
                    self.offset += len;
                    self.ch += len as u32;
                }
                Some(b'/') if bytes.get(1) == Some(&b'*') => self.skip_block_comment(),
                _ => break,
            }
        }
    }

    fn newline(&mut self, len: usize) {
        self.offset += len;
        self.line += 1;
        self.ch = 1;
    }

    fn skip_block_comment(&mut self) {
        let start = self.offset;
        let body = &self.rest()[2..];
        let len = body.find("*/").map(|idx| idx + 4).unwrap_or(body.len() + 2);
        let comment = &self.text[start..start + len];
        for (idx, b) in comment.bytes().enumerate() {
            match b {
                b'\n' => {
                    self.line += 1;
                    self.ch = 1;
                }
                b'\r' if comment.as_bytes().get(idx + 1) != Some(&b'\n') => {
                    self.line += 1;
                    self.ch = 1;
                }
                b'\r' => {}
                _ => self.ch += 1,
            }
        }
        self.offset = start + len;
        self.javadoc = Some((start, start + len));
    }

    /// Returns and forgets the last block comment skipped since the previous
    /// take or clear.
    pub fn take_javadoc(&mut self) -> Option<String> {
        self.javadoc
            .take()
            .map(|(start, end)| self.text[start..end].to_owned())
    }

    pub fn clear_javadoc(&mut self) {
        self.javadoc = None;
    }

    pub fn peek_char(&mut self) -> Option<char> {
        self.skip_blank();
        self.rest().chars().next()
    }

    pub fn is_eof(&mut self) -> bool {
        self.peek_char().is_none()
    }

    pub fn peek_char_is(&mut self, expected: char) -> bool {
        self.peek_char() == Some(expected)
    }

    pub fn read_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) && expected != '\n' {
            self.advance(expected.len_utf8());
            true
        } else {
            false
        }
    }

    pub fn peek_str(&mut self, expected: &str) -> bool {
        self.skip_blank();
        self.rest().starts_with(expected)
    }

    /// Consumes `expected` if it is next. It must not contain line breaks.
    pub fn read_str(&mut self, expected: &str) -> bool {
        if self.peek_str(expected) {
            self.advance(expected.len());
            true
        } else {
            false
        }
    }

    /// Consumes and discards one character. Used to guarantee progress while
    /// recovering from errors.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        match c {
            '\n' => self.newline(1),
            '\r' => self.newline(if self.rest().starts_with("\r\n") { 2 } else { 1 }),
            _ => self.advance(c.len_utf8()),
        }
        Some(c)
    }

    fn identifier_len(&self) -> usize {
        let mut chars = self.rest().char_indices();
        match chars.next() {
            Some((_, c)) if is_identifier_start(c) => {}
            _ => return 0,
        }
        chars
            .find(|&(_, c)| !is_identifier_part(c))
            .map(|(idx, _)| idx)
            .unwrap_or(self.rest().len())
    }

    /// Reads a Java identifier. Reserved words are returned like any other
    /// identifier; callers decide whether they are acceptable.
    pub fn read_identifier(&mut self) -> Option<&'a str> {
        self.skip_blank();
        let len = self.identifier_len();
        if len == 0 {
            return None;
        }
        let word = &self.rest()[..len];
        self.advance(len);
        Some(word)
    }

    pub fn peek_identifier(&mut self) -> Option<&'a str> {
        self.skip_blank();
        let len = self.identifier_len();
        (len > 0).then(|| &self.rest()[..len])
    }

    pub fn peek_keyword(&mut self, word: &str) -> bool {
        self.peek_identifier() == Some(word)
    }

    pub fn read_keyword(&mut self, word: &str) -> bool {
        if self.peek_keyword(word) {
            self.advance(word.len());
            true
        } else {
            false
        }
    }

    /// Reads `ident(.ident)*`. A dot is only consumed when an identifier
    /// follows it.
    pub fn read_qualified(&mut self) -> Option<String> {
        let mut name = self.read_identifier()?.to_owned();
        loop {
            let checkpoint = self.save();
            if !self.read_char('.') {
                break;
            }
            match self.read_identifier() {
                Some(part) => {
                    name.push('.');
                    name.push_str(part);
                }
                None => {
                    self.restore(checkpoint);
                    break;
                }
            }
        }
        Some(name)
    }

    /// Reads a numeric literal, returning its kind and source text.
    pub fn read_number(&mut self) -> PResult<Option<(LiteralKind, &'a str)>> {
        self.skip_blank();
        let Some(scan) = literals::scan_number(self.rest()) else {
            return Ok(None);
        };
        if scan.binary {
            self.check_feature(JavaFeature::BinaryLiterals)?;
        }
        if scan.underscores {
            self.check_feature(JavaFeature::UnderscoresInLiterals)?;
        }
        let text = &self.rest()[..scan.len];
        self.advance(scan.len);
        Ok(Some((scan.kind, text)))
    }

    /// Reads a string literal, returning the text between the quotes.
    pub fn read_string_literal(&mut self) -> PResult<Option<&'a str>> {
        self.read_quoted('"')
    }

    /// Reads a char literal, returning the text between the quotes.
    pub fn read_char_literal(&mut self) -> PResult<Option<&'a str>> {
        let at = self.prepare();
        let Some(content) = self.read_quoted('\'')? else {
            return Ok(None);
        };
        if let Err(err) = literals::unescape_char(content) {
            self.record(SyntaxError::new(
                SyntaxErrorKind::Unexpected,
                err.message,
                at,
            ))?;
        }
        Ok(Some(content))
    }

    fn read_quoted(&mut self, quote: char) -> PResult<Option<&'a str>> {
        if !self.peek_char_is(quote) {
            return Ok(None);
        }
        let bytes = self.rest().as_bytes();
        let mut idx = 1;
        let mut terminated = false;
        while let Some(&b) = bytes.get(idx) {
            match b {
                b'\\' if bytes.get(idx + 1).is_some_and(|&n| n != b'\n' && n != b'\r') => {
                    idx += 2
                }
                b'\n' | b'\r' => break,
                _ if b == quote as u8 => {
                    terminated = true;
                    break;
                }
                _ => idx += 1,
            }
        }
        let content = &self.rest()[1..idx];
        if !terminated {
            let at = self.position();
            self.advance(idx);
            self.record(SyntaxError::new(
                SyntaxErrorKind::Unexpected,
                format!("unterminated {} literal", if quote == '"' { "string" } else { "char" }),
                at,
            ))?;
            return Ok(Some(content));
        }
        self.advance(idx + 1);
        Ok(Some(content))
    }

    /// Reads an assignment operator. `==` is never an assignment.
    pub fn read_assignment(&mut self) -> Option<AssignOp> {
        self.skip_blank();
        let rest = self.rest();
        if rest.starts_with("==") {
            return None;
        }
        let op = AssignOp::ALL
            .iter()
            .copied()
            .filter(|op| rest.starts_with(op.as_str()))
            .max_by_key(|op| op.as_str().len())?;
        self.advance(op.as_str().len());
        Some(op)
    }

    /// Reads a binary operator, refusing anything that is actually the start
    /// of an assignment (`+=`, `>>=`, ...).
    pub fn read_infix_op(&mut self) -> Option<InfixOp> {
        let op = self.peek_infix_op()?;
        self.advance(op.as_str().len());
        Some(op)
    }

    pub fn peek_infix_op(&mut self) -> Option<InfixOp> {
        self.skip_blank();
        let rest = self.rest();
        if rest.starts_with("==") {
            return Some(InfixOp::Eq);
        }
        if rest.starts_with("!=") {
            return Some(InfixOp::Ne);
        }
        let op = InfixOp::ALL
            .iter()
            .copied()
            .filter(|op| rest.starts_with(op.as_str()))
            .max_by_key(|op| op.as_str().len())?;
        let after = &rest[op.as_str().len()..];
        let relational = matches!(op, InfixOp::Le | InfixOp::Ge);
        if after.starts_with('=') && !relational {
            return None;
        }
        Some(op)
    }

    pub fn read_prefix_op(&mut self) -> Option<PrefixOp> {
        self.skip_blank();
        let rest = self.rest();
        let op = if rest.starts_with("++") {
            PrefixOp::Increment
        } else if rest.starts_with("--") {
            PrefixOp::Decrement
        } else {
            let op = PrefixOp::from_text(rest.get(..1)?)?;
            if rest[1..].starts_with('=') {
                return None;
            }
            op
        };
        self.advance(op.as_str().len());
        Some(op)
    }

    pub fn read_postfix_op(&mut self) -> Option<PostfixOp> {
        self.skip_blank();
        let op = PostfixOp::from_text(self.rest().get(..2)?)?;
        self.advance(2);
        Some(op)
    }

    /// Skips a balanced `open`..`close` group starting at the cursor,
    /// stepping over string and char literals. Returns `false` at EOF.
    pub fn skip_balanced(&mut self, open: char, close: char) -> bool {
        if !self.read_char(open) {
            return false;
        }
        let mut depth = 1usize;
        while depth > 0 {
            let Some(c) = self.peek_char() else {
                return false;
            };
            match c {
                '"' | '\'' => {
                    if self.read_quoted(c).is_err() {
                        return false;
                    }
                    continue;
                }
                _ if c == open => depth += 1,
                _ if c == close => depth -= 1,
                _ => {}
            }
            self.bump();
        }
        true
    }

    pub fn error(&self, kind: SyntaxErrorKind, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(kind, message, self.position())
    }

    /// Fails in strict mode or while speculating; otherwise keeps the error
    /// and lets parsing continue.
    pub fn record(&mut self, error: SyntaxError) -> PResult<()> {
        if self.strict || self.speculating > 0 || error.is_unsupported() {
            return Err(error);
        }
        tracing::trace!(target: "njast.parse", error = %error, "recovered from syntax error");
        self.errors.push(error);
        Ok(())
    }

    /// Reports that `expecting` was not found at the cursor.
    ///
    /// When recovering, one character is skipped unless it could begin a
    /// construct the caller is likely to resynchronise on.
    pub fn raise(&mut self, expecting: &str) -> PResult<()> {
        self.skip_blank();
        let found = match self.rest().chars().next() {
            Some(c) => format!("`{c}`"),
            None => "end of input".to_owned(),
        };
        let error = self.error(
            SyntaxErrorKind::Unexpected,
            format!("unexpected {found}; expecting {expecting}"),
        );
        self.record(error)?;
        match self.rest().chars().next() {
            Some(c) if !is_resync_char(c) => {
                self.bump();
            }
            _ => {}
        }
        Ok(())
    }

    pub fn expect_char(&mut self, expected: char) -> PResult<bool> {
        if self.read_char(expected) {
            return Ok(true);
        }
        self.raise(&format!("`{expected}`"))?;
        Ok(false)
    }

    pub fn expect_keyword(&mut self, word: &str) -> PResult<bool> {
        if self.read_keyword(word) {
            return Ok(true);
        }
        self.raise(&format!("`{word}`"))?;
        Ok(false)
    }

    /// Checks that `feature` is available at the configured level.
    pub fn check_feature(&mut self, feature: JavaFeature) -> PResult<bool> {
        if self.level.is_enabled(feature) {
            return Ok(true);
        }
        let error = self.error(
            SyntaxErrorKind::Level,
            format!(
                "{} requires {} (parsing as {})",
                feature.display_name(),
                feature.since(),
                self.level
            ),
        );
        self.record(error)?;
        Ok(false)
    }

    /// Builds the error for a construct the grammar does not handle.
    pub fn unsupported(&self, construct: &str) -> SyntaxError {
        self.error(
            SyntaxErrorKind::Unsupported,
            format!("{construct} is not supported"),
        )
    }

    pub fn into_errors(self) -> Vec<SyntaxError> {
        self.errors
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_ascii_alphabetic() || (!c.is_ascii() && unicode_ident::is_xid_start(c))
}

fn is_identifier_part(c: char) -> bool {
    c == '$' || c == '_' || c.is_ascii_alphanumeric() || (!c.is_ascii() && unicode_ident::is_xid_continue(c))
}

fn is_resync_char(c: char) -> bool {
    matches!(c, '}' | ')' | ';' | '{') || is_identifier_start(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lenient(text: &str) -> Tokenizer<'_> {
        Tokenizer::new(text, &ParseOptions::lenient())
    }

    #[test]
    fn infix_ops() {
        for (text, op) in [
            ("+", InfixOp::Add),
            ("||", InfixOp::OrOr),
            ("|", InfixOp::Or),
            ("==", InfixOp::Eq),
            ("!=", InfixOp::Ne),
            (">=", InfixOp::Ge),
            (">>", InfixOp::Shr),
            (">>>", InfixOp::UShr),
            ("<= 4", InfixOp::Le),
        ] {
            assert_eq!(lenient(text).read_infix_op(), Some(op), "{text}");
        }
        for text in ["+=", ">>=", ">>>=", "|=", "="] {
            assert_eq!(lenient(text).read_infix_op(), None, "{text}");
        }
    }

    #[test]
    fn prefix_and_postfix_ops() {
        assert_eq!(lenient("+").read_prefix_op(), Some(PrefixOp::Plus));
        assert_eq!(lenient("~").read_prefix_op(), Some(PrefixOp::BitNot));
        assert_eq!(lenient("++").read_prefix_op(), Some(PrefixOp::Increment));
        assert_eq!(lenient("--").read_prefix_op(), Some(PrefixOp::Decrement));
        assert_eq!(lenient("+=").read_prefix_op(), None);

        assert_eq!(lenient("++").read_postfix_op(), Some(PostfixOp::Increment));
        assert_eq!(lenient("--").read_postfix_op(), Some(PostfixOp::Decrement));
        assert_eq!(lenient("+").read_postfix_op(), None);
        assert_eq!(lenient("!").read_postfix_op(), None);
    }

    #[test]
    fn assignment_ops() {
        assert_eq!(lenient(">>>=").read_assignment(), Some(AssignOp::UShrAssign));
        assert_eq!(lenient("<<=").read_assignment(), Some(AssignOp::ShlAssign));
        assert_eq!(lenient(" = 4").read_assignment(), Some(AssignOp::Assign));
        assert_eq!(lenient("+").read_assignment(), None);
        assert_eq!(lenient("+ a").read_assignment(), None);
        assert_eq!(lenient("== a").read_assignment(), None);
    }

    #[test]
    fn skips_comments_and_tracks_positions() {
        let mut tok = lenient("  // line\n  /* block\n */ foo");
        assert_eq!(tok.prepare(), Position::new(3, 5));
        assert_eq!(tok.read_identifier(), Some("foo"));
        assert_eq!(tok.last_end(), Position::new(3, 8));
        assert_eq!(tok.take_javadoc().as_deref(), Some("/* block\n */"));
        assert_eq!(tok.take_javadoc(), None);
    }

    #[test]
    fn qualified_stops_before_star() {
        let mut tok = lenient("java.util.*;");
        assert_eq!(tok.read_qualified().as_deref(), Some("java.util"));
        assert!(tok.read_char('.'));
        assert!(tok.read_char('*'));
    }

    #[test]
    fn keywords_need_word_boundary() {
        let mut tok = lenient("classy class");
        assert!(!tok.read_keyword("class"));
        assert_eq!(tok.read_identifier(), Some("classy"));
        assert!(tok.read_keyword("class"));
    }

    #[test]
    fn numbers_respect_level() {
        let mut tok = lenient("0b101 1_000");
        assert_eq!(tok.read_number().unwrap(), Some((LiteralKind::Int, "0b101")));
        assert_eq!(tok.read_number().unwrap(), Some((LiteralKind::Int, "1_000")));
        assert!(tok.errors.is_empty());

        let jdk6 = ParseOptions {
            level: JavaLevel::JDK6,
            ..ParseOptions::default()
        };
        let mut tok = Tokenizer::new("0b101", &jdk6);
        let err = tok.read_number().unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Level);
    }

    #[test]
    fn string_and_char_literals() {
        let mut tok = lenient(r#""a\"b" 'c' '\n'"#);
        assert_eq!(tok.read_string_literal().unwrap(), Some(r#"a\"b"#));
        assert_eq!(tok.read_char_literal().unwrap(), Some("c"));
        assert_eq!(tok.read_char_literal().unwrap(), Some(r"\n"));
        assert!(tok.errors.is_empty());
    }

    #[test]
    fn lenient_raise_records_and_skips() {
        let mut tok = lenient("+ foo");
        assert!(!tok.expect_char(';').unwrap());
        assert_eq!(tok.errors.len(), 1);
        assert_eq!(tok.read_identifier(), Some("foo"));

        let mut tok = lenient("}");
        assert!(!tok.expect_char(';').unwrap());
        assert!(tok.read_char('}'));
    }

    #[test]
    fn strict_raise_fails() {
        let mut tok = Tokenizer::new("+", &ParseOptions::default());
        let err = tok.expect_char(';').unwrap_err();
        assert_eq!(err.position(), Position::new(1, 1));
        assert_eq!(err.to_string(), "unexpected `+`; expecting `;` @1,1");
    }

    #[test]
    fn restore_rewinds_errors() {
        let mut tok = lenient("+ foo");
        let checkpoint = tok.save();
        tok.raise("foo").unwrap();
        tok.restore(checkpoint);
        assert!(tok.errors.is_empty());
        assert!(tok.read_char('+'));
    }

    #[test]
    fn balanced_groups_skip_literals() {
        let mut tok = lenient(r#"(a, ")", (b)) -> c"#);
        assert!(tok.skip_balanced('(', ')'));
        assert!(tok.read_str("->"));
    }
}
