//! Literal recognition.
//!
//! [`scan_number`] is used by the tokenizer to find the extent and type of a
//! numeric literal. Literal text is retained as written; only char literal
//! escapes are checked while reading.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The static type of a literal expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Boolean,
    Null,
}

impl LiteralKind {
    /// The Java type name a literal of this kind evaluates to.
    pub fn java_type(self) -> &'static str {
        match self {
            LiteralKind::Int => "int",
            LiteralKind::Long => "long",
            LiteralKind::Float => "float",
            LiteralKind::Double => "double",
            LiteralKind::Char => "char",
            LiteralKind::String => "java.lang.String",
            LiteralKind::Boolean => "boolean",
            LiteralKind::Null => "null",
        }
    }
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.java_type())
    }
}

/// Extent and classification of a numeric literal at the start of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberScan {
    pub len: usize,
    pub kind: LiteralKind,
    pub binary: bool,
    pub underscores: bool,
}

fn eat_digits(bytes: &[u8], mut idx: usize, radix: u32, underscores: &mut bool) -> usize {
    while let Some(&b) = bytes.get(idx) {
        if b == b'_' {
            *underscores = true;
        } else if !(b as char).is_digit(radix) {
            break;
        }
        idx += 1;
    }
    idx
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

/// Scans a numeric literal at the start of `text`.
///
/// Returns `None` if `text` does not start with a digit, or with a `.`
/// followed by a digit.
pub fn scan_number(text: &str) -> Option<NumberScan> {
    let bytes = text.as_bytes();
    let first = *bytes.first()?;
    let leading_dot = first == b'.' && bytes.get(1).is_some_and(u8::is_ascii_digit);
    if !first.is_ascii_digit() && !leading_dot {
        return None;
    }

    let mut underscores = false;
    let mut binary = false;
    let mut floating = false;
    let mut idx;

    let prefix = bytes.get(1).map(u8::to_ascii_lowercase);
    if first == b'0' && prefix == Some(b'x') {
        idx = eat_digits(bytes, 2, 16, &mut underscores);
        if bytes.get(idx) == Some(&b'.') {
            floating = true;
            idx = eat_digits(bytes, idx + 1, 16, &mut underscores);
        }
        if matches!(bytes.get(idx), Some(b'p' | b'P')) {
            floating = true;
            idx += 1;
            if matches!(bytes.get(idx), Some(b'+' | b'-')) {
                idx += 1;
            }
            idx = eat_digits(bytes, idx, 10, &mut underscores);
        }
    } else if first == b'0' && prefix == Some(b'b') {
        binary = true;
        idx = eat_digits(bytes, 2, 2, &mut underscores);
    } else {
        idx = if leading_dot {
            0
        } else {
            eat_digits(bytes, 0, 10, &mut underscores)
        };
        if bytes.get(idx) == Some(&b'.') {
            let after = bytes.get(idx + 1).copied();
            let fraction = match after {
                Some(b) if b.is_ascii_digit() => true,
                Some(b'e' | b'E' | b'f' | b'F' | b'd' | b'D') => true,
                Some(b) => !is_ident_start(b) && b != b'.',
                None => true,
            };
            if fraction {
                floating = true;
                idx = eat_digits(bytes, idx + 1, 10, &mut underscores);
            }
        }
        if matches!(bytes.get(idx), Some(b'e' | b'E')) {
            let mut exp = idx + 1;
            if matches!(bytes.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
                floating = true;
                idx = eat_digits(bytes, exp, 10, &mut underscores);
            }
        }
    }

    let kind = match bytes.get(idx) {
        Some(b'l' | b'L') if !floating => {
            idx += 1;
            LiteralKind::Long
        }
        Some(b'f' | b'F') if !binary => {
            idx += 1;
            LiteralKind::Float
        }
        Some(b'd' | b'D') if !binary => {
            idx += 1;
            LiteralKind::Double
        }
        _ if floating => LiteralKind::Double,
        _ => LiteralKind::Int,
    };

    Some(NumberScan {
        len: idx,
        kind,
        binary,
        underscores,
    })
}

/// A malformed escape or character in string or char literal content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EscapeError {
    pub message: String,
}

fn escape_error(message: impl Into<String>) -> EscapeError {
    EscapeError {
        message: message.into(),
    }
}

/// Checks the content of a char literal: exactly one character after
/// escapes are applied.
pub fn unescape_char(text: &str) -> Result<char, EscapeError> {
    let out = unescape(text)?;
    let mut chars = out.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        (None, _) => Err(escape_error("empty char literal")),
        (Some(_), Some(_)) => Err(escape_error("char literal holds more than one character")),
    }
}

/// Applies Java escapes to the content of a string or char literal.
pub fn unescape(text: &str) -> Result<String, EscapeError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {}
            '\n' | '\r' => return Err(escape_error("line break inside a literal")),
            _ => {
                out.push(ch);
                continue;
            }
        }

        let escaped = match chars.next() {
            None => return Err(escape_error("unterminated escape sequence")),
            Some('b') => '\u{0008}',
            Some('t') => '\t',
            Some('n') => '\n',
            Some('f') => '\u{000C}',
            Some('r') => '\r',
            Some(quote @ ('"' | '\'' | '\\')) => quote,
            Some('u') => {
                while chars.next_if_eq(&'u').is_some() {}
                let digits: String = chars.by_ref().take(4).collect();
                if digits.len() != 4 {
                    return Err(escape_error("incomplete unicode escape"));
                }
                u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| escape_error(format!("invalid unicode escape `\\u{digits}`")))?
            }
            Some(first @ '0'..='7') => {
                // At most three digits, and only up to \377.
                let max_len = if first <= '3' { 3 } else { 2 };
                let mut value = first.to_digit(8).unwrap_or(0);
                for _ in 1..max_len {
                    match chars.next_if(|next| matches!(next, '0'..='7')) {
                        Some(digit) => value = value * 8 + digit.to_digit(8).unwrap_or(0),
                        None => break,
                    }
                }
                char::from_u32(value).unwrap_or('\u{FFFD}')
            }
            Some(other) => return Err(escape_error(format!("invalid escape `\\{other}`"))),
        };
        out.push(escaped);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kind_of(text: &str) -> (usize, LiteralKind) {
        let scan = scan_number(text).expect("number");
        (scan.len, scan.kind)
    }

    #[test]
    fn numeric_literal_types() {
        assert_eq!(kind_of("5"), (1, LiteralKind::Int));
        assert_eq!(kind_of("5L"), (2, LiteralKind::Long));
        assert_eq!(kind_of("5.0"), (3, LiteralKind::Double));
        assert_eq!(kind_of("5.0f"), (4, LiteralKind::Float));
        assert_eq!(kind_of("0x1A"), (4, LiteralKind::Int));
        assert_eq!(kind_of("0x1AL;"), (5, LiteralKind::Long));
        assert_eq!(kind_of(".8f;"), (3, LiteralKind::Float));
        assert_eq!(kind_of("1e10"), (4, LiteralKind::Double));
        assert_eq!(kind_of("1_000_000)"), (9, LiteralKind::Int));
        assert_eq!(kind_of("3d"), (2, LiteralKind::Double));
    }

    #[test]
    fn binary_and_underscore_flags() {
        let scan = scan_number("0b1010_1010").expect("number");
        assert!(scan.binary);
        assert!(scan.underscores);
        assert_eq!(scan.kind, LiteralKind::Int);
        assert_eq!(scan.len, 11);
    }

    #[test]
    fn trailing_dot_forms() {
        assert_eq!(kind_of("1.f"), (3, LiteralKind::Float));
        assert_eq!(kind_of("1.)"), (2, LiteralKind::Double));
        assert_eq!(kind_of("1.length"), (1, LiteralKind::Int));
        assert!(scan_number("foo").is_none());
        assert!(scan_number(".x").is_none());
    }

    #[test]
    fn char_literals() {
        assert_eq!(unescape_char("a"), Ok('a'));
        assert_eq!(unescape_char("\\n"), Ok('\n'));
        assert_eq!(unescape_char("\\u0041"), Ok('A'));
        assert_eq!(unescape_char("\\0"), Ok('\0'));
        assert!(unescape_char("ab").is_err());
        assert!(unescape_char("").is_err());
    }

    #[test]
    fn string_escapes() {
        assert_eq!(unescape("a\\tb\\\"c\\\\").as_deref(), Ok("a\tb\"c\\"));
        assert_eq!(unescape("\\101\\7\\uuu0042").as_deref(), Ok("A\u{7}B"));
        assert!(unescape("\\q").is_err());
        assert!(unescape("\\u00").is_err());
        assert!(unescape("line\nbreak").is_err());
    }
}
