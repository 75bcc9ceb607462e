//! Static word tables used to classify identifiers.

pub const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "final",
    "static",
    "abstract",
    "volatile",
    "transient",
    "native",
    "strictfp",
    "synchronized",
];

pub const CONTROLS: &[&str] = &[
    "if",
    "else",
    "assert",
    "switch",
    "while",
    "do",
    "for",
    "break",
    "continue",
    "return",
    "throw",
    "synchronized",
    "try",
    "catch",
    "finally",
];

pub const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "short", "int", "long", "float", "double", "char",
];

const OTHER_RESERVED: &[&str] = &[
    "class",
    "interface",
    "const",
    "goto",
    "enum",
    "extends",
    "implements",
    "import",
    "instanceof",
    "new",
    "package",
    "super",
    "this",
    "throws",
    "case",
    "default",
    "false",
    "null",
    "true",
    "void",
];

#[inline]
pub fn is_modifier(word: &str) -> bool {
    MODIFIERS.contains(&word)
}

#[inline]
pub fn is_control(word: &str) -> bool {
    CONTROLS.contains(&word)
}

#[inline]
pub fn is_primitive(word: &str) -> bool {
    PRIMITIVES.contains(&word)
}

pub fn is_reserved(word: &str) -> bool {
    is_modifier(word) || is_control(word) || is_primitive(word) || OTHER_RESERVED.contains(&word)
}

/// Reserved words that may begin an expression.
pub fn starts_expression(word: &str) -> bool {
    matches!(
        word,
        "this" | "super" | "new" | "true" | "false" | "null" | "void"
    ) || is_primitive(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(is_modifier("transient"));
        assert!(is_control("finally"));
        assert!(is_primitive("char"));
        assert!(is_reserved("instanceof"));
        assert!(!is_reserved("Instanceof"));
        assert!(starts_expression("this"));
        assert!(!starts_expression("instanceof"));
    }
}
