//! Qualified-name conventions.
//!
//! Declared types are named `package.Outer$Nested`, local classes
//! `package.Outer$1Local`, anonymous classes `package.Outer$1`, and members
//! `package.Outer#member`.

use std::path::PathBuf;

/// Separator between a type and a nested, local or anonymous type.
pub const NESTED_SEPARATOR: char = '$';
/// Separator between a type and one of its methods or fields.
pub const MEMBER_SEPARATOR: char = '#';

/// Qualified name of `name` nested inside `outer`.
pub fn nested(outer: &str, name: &str) -> String {
    format!("{outer}{NESTED_SEPARATOR}{name}")
}

/// Qualified name of the member `name` declared in `owner`.
pub fn member(owner: &str, name: &str) -> String {
    format!("{owner}{MEMBER_SEPARATOR}{name}")
}

/// Qualified name of a top-level type declared in `package`.
pub fn top_level(package: Option<&str>, name: &str) -> String {
    match package {
        Some(package) if !package.is_empty() => format!("{package}.{name}"),
        _ => name.to_owned(),
    }
}

/// Registry keys without a member separator name types.
#[inline]
pub fn is_type_name(qualified: &str) -> bool {
    !qualified.contains(MEMBER_SEPARATOR)
}

/// The package portion of a qualified type name.
///
/// `java.util.Map$Entry` -> `java.util`
pub fn package_of(qualified: &str) -> &str {
    let outer = top_level_type(qualified);
    match outer.rfind('.') {
        Some(idx) => &outer[..idx],
        None => "",
    }
}

/// Strips nested-type and member suffixes.
///
/// `java.util.Map$Entry#getKey` -> `java.util.Map`
pub fn top_level_type(qualified: &str) -> &str {
    let end = qualified
        .find([NESTED_SEPARATOR, MEMBER_SEPARATOR])
        .unwrap_or(qualified.len());
    &qualified[..end]
}

/// The simple (source-level) name of a qualified name.
///
/// The occurrence index of local classes is dropped, so both
/// `pkg.Outer$1Local` and `pkg.Outer$Local` yield `Local`.
pub fn simple_name(qualified: &str) -> &str {
    let start = qualified
        .rfind(['.', NESTED_SEPARATOR, MEMBER_SEPARATOR])
        .map(|idx| idx + 1)
        .unwrap_or(0);
    let last = &qualified[start..];
    last.trim_start_matches(|c: char| c.is_ascii_digit())
}

/// The enclosing type of a nested type or member, if any.
///
/// `pkg.Outer$Inner` -> `pkg.Outer`, `pkg.Outer#field` -> `pkg.Outer`
pub fn enclosing(qualified: &str) -> Option<&str> {
    qualified
        .rfind([NESTED_SEPARATOR, MEMBER_SEPARATOR])
        .map(|idx| &qualified[..idx])
}

/// Relative source path of the file declaring `qualified`.
///
/// `com.bar.Cool$Hot` -> `com/bar/Cool.java`
pub fn source_path(qualified: &str) -> PathBuf {
    let outer = top_level_type(qualified);
    let mut path: PathBuf = outer.split('.').collect();
    path.set_extension("java");
    path
}

/// Alternative readings of a dotted name in which trailing segments name
/// nested types, most specific package first.
///
/// `a.B.C` -> `["a.B.C", "a.B$C", "a$B$C"]`
pub fn nested_candidates(dotted: &str) -> Vec<String> {
    let mut out = vec![dotted.to_owned()];
    let mut current = dotted.to_owned();
    while let Some(idx) = current.rfind('.') {
        current.replace_range(idx..idx + 1, "$");
        out.push(current.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn package_handles_nested_types() {
        assert_eq!(package_of("java.util.HashMap"), "java.util");
        assert_eq!(package_of("java.util.Map$Entry"), "java.util");
        assert_eq!(package_of("Default"), "");
    }

    #[test]
    fn source_path_drops_nested_suffix() {
        assert_eq!(
            source_path("com.bar.Cool$Hot"),
            PathBuf::from("com").join("bar").join("Cool.java")
        );
        assert_eq!(source_path("Lonely"), PathBuf::from("Lonely.java"));
    }

    #[test]
    fn simple_names() {
        assert_eq!(simple_name("net.dhleong.njast.Foo$Fancy$Fancier"), "Fancier");
        assert_eq!(simple_name("net.dhleong.njast.FullAst$2LocalClass"), "LocalClass");
        assert_eq!(simple_name("net.dhleong.njast.Foo#baz"), "baz");
        assert_eq!(simple_name("Foo"), "Foo");
    }

    #[test]
    fn enclosing_and_members() {
        assert_eq!(member("a.B", "c"), "a.B#c");
        assert_eq!(nested("a.B", "C"), "a.B$C");
        assert_eq!(enclosing("a.B$C"), Some("a.B"));
        assert_eq!(enclosing("a.B#c"), Some("a.B"));
        assert_eq!(enclosing("a.B"), None);
        assert!(is_type_name("a.B$C"));
        assert!(!is_type_name("a.B#c"));
        assert_eq!(top_level(None, "Foo"), "Foo");
        assert_eq!(top_level(Some("a.b"), "Foo"), "a.b.Foo");
    }

    #[test]
    fn nested_candidate_order() {
        assert_eq!(
            nested_candidates("a.B.C"),
            vec!["a.B.C".to_owned(), "a.B$C".to_owned(), "a$B$C".to_owned()]
        );
    }
}
