use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;

use njast_syntax::literals::LiteralKind;
use njast_syntax::{
    parse, Ast, JavaLevel, NodeKind, ParseOptions, SyntaxErrorKind, TypeDeclKind,
};

fn fixture(name: &str) -> (PathBuf, String) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let text = fs::read_to_string(&path).unwrap();
    (path, text)
}

fn parse_fixture(name: &str, options: &ParseOptions) -> Ast {
    let (path, text) = fixture(name);
    parse(path, &text, options).unwrap()
}

#[test]
fn full_ast_parses_strictly() {
    let ast = parse_fixture("FullAst.java", &ParseOptions::default());
    assert!(ast.errors().is_empty());
    assert_eq!(ast.package(), Some("net.dhleong.njast"));

    let imports: Vec<(&str, bool, bool)> = ast
        .imports()
        .map(|import| (import.path.as_str(), import.is_static, import.is_star))
        .collect();
    assert_eq!(
        imports,
        vec![
            ("java.io.IOException", false, false),
            ("net.dhleong.njast.subpackage.Imported", false, false),
            ("net.dhleong.njast.subpackage.FullBase", false, false),
            ("net.dhleong.njast.subpackage2", false, true),
            (
                "net.dhleong.njast.subpackage.Extended.createExtended",
                true,
                false
            ),
        ]
    );

    let kinds: Vec<TypeDeclKind> = ast
        .toplevel()
        .iter()
        .map(|&id| ast.type_decl(id).unwrap().kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TypeDeclKind::Class,
            TypeDeclKind::Interface,
            TypeDeclKind::Enum,
            TypeDeclKind::Annotation,
        ]
    );
}

#[test]
fn full_ast_registers_qualified_names() {
    let ast = parse_fixture("FullAst.java", &ParseOptions::default());
    let names: Vec<&str> = ast.type_names().collect();
    assert_eq!(
        names,
        vec![
            "net.dhleong.njast.FullAst",
            "net.dhleong.njast.FullAst$1",
            "net.dhleong.njast.FullAst$1LocalClass",
            "net.dhleong.njast.FullAst$2LocalClass",
            "net.dhleong.njast.FullAst$NestedClass",
            "net.dhleong.njast.FullAst$StaticNestedClass",
            "net.dhleong.njast.FullAst$NestedEnum",
            "net.dhleong.njast.SomeInterface",
            "net.dhleong.njast.SomeEnum",
            "net.dhleong.njast.SomeEnum$1",
            "net.dhleong.njast.SomeAnnotation",
        ]
    );

    let method = ast.qualified("net.dhleong.njast.FullAst#fluidMethod").unwrap();
    assert_eq!(ast.kind(method).name(), "Method");
    let field = ast.qualified("net.dhleong.njast.FullAst#field1").unwrap();
    assert_eq!(ast.kind(field).name(), "VarDef");
    let constant = ast.qualified("net.dhleong.njast.SomeEnum#VAL2").unwrap();
    assert_eq!(ast.kind(constant).name(), "EnumConstant");
    assert!(ast.qualified("net.dhleong.njast.FullAst#FullAst").is_none());
    assert!(ast.qualified("net.dhleong.njast.SomeEnum#SomeEnum").is_none());
}

#[test]
fn full_ast_body_indices_and_javadoc() {
    let ast = parse_fixture("FullAst.java", &ParseOptions::default());
    let full = ast.qualified("net.dhleong.njast.FullAst").unwrap();
    let decl = ast.type_decl(full).unwrap();
    assert_eq!(
        decl.javadoc.as_deref(),
        Some("/**\n * Javadoc for FullAst class\n */")
    );
    assert_eq!(decl.extends.len(), 1);
    assert_eq!(decl.implements.len(), 1);

    let body = ast.class_body(decl.body).unwrap();
    assert_eq!(body.fields.len(), 4);
    assert_eq!(body.blocks.len(), 2);
    assert_eq!(body.methods.len(), 20);
    assert_eq!(body.types.len(), 3);

    let field1 = ast.qualified("net.dhleong.njast.FullAst#field1").unwrap();
    assert_eq!(ast.javadoc(field1), Some("/** A static field */"));
    let simple = ast.qualified("net.dhleong.njast.FullAst#simpleMethod").unwrap();
    assert_eq!(ast.javadoc(simple), Some("/** Does nothing */"));
}

#[test]
fn literal_types() {
    let source = "class L { Object a = 5, b = 5L, c = 5.0, d = 5.0f, e = 0x1A, f = .8f, \
                  g = 'c', h = \"s\", i = true, j = null; }";
    let ast = parse("L.java", source, &ParseOptions::default()).unwrap();
    let literals: Vec<(LiteralKind, &str)> = ast
        .ids()
        .filter_map(|id| match ast.kind(id) {
            NodeKind::Literal { kind, value } => Some((*kind, value.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(
        literals,
        vec![
            (LiteralKind::Int, "5"),
            (LiteralKind::Long, "5L"),
            (LiteralKind::Double, "5.0"),
            (LiteralKind::Float, "5.0f"),
            (LiteralKind::Int, "0x1A"),
            (LiteralKind::Float, ".8f"),
            (LiteralKind::Char, "c"),
            (LiteralKind::String, "s"),
            (LiteralKind::Boolean, "true"),
            (LiteralKind::Null, "null"),
        ]
    );
}

#[test]
fn incomplete_source_parses_leniently() {
    let (path, text) = fixture("Foo.java");
    let err = parse(path.clone(), &text, &ParseOptions::default()).unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::Unexpected);

    let ast = parse(path, &text, &ParseOptions::lenient()).unwrap();
    assert!(!ast.errors().is_empty());
    let names: Vec<&str> = ast.type_names().collect();
    assert_eq!(
        names,
        vec![
            "net.dhleong.njast.Foo",
            "net.dhleong.njast.Foo$Fancy",
            "net.dhleong.njast.Foo$Fancy$Fancier",
        ]
    );

    // The first overload keeps the registry entry.
    let baz = ast.qualified("net.dhleong.njast.Foo#baz").unwrap();
    assert_eq!(ast.span(baz).start.line, 13);
    let method = ast
        .qualified("net.dhleong.njast.Foo$Fancy$Fancier#method")
        .unwrap();
    assert_eq!(ast.span(method).start.line, 61);
}

#[test]
fn duplicate_types_are_errors() {
    let source = "class A {} class A {}";
    let err = parse("A.java", source, &ParseOptions::default()).unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::Duplicate);

    let ast = parse("A.java", source, &ParseOptions::lenient()).unwrap();
    assert_eq!(ast.errors().len(), 1);
    assert_eq!(ast.qualified("A"), Some(ast.toplevel()[0]));
}

#[test]
fn local_class_redeclaration_in_one_block_is_an_error() {
    let source = "class A { void m() { class L {} class L {} } }";
    let err = parse("A.java", source, &ParseOptions::default()).unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::Duplicate);
    assert_eq!((err.line, err.ch), (1, 39));

    let nested = "class A { void m() { class L {} { class L {} } } }";
    let ast = parse("A.java", nested, &ParseOptions::default()).unwrap();
    let names: Vec<&str> = ast.type_names().collect();
    assert_eq!(names, vec!["A", "A$1L", "A$2L"]);
}

#[test]
fn jdk7_features_are_gated() {
    let jdk6 = ParseOptions::default().with_level(JavaLevel::JDK6);
    for body in [
        "try (R r = open()) {}",
        "try {} catch (A | B e) {}",
        "int x = 0b101;",
        "int x = 1_000;",
        "java.util.List<String> x = new java.util.ArrayList<>();",
    ] {
        let source = format!("class G {{ void m() {{ {body} }} }}");
        parse("G.java", &source, &ParseOptions::default()).unwrap();

        let err = parse("G.java", &source, &jdk6).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Level, "{body}");

        let lenient = ParseOptions {
            strict: false,
            ..jdk6
        };
        let ast = parse("G.java", &source, &lenient).unwrap();
        assert_eq!(ast.errors().len(), 1, "{body}");
        assert_eq!(ast.errors()[0].kind, SyntaxErrorKind::Level);
    }
}

#[test]
fn unsupported_constructs_fail_even_when_lenient() {
    for body in [
        "Runnable r = () -> {};",
        "run(x -> x);",
        "Function f = String::valueOf;",
        "<T>foo();",
    ] {
        let source = format!("class U {{ void m() {{ {body} }} }}");
        let err = parse("U.java", &source, &ParseOptions::lenient()).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Unsupported, "{body}");
    }
}

#[test]
fn statement_forms() {
    let source = r#"class S {
    void m(int[] xs) {
        outer:
        for (int i = 0, j = 1; i < j; i++, j--) {
            if (xs[i] > 0) continue outer; else break;
        }
        for (i = 0, j = 2; ; ) break;
        do { x++; } while (x < 3);
        switch (x) { case 1: case 2: y(); break; default: }
        synchronized (this) { }
        try { } catch (A | B e) { } finally { }
        return;
    }
}"#;
    let ast = parse("S.java", source, &ParseOptions::default()).unwrap();
    let statements: Vec<&str> = ast
        .ids()
        .filter(|&id| {
            ast.kind(id).category() == Some(njast_syntax::NodeCategory::Statement)
        })
        .map(|id| ast.kind(id).name())
        .collect();
    for expected in ["Labeled", "For", "If", "Continue", "Break", "While", "Switch", "Synchronized", "Try", "Return"] {
        assert!(statements.contains(&expected), "missing {expected}: {statements:?}");
    }

    let fors: Vec<_> = ast
        .ids()
        .filter_map(|id| match ast.kind(id) {
            NodeKind::For { control, .. } => Some(control.clone()),
            _ => None,
        })
        .collect();
    let njast_syntax::ForControl::Classic { init, update, .. } = &fors[1] else {
        panic!("expected a classic for");
    };
    assert_eq!(init.len(), 2);
    assert!(update.is_empty());
}
