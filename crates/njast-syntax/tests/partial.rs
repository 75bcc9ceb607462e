use pretty_assertions::assert_eq;

use njast_syntax::{parse, NodeKind, ParseOptions, Position};

const FRAGMENT: &str = "int count = 1;\nhelper(count);\nvoid helper(int n) {}\nString s = \"x\";\n";

#[test]
fn fragments_mix_members_and_statements() {
    let options = ParseOptions::partial().with_start(10, 5);
    let ast = parse("Fragment.java", FRAGMENT, &options).unwrap();
    assert!(ast.is_partial());
    assert!(ast.errors().is_empty());

    let fragment = ast.compilation_unit().fragment.unwrap();
    let body = ast.class_body(fragment).unwrap();
    assert_eq!(body.qualified, None);
    assert_eq!(body.members.len(), 4);
    assert_eq!(body.fields.len(), 2);
    assert_eq!(body.methods.len(), 1);
    assert_eq!(ast.kind(body.members[1]).name(), "MethodCall");

    assert_eq!(ast.span(body.members[0]).start, Position::new(10, 5));
    let call = ast.locate(11, 1).unwrap();
    assert_eq!(call, body.members[1]);

    let NodeKind::MethodCall { args, .. } = ast.kind(call) else {
        unreachable!()
    };
    let binding = ast.search_scope(args[0], "count").unwrap();
    assert_eq!(ast.kind(binding).name(), "VarDef");
}

#[test]
fn incomplete_blocks_do_not_fail() {
    let text = "void m() {\n    int x = 1;\n    x.";
    let ast = parse("Fragment.java", text, &ParseOptions::partial()).unwrap();
    assert!(!ast.errors().is_empty());

    let fragment = ast.compilation_unit().fragment.unwrap();
    let body = ast.class_body(fragment).unwrap();
    assert_eq!(body.methods.len(), 1);

    let x = ast.locate(3, 5).unwrap();
    assert_eq!(
        ast.kind(x),
        &NodeKind::Identifier {
            name: "x".into(),
            receiver: None
        }
    );
    assert_eq!(ast.kind(ast.search_scope(x, "x").unwrap()).name(), "VarDef");
}

#[test]
fn strict_fragments_report_the_first_error() {
    let options = ParseOptions {
        strict: true,
        ..ParseOptions::partial()
    };
    let err = parse("Fragment.java", "int x = ;", &options).unwrap_err();
    assert_eq!((err.line, err.ch), (1, 9));
}
