use std::cell::Cell;

use pretty_assertions::assert_eq;

use njast_syntax::{parse_with_listeners, Listeners, NodeCategory, NodeKind, ParseOptions};

const SOURCE: &str = r#"class A {
    /** first */
    void one() { Object o = (Object) make(); }
    int field = (two) + 1;
    void three() { A.B b = null; }
    class B { void four() {} }
}
"#;

#[test]
fn each_category_sees_its_nodes_once() {
    let mut methods = Vec::new();
    let mut fields = Vec::new();
    let types = Cell::new(0);
    let expressions = Cell::new(0);

    let ast = {
        let mut listeners = Listeners::new();
        listeners
            .on(NodeCategory::Method, |_, node| {
                if let NodeKind::Method(method) = node.kind() {
                    methods.push(method.name.clone());
                }
            })
            .on(NodeCategory::Field, |_, node| {
                if let NodeKind::VarDefs(group) = node.kind() {
                    fields.push(group.defs.len());
                }
            })
            .on(NodeCategory::Type, |_, _| types.set(types.get() + 1))
            .on(NodeCategory::Expression, |_, _| {
                expressions.set(expressions.get() + 1)
            });
        parse_with_listeners("A.java", SOURCE, &ParseOptions::default(), &mut listeners).unwrap()
    };

    assert_eq!(methods, vec!["one", "three", "four"]);
    assert_eq!(fields, vec![1]);
    assert_eq!(types.get(), 2);

    // Nodes built while looking ahead are never published.
    let in_tree = ast.ids().filter(|&id| ast.kind(id).is_expression()).count();
    assert_eq!(expressions.get(), in_tree);
}

#[test]
fn published_ids_match_the_tree() {
    let mut seen = Vec::new();
    let ast = {
        let mut listeners = Listeners::new();
        listeners.on(NodeCategory::Method, |id, node| seen.push((id, node.span())));
        parse_with_listeners("A.java", SOURCE, &ParseOptions::default(), &mut listeners).unwrap()
    };
    assert_eq!(seen.len(), 3);
    for (id, span) in seen {
        assert_eq!(ast.span(id), span);
        assert_eq!(ast.kind(id).name(), "Method");
    }
}
