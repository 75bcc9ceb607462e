//! Lexical scope queries.
//!
//! Scopes are the nodes for which [`NodeKind::is_scope`] holds. Each kind
//! exposes its own bindings; block locals are only visible to nodes that
//! start after the declaration.

use njast_core::Position;

use crate::ast::Ast;
use crate::nodes::{ForControl, NodeId, NodeKind, VarRole};

impl Ast {
    /// The nearest proper ancestor of `id` that introduces names.
    pub fn get_scope(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|&parent| self.kind(parent).is_scope())
    }

    /// Scopes enclosing `id`, innermost first.
    pub fn scopes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get_scope(id), move |&scope| self.get_scope(scope))
    }

    /// The declaration `name` refers to at `from`: a [`VarDef`], a
    /// [`Parameter`], a [`Catch`] or an [`EnumConstant`].
    ///
    /// [`VarDef`]: crate::VarDef
    /// [`Parameter`]: crate::Parameter
    /// [`Catch`]: crate::Catch
    /// [`EnumConstant`]: crate::EnumConstant
    pub fn search_scope(&self, from: NodeId, name: &str) -> Option<NodeId> {
        let at = self.span(from).start;
        self.scopes(from)
            .find_map(|scope| self.scope_binding(scope, name, at))
    }

    /// The method named `name` visible at `from`. Constructors are never
    /// found.
    pub fn search_method_scope(&self, from: NodeId, name: &str) -> Option<NodeId> {
        self.scopes(from).find_map(|scope| {
            let body = self.class_body(scope)?;
            body.methods.iter().copied().find(|&method| match self.kind(method) {
                NodeKind::Method(method) => method.name == name && !method.is_constructor(),
                _ => false,
            })
        })
    }

    /// The nearest enclosing type declaration.
    pub fn get_declaring_type(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|&parent| matches!(self.kind(parent), NodeKind::TypeDecl(_)))
    }

    /// The nearest enclosing class body that names a type, anonymous bodies
    /// included.
    pub fn enclosing_body(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|&parent| {
            self.class_body(parent)
                .is_some_and(|body| body.qualified.is_some())
        })
    }

    /// Qualified name of the innermost type `id` sits in.
    pub fn enclosing_type_name(&self, id: NodeId) -> Option<&str> {
        let body = self.enclosing_body(id)?;
        self.class_body(body)?.qualified.as_deref()
    }

    /// Qualified name of the local class `name` visible at `from`.
    pub fn search_local_type(&self, from: NodeId, name: &str) -> Option<&str> {
        let at = self.span(from).start;
        for scope in self.scopes(from) {
            let statements: &[NodeId] = match self.kind(scope) {
                NodeKind::Block { statements, .. } => statements,
                NodeKind::ClassBody(body) if body.qualified.is_none() => &body.members,
                _ => continue,
            };
            let found = statements.iter().find_map(|&statement| {
                let decl = self.type_decl(statement)?;
                (decl.local && decl.name == name && self.span(statement).start <= at)
                    .then_some(decl.qualified.as_str())
            });
            if found.is_some() {
                return found;
            }
        }
        None
    }

    fn scope_binding(&self, scope: NodeId, name: &str, at: Position) -> Option<NodeId> {
        match self.kind(scope) {
            NodeKind::ClassBody(body) => {
                let fields = body.fields.iter().copied();
                self.find_def(fields, name)
                    .or_else(|| {
                        body.constants.iter().copied().find(|&constant| {
                            matches!(self.kind(constant), NodeKind::EnumConstant(c) if c.name == name)
                        })
                    })
                    // Fragment bodies hold statements too.
                    .or_else(|| self.find_local(&body.members, name, at))
            }
            NodeKind::Method(method) => {
                let NodeKind::FormalParameters { params } = self.kind(method.params) else {
                    return None;
                };
                params.iter().copied().find(|&param| {
                    matches!(self.kind(param), NodeKind::Parameter(p) if p.name == name)
                })
            }
            NodeKind::Block { statements, .. } => self.find_local(statements, name, at),
            NodeKind::Switch { groups, .. } => groups.iter().find_map(|&group| match self.kind(group) {
                NodeKind::SwitchGroup { statements, .. } => self.find_local(statements, name, at),
                _ => None,
            }),
            NodeKind::For { control, .. } => match control {
                ForControl::Classic { init, .. } => self.find_def(init.iter().copied(), name),
                ForControl::Enhanced { var, .. } => self.find_def(std::iter::once(*var), name),
            },
            NodeKind::Catch(catch) => (catch.name == name).then_some(scope),
            NodeKind::Try { resources, .. } => self.find_def(resources.iter().copied(), name),
            _ => None,
        }
    }

    /// A declarator named `name` in any of the `VarDefs` groups.
    fn find_def(&self, groups: impl Iterator<Item = NodeId>, name: &str) -> Option<NodeId> {
        groups
            .filter_map(|group| match self.kind(group) {
                NodeKind::VarDefs(group) => Some(group),
                _ => None,
            })
            .flat_map(|group| group.defs.iter().copied())
            .find(|&def| matches!(self.kind(def), NodeKind::VarDef(d) if d.name == name))
    }

    fn find_local(&self, statements: &[NodeId], name: &str, at: Position) -> Option<NodeId> {
        let visible = statements.iter().copied().filter(|&statement| {
            self.span(statement).start <= at
                && matches!(self.kind(statement), NodeKind::VarDefs(g) if g.role == VarRole::Local)
        });
        self.find_def(visible, name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::nodes::NodeKind;
    use crate::{parse, Ast, NodeId, ParseOptions};

    const SOURCE: &str = r#"package a;
class Scopes {
    int field;
    Scopes(int ctor) {}
    void method(String param) {
        use(early);
        int early = 1;
        for (int i = 0; i < 3; i++) {
            use(i, param, field, early);
        }
        try (Reader r = open()) {
            use(r);
        } catch (IOException e) {
            use(e);
        }
        class Local {}
        new Local();
    }
    void Scopes() {}
}
"#;

    fn ast() -> Ast {
        parse("Scopes.java", SOURCE, &ParseOptions::default()).unwrap()
    }

    /// The first identifier called `name` on `line`.
    fn ident(ast: &Ast, line: u32, name: &str) -> NodeId {
        ast.ids()
            .find(|&id| {
                ast.span(id).start.line == line
                    && matches!(ast.kind(id), NodeKind::Identifier { name: n, .. } if n == name)
            })
            .unwrap()
    }

    fn binding_kind(ast: &Ast, from: NodeId, name: &str) -> Option<&'static str> {
        ast.search_scope(from, name).map(|id| ast.kind(id).name())
    }

    #[test]
    fn bindings_by_scope_kind() {
        let ast = ast();
        let inner = ident(&ast, 9, "i");
        assert_eq!(binding_kind(&ast, inner, "i"), Some("VarDef"));
        assert_eq!(binding_kind(&ast, inner, "param"), Some("Parameter"));
        assert_eq!(binding_kind(&ast, inner, "field"), Some("VarDef"));
        assert_eq!(binding_kind(&ast, inner, "early"), Some("VarDef"));
        assert_eq!(binding_kind(&ast, inner, "ctor"), None);

        let resource = ident(&ast, 12, "r");
        assert_eq!(binding_kind(&ast, resource, "r"), Some("VarDef"));
        let caught = ident(&ast, 14, "e");
        assert_eq!(binding_kind(&ast, caught, "e"), Some("Catch"));
    }

    #[test]
    fn locals_are_visible_after_their_declaration() {
        let ast = ast();
        let early = ident(&ast, 6, "early");
        assert_eq!(ast.search_scope(early, "early"), None);
    }

    #[test]
    fn methods_and_types() {
        let ast = ast();
        let from = ident(&ast, 9, "i");
        let method = ast.search_method_scope(from, "Scopes").unwrap();
        assert_eq!(ast.span(method).start.line, 19);
        assert!(ast.search_method_scope(from, "use").is_none());
        assert_eq!(ast.enclosing_type_name(from), Some("a.Scopes"));
        let decl = ast.get_declaring_type(from).unwrap();
        assert_eq!(ast.qualified_name_of(decl), Some("a.Scopes"));

        let creator = ast
            .ids()
            .find(|&id| matches!(ast.kind(id), NodeKind::Creator(_)))
            .unwrap();
        assert_eq!(ast.search_local_type(creator, "Local"), Some("a.Scopes$1Local"));
    }
}
