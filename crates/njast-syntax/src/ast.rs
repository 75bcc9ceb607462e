//! The parsed compilation unit.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use njast_core::{name, Span};

use crate::nodes::{ClassBody, CompilationUnit, Import, Node, NodeId, NodeKind, TypeDecl};
use crate::SyntaxError;

/// An arena of [`Node`]s rooted at a [`CompilationUnit`], plus the registry
/// of every type, method and field declared in it.
#[derive(Debug, Clone)]
pub struct Ast {
    pub(crate) path: PathBuf,
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) qualifieds: IndexMap<String, NodeId>,
    pub(crate) errors: Vec<SyntaxError>,
    pub(crate) partial: bool,
}

impl Ast {
    /// The path this source was parsed from. Used for diagnostics and
    /// resolver cache keys only.
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId::from_index)
    }

    /// Proper ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&id| self.parent(id))
    }

    /// `id` and its descendants in source order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            out.push(id);
            let children = self.children(id);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    pub fn compilation_unit(&self) -> &CompilationUnit {
        match self.kind(self.root) {
            NodeKind::CompilationUnit(unit) => unit,
            kind => unreachable!("root node is a {}", kind.name()),
        }
    }

    pub fn package(&self) -> Option<&str> {
        self.compilation_unit().package.as_deref()
    }

    pub fn imports(&self) -> impl Iterator<Item = &Import> + '_ {
        self.compilation_unit()
            .imports
            .iter()
            .filter_map(|&id| match self.kind(id) {
                NodeKind::Import(import) => Some(import),
                _ => None,
            })
    }

    /// Top-level type declarations in source order.
    pub fn toplevel(&self) -> &[NodeId] {
        &self.compilation_unit().types
    }

    /// Every declared type, method and field keyed by qualified name, in
    /// declaration order.
    pub fn qualifieds(&self) -> &IndexMap<String, NodeId> {
        &self.qualifieds
    }

    pub fn qualified(&self, name: &str) -> Option<NodeId> {
        self.qualifieds.get(name).copied()
    }

    /// Qualified names of the declared types, in declaration order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.qualifieds
            .keys()
            .map(String::as_str)
            .filter(|key| name::is_type_name(key))
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn type_decl(&self, id: NodeId) -> Option<&TypeDecl> {
        match self.kind(id) {
            NodeKind::TypeDecl(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn class_body(&self, id: NodeId) -> Option<&ClassBody> {
        match self.kind(id) {
            NodeKind::ClassBody(body) => Some(body),
            _ => None,
        }
    }

    /// Qualified name of a declaration node, if it has one.
    pub fn qualified_name_of(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::TypeDecl(decl) => Some(&decl.qualified),
            NodeKind::ClassBody(body) => body.qualified.as_deref(),
            NodeKind::Method(method) => method.qualified.as_deref(),
            NodeKind::VarDef(def) => def.qualified.as_deref(),
            NodeKind::EnumConstant(constant) => Some(&constant.qualified),
            _ => None,
        }
    }

    /// Javadoc attached to a declaration, if any.
    pub fn javadoc(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::TypeDecl(decl) => decl.javadoc.as_deref(),
            NodeKind::Method(method) => method.javadoc.as_deref(),
            NodeKind::VarDefs(defs) => defs.javadoc.as_deref(),
            NodeKind::EnumConstant(constant) => constant.javadoc.as_deref(),
            NodeKind::VarDef(_) => self.parent(id).and_then(|parent| self.javadoc(parent)),
            _ => None,
        }
    }

    /// Dotted source text of an identifier chain (`a.b.C`), if `id` is one.
    pub fn dotted_name(&self, id: NodeId) -> Option<String> {
        match self.kind(id) {
            NodeKind::Identifier {
                name,
                receiver: None,
            } => Some(name.clone()),
            NodeKind::Identifier {
                name,
                receiver: Some(receiver),
            } => {
                let mut out = self.dotted_name(*receiver)?;
                out.push('.');
                out.push_str(name);
                Some(out)
            }
            _ => None,
        }
    }

    /// Renders the tree as an indented outline, one node per line.
    pub fn dump(&self) -> String {
        fn go(ast: &Ast, id: NodeId, depth: usize, out: &mut String) {
            let node = ast.node(id);
            out.push_str(&"  ".repeat(depth));
            out.push_str(node.kind.name());
            if let Some(label) = ast.label(id) {
                out.push(' ');
                out.push_str(&label);
            }
            out.push_str(&format!(" @{}\n", node.span));
            for child in node.kind.children() {
                go(ast, child, depth + 1, out);
            }
        }

        let mut out = String::new();
        go(self, self.root, 0, &mut out);
        out
    }

    fn label(&self, id: NodeId) -> Option<String> {
        match self.kind(id) {
            NodeKind::Import(import) => Some(import.path.clone()),
            NodeKind::TypeDecl(decl) => Some(decl.qualified.clone()),
            NodeKind::Method(method) => Some(method.name.clone()),
            NodeKind::VarDef(def) => Some(def.name.clone()),
            NodeKind::Parameter(param) => Some(param.name.clone()),
            NodeKind::EnumConstant(constant) => Some(constant.name.clone()),
            NodeKind::Identifier { name, .. } | NodeKind::MethodCall { name, .. } => {
                Some(name.clone())
            }
            NodeKind::Literal { value, .. } => Some(value.clone()),
            kind @ (NodeKind::BasicType { .. } | NodeKind::ReferenceType { .. }) => {
                kind.type_name()
            }
            _ => None,
        }
    }
}
