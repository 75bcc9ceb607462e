//! Node payloads stored in the [`Ast`](crate::Ast) arena.
//!
//! Every node owns its children through [`NodeId`]s. Links that are *not*
//! ownership (an expression's receiver, a variable's shared type) are kept in
//! separate fields and are never returned from [`NodeKind::children`].

use njast_core::Span;
use serde::Serialize;

use crate::literals::LiteralKind;
use crate::operators::{AssignOp, InfixOp, PrefixOp};

/// Index of a node in its [`Ast`](crate::Ast).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) span: Span,
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.span
    }

    /// The owning node. Unset on the root, and not yet linked when a node is
    /// handed to a listener.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Listener categories a node can be published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Import,
    Type,
    Method,
    Field,
    VarDef,
    Block,
    Statement,
    Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Final,
    Static,
    Abstract,
    Volatile,
    Transient,
    Native,
    Strictfp,
    Synchronized,
}

impl Modifier {
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "public" => Modifier::Public,
            "protected" => Modifier::Protected,
            "private" => Modifier::Private,
            "final" => Modifier::Final,
            "static" => Modifier::Static,
            "abstract" => Modifier::Abstract,
            "volatile" => Modifier::Volatile,
            "transient" => Modifier::Transient,
            "native" => Modifier::Native,
            "strictfp" => Modifier::Strictfp,
            "synchronized" => Modifier::Synchronized,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Final => "final",
            Modifier::Static => "static",
            Modifier::Abstract => "abstract",
            Modifier::Volatile => "volatile",
            Modifier::Transient => "transient",
            Modifier::Native => "native",
            Modifier::Strictfp => "strictfp",
            Modifier::Synchronized => "synchronized",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeDeclKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

impl TypeDeclKind {
    pub fn keyword(self) -> &'static str {
        match self {
            TypeDeclKind::Class => "class",
            TypeDeclKind::Interface => "interface",
            TypeDeclKind::Enum => "enum",
            TypeDeclKind::Annotation => "@interface",
        }
    }
}

/// What a group of variable declarations declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VarRole {
    Field,
    Local,
    /// A try-with-resources resource.
    Resource,
    /// The declaration part of a classic `for` loop.
    ForInit,
    /// The variable of an enhanced `for` loop.
    ForEach,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub package_annotations: Vec<NodeId>,
    pub imports: Vec<NodeId>,
    pub types: Vec<NodeId>,
    /// Member list of a partial parse.
    pub fragment: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Dotted path without the trailing `.*`.
    pub path: String,
    pub is_static: bool,
    pub is_star: bool,
}

impl Import {
    /// The simple name a single-type import makes visible.
    pub fn simple_name(&self) -> Option<&str> {
        if self.is_star {
            return None;
        }
        Some(self.path.rsplit('.').next().unwrap_or(&self.path))
    }

    /// The type a static import pulls members from.
    pub fn static_owner(&self) -> Option<&str> {
        if !self.is_static {
            return None;
        }
        if self.is_star {
            return Some(&self.path);
        }
        self.path.rfind('.').map(|idx| &self.path[..idx])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Modifiers {
    pub keywords: Vec<Modifier>,
    pub annotations: Vec<NodeId>,
}

impl Modifiers {
    pub fn has(&self, modifier: Modifier) -> bool {
        self.keywords.contains(&modifier)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: String,
    /// Element values or [`NodeKind::ElementValuePair`]s.
    pub args: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub kind: TypeDeclKind,
    pub name: String,
    pub name_span: Span,
    pub qualified: String,
    pub javadoc: Option<String>,
    pub modifiers: Option<NodeId>,
    pub type_params: Option<NodeId>,
    /// Superclass of a class, or super-interfaces of an interface.
    pub extends: Vec<NodeId>,
    pub implements: Vec<NodeId>,
    pub body: NodeId,
    /// Declared inside a block.
    pub local: bool,
}

impl TypeDecl {
    /// Declared supertypes in source order.
    pub fn supertypes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.extends.iter().chain(&self.implements).copied()
    }

    pub fn superclass(&self) -> Option<NodeId> {
        match self.kind {
            TypeDeclKind::Class => self.extends.first().copied(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    pub name: String,
    pub bounds: Vec<NodeId>,
}

/// A class, interface, enum, annotation or anonymous class body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassBody {
    /// Qualified name of the type this body belongs to. `None` for the
    /// member list of a partial parse.
    pub qualified: Option<String>,
    /// All members in source order.
    pub members: Vec<NodeId>,
    pub constants: Vec<NodeId>,
    pub types: Vec<NodeId>,
    /// Static and instance initializer blocks.
    pub blocks: Vec<NodeId>,
    /// Field declaration groups.
    pub fields: Vec<NodeId>,
    /// Methods and constructors.
    pub methods: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstant {
    pub name: String,
    pub name_span: Span,
    pub qualified: String,
    pub javadoc: Option<String>,
    pub modifiers: Option<NodeId>,
    pub args: Option<Vec<NodeId>>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub name_span: Span,
    /// Registry key; `None` for constructors and members of a partial parse.
    pub qualified: Option<String>,
    pub javadoc: Option<String>,
    pub modifiers: Option<NodeId>,
    pub type_params: Option<NodeId>,
    /// `None` for constructors.
    pub return_type: Option<NodeId>,
    pub params: NodeId,
    pub throws: Vec<NodeId>,
    pub body: Option<NodeId>,
    /// Annotation element default value.
    pub default_value: Option<NodeId>,
}

impl Method {
    #[inline]
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub modifiers: Option<NodeId>,
    pub ty: NodeId,
    pub name: String,
    pub name_span: Span,
    pub varargs: bool,
    /// Dimensions declared after the name.
    pub dims: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDefs {
    pub role: VarRole,
    pub javadoc: Option<String>,
    pub modifiers: Option<NodeId>,
    pub ty: NodeId,
    pub defs: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub name: String,
    pub name_span: Span,
    /// Registry key of a field.
    pub qualified: Option<String>,
    /// The type node shared with the rest of the group. Not owned.
    pub ty: NodeId,
    /// Dimensions declared after the name.
    pub dims: u32,
    pub init: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catch {
    pub modifiers: Option<NodeId>,
    pub types: Vec<NodeId>,
    pub name: String,
    pub name_span: Span,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForControl {
    Classic {
        init: Vec<NodeId>,
        condition: Option<NodeId>,
        update: Vec<NodeId>,
    },
    Enhanced {
        var: NodeId,
        iterable: NodeId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchLabel {
    Case(NodeId),
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Creator {
    pub type_args: Option<NodeId>,
    pub ty: NodeId,
    pub args: Option<Vec<NodeId>>,
    pub dim_exprs: Vec<NodeId>,
    /// Total array dimensions, sized or not.
    pub dims: u32,
    pub initializer: Option<NodeId>,
    /// Anonymous class body.
    pub body: Option<NodeId>,
    /// Outer instance of an inner-class creation (`outer.new Inner()`).
    pub receiver: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSegment {
    pub name: String,
    pub name_span: Span,
    pub type_args: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WildcardBoundKind {
    Extends,
    Super,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    CompilationUnit(CompilationUnit),
    Import(Import),
    Modifiers(Modifiers),
    Annotation(Annotation),
    ElementValuePair {
        name: String,
        value: NodeId,
    },
    ElementValueArray {
        values: Vec<NodeId>,
    },
    TypeDecl(TypeDecl),
    TypeParameters {
        params: Vec<NodeId>,
    },
    TypeParameter(TypeParameter),
    ClassBody(ClassBody),
    EnumConstant(EnumConstant),
    Method(Method),
    FormalParameters {
        params: Vec<NodeId>,
    },
    Parameter(Parameter),
    VarDefs(VarDefs),
    VarDef(VarDef),

    Block {
        /// `static` on a static initializer.
        modifiers: Option<NodeId>,
        statements: Vec<NodeId>,
    },
    If {
        condition: NodeId,
        then: NodeId,
        otherwise: Option<NodeId>,
    },
    While {
        condition: NodeId,
        body: NodeId,
        is_do: bool,
    },
    For {
        control: ForControl,
        body: NodeId,
    },
    Switch {
        selector: NodeId,
        groups: Vec<NodeId>,
    },
    SwitchGroup {
        labels: Vec<SwitchLabel>,
        statements: Vec<NodeId>,
    },
    Try {
        resources: Vec<NodeId>,
        body: NodeId,
        catches: Vec<NodeId>,
        finally: Option<NodeId>,
    },
    Catch(Catch),
    Assert {
        condition: NodeId,
        message: Option<NodeId>,
    },
    Labeled {
        label: String,
        statement: NodeId,
    },
    Break {
        label: Option<String>,
    },
    Continue {
        label: Option<String>,
    },
    Return {
        value: Option<NodeId>,
    },
    Throw {
        value: NodeId,
    },
    Synchronized {
        lock: NodeId,
        body: NodeId,
    },

    Literal {
        kind: LiteralKind,
        /// Source text; the content between the quotes for strings and chars.
        value: String,
    },
    /// A simple name, or `this`/`super`, optionally selected from a receiver.
    Identifier {
        name: String,
        receiver: Option<NodeId>,
    },
    /// `name(args)`. Explicit constructor invocations are named `this` or
    /// `super`.
    MethodCall {
        name: String,
        type_args: Option<NodeId>,
        args: Vec<NodeId>,
        receiver: Option<NodeId>,
    },
    ArrayAccess {
        index: NodeId,
        receiver: Option<NodeId>,
    },
    /// A primary followed by a chain of selectors, each linked to the
    /// previous element as its receiver.
    Selector {
        primary: NodeId,
        chain: Vec<NodeId>,
    },
    Creator(Creator),
    ArrayInitializer {
        elements: Vec<NodeId>,
    },
    Assignment {
        left: NodeId,
        op: AssignOp,
        right: NodeId,
    },
    /// A flat chain of binary operations, evaluated left to right.
    Infix {
        left: NodeId,
        rest: Vec<(InfixOp, NodeId)>,
    },
    Ternary {
        condition: NodeId,
        then: NodeId,
        otherwise: NodeId,
    },
    InstanceOf {
        expr: NodeId,
        ty: NodeId,
    },
    Cast {
        ty: NodeId,
        expr: NodeId,
    },
    Prefix {
        op: PrefixOp,
        expr: NodeId,
    },
    Paren {
        expr: NodeId,
    },
    ClassLiteral {
        ty: NodeId,
    },

    /// A primitive type or `void`.
    BasicType {
        name: String,
        dims: u32,
    },
    ReferenceType {
        segments: Vec<TypeSegment>,
        dims: u32,
    },
    /// `<...>`; empty for the diamond.
    TypeArguments {
        args: Vec<NodeId>,
    },
    Wildcard {
        bound: Option<(WildcardBoundKind, NodeId)>,
    },

    /// Stands in for a required construct that was absent from lenient
    /// input.
    Missing,
}

fn push_opt(out: &mut Vec<NodeId>, id: Option<NodeId>) {
    if let Some(id) = id {
        out.push(id);
    }
}

impl NodeKind {
    /// Owned children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            NodeKind::CompilationUnit(unit) => {
                out.extend(&unit.package_annotations);
                out.extend(&unit.imports);
                out.extend(&unit.types);
                push_opt(&mut out, unit.fragment);
            }
            NodeKind::Import(_) => {}
            NodeKind::Modifiers(modifiers) => out.extend(&modifiers.annotations),
            NodeKind::Annotation(annotation) => out.extend(&annotation.args),
            NodeKind::ElementValuePair { value, .. } => out.push(*value),
            NodeKind::ElementValueArray { values } => out.extend(values),
            NodeKind::TypeDecl(decl) => {
                push_opt(&mut out, decl.modifiers);
                push_opt(&mut out, decl.type_params);
                out.extend(&decl.extends);
                out.extend(&decl.implements);
                out.push(decl.body);
            }
            NodeKind::TypeParameters { params } => out.extend(params),
            NodeKind::TypeParameter(param) => out.extend(&param.bounds),
            NodeKind::ClassBody(body) => out.extend(&body.members),
            NodeKind::EnumConstant(constant) => {
                push_opt(&mut out, constant.modifiers);
                if let Some(args) = &constant.args {
                    out.extend(args);
                }
                push_opt(&mut out, constant.body);
            }
            NodeKind::Method(method) => {
                push_opt(&mut out, method.modifiers);
                push_opt(&mut out, method.type_params);
                push_opt(&mut out, method.return_type);
                out.push(method.params);
                out.extend(&method.throws);
                push_opt(&mut out, method.default_value);
                push_opt(&mut out, method.body);
            }
            NodeKind::FormalParameters { params } => out.extend(params),
            NodeKind::Parameter(param) => {
                push_opt(&mut out, param.modifiers);
                out.push(param.ty);
            }
            NodeKind::VarDefs(defs) => {
                push_opt(&mut out, defs.modifiers);
                out.push(defs.ty);
                out.extend(&defs.defs);
            }
            NodeKind::VarDef(def) => push_opt(&mut out, def.init),
            NodeKind::Block {
                modifiers,
                statements,
            } => {
                push_opt(&mut out, *modifiers);
                out.extend(statements);
            }
            NodeKind::If {
                condition,
                then,
                otherwise,
            } => {
                out.push(*condition);
                out.push(*then);
                push_opt(&mut out, *otherwise);
            }
            NodeKind::While {
                condition,
                body,
                is_do,
            } => {
                if *is_do {
                    out.extend([*body, *condition]);
                } else {
                    out.extend([*condition, *body]);
                }
            }
            NodeKind::For { control, body } => {
                match control {
                    ForControl::Classic {
                        init,
                        condition,
                        update,
                    } => {
                        out.extend(init);
                        push_opt(&mut out, *condition);
                        out.extend(update);
                    }
                    ForControl::Enhanced { var, iterable } => out.extend([*var, *iterable]),
                }
                out.push(*body);
            }
            NodeKind::Switch { selector, groups } => {
                out.push(*selector);
                out.extend(groups);
            }
            NodeKind::SwitchGroup { labels, statements } => {
                out.extend(labels.iter().filter_map(|label| match label {
                    SwitchLabel::Case(id) => Some(*id),
                    SwitchLabel::Default => None,
                }));
                out.extend(statements);
            }
            NodeKind::Try {
                resources,
                body,
                catches,
                finally,
            } => {
                out.extend(resources);
                out.push(*body);
                out.extend(catches);
                push_opt(&mut out, *finally);
            }
            NodeKind::Catch(catch) => {
                push_opt(&mut out, catch.modifiers);
                out.extend(&catch.types);
                out.push(catch.body);
            }
            NodeKind::Assert { condition, message } => {
                out.push(*condition);
                push_opt(&mut out, *message);
            }
            NodeKind::Labeled { statement, .. } => out.push(*statement),
            NodeKind::Break { .. } | NodeKind::Continue { .. } => {}
            NodeKind::Return { value } => push_opt(&mut out, *value),
            NodeKind::Throw { value } => out.push(*value),
            NodeKind::Synchronized { lock, body } => out.extend([*lock, *body]),
            NodeKind::Literal { .. } | NodeKind::Identifier { .. } => {}
            NodeKind::MethodCall {
                type_args, args, ..
            } => {
                push_opt(&mut out, *type_args);
                out.extend(args);
            }
            NodeKind::ArrayAccess { index, .. } => out.push(*index),
            NodeKind::Selector { primary, chain } => {
                out.push(*primary);
                out.extend(chain);
            }
            NodeKind::Creator(creator) => {
                push_opt(&mut out, creator.type_args);
                out.push(creator.ty);
                if let Some(args) = &creator.args {
                    out.extend(args);
                }
                out.extend(&creator.dim_exprs);
                push_opt(&mut out, creator.initializer);
                push_opt(&mut out, creator.body);
            }
            NodeKind::ArrayInitializer { elements } => out.extend(elements),
            NodeKind::Assignment { left, right, .. } => out.extend([*left, *right]),
            NodeKind::Infix { left, rest } => {
                out.push(*left);
                out.extend(rest.iter().map(|(_, right)| *right));
            }
            NodeKind::Ternary {
                condition,
                then,
                otherwise,
            } => out.extend([*condition, *then, *otherwise]),
            NodeKind::InstanceOf { expr, ty } => out.extend([*expr, *ty]),
            NodeKind::Cast { ty, expr } => out.extend([*ty, *expr]),
            NodeKind::Prefix { expr, .. } | NodeKind::Paren { expr } => out.push(*expr),
            NodeKind::ClassLiteral { ty } => out.push(*ty),
            NodeKind::BasicType { .. } => {}
            NodeKind::ReferenceType { segments, .. } => {
                out.extend(segments.iter().filter_map(|segment| segment.type_args));
            }
            NodeKind::TypeArguments { args } => out.extend(args),
            NodeKind::Wildcard { bound } => push_opt(&mut out, bound.map(|(_, ty)| ty)),
            NodeKind::Missing => {}
        }
        out
    }

    /// Short name of the node kind, for diagnostics and dumps.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::CompilationUnit(_) => "CompilationUnit",
            NodeKind::Import(_) => "Import",
            NodeKind::Modifiers(_) => "Modifiers",
            NodeKind::Annotation(_) => "Annotation",
            NodeKind::ElementValuePair { .. } => "ElementValuePair",
            NodeKind::ElementValueArray { .. } => "ElementValueArray",
            NodeKind::TypeDecl(_) => "TypeDecl",
            NodeKind::TypeParameters { .. } => "TypeParameters",
            NodeKind::TypeParameter(_) => "TypeParameter",
            NodeKind::ClassBody(_) => "ClassBody",
            NodeKind::EnumConstant(_) => "EnumConstant",
            NodeKind::Method(_) => "Method",
            NodeKind::FormalParameters { .. } => "FormalParameters",
            NodeKind::Parameter(_) => "Parameter",
            NodeKind::VarDefs(_) => "VarDefs",
            NodeKind::VarDef(_) => "VarDef",
            NodeKind::Block { .. } => "Block",
            NodeKind::If { .. } => "If",
            NodeKind::While { .. } => "While",
            NodeKind::For { .. } => "For",
            NodeKind::Switch { .. } => "Switch",
            NodeKind::SwitchGroup { .. } => "SwitchGroup",
            NodeKind::Try { .. } => "Try",
            NodeKind::Catch(_) => "Catch",
            NodeKind::Assert { .. } => "Assert",
            NodeKind::Labeled { .. } => "Labeled",
            NodeKind::Break { .. } => "Break",
            NodeKind::Continue { .. } => "Continue",
            NodeKind::Return { .. } => "Return",
            NodeKind::Throw { .. } => "Throw",
            NodeKind::Synchronized { .. } => "Synchronized",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::MethodCall { .. } => "MethodCall",
            NodeKind::ArrayAccess { .. } => "ArrayAccess",
            NodeKind::Selector { .. } => "Selector",
            NodeKind::Creator(_) => "Creator",
            NodeKind::ArrayInitializer { .. } => "ArrayInitializer",
            NodeKind::Assignment { .. } => "Assignment",
            NodeKind::Infix { .. } => "Infix",
            NodeKind::Ternary { .. } => "Ternary",
            NodeKind::InstanceOf { .. } => "InstanceOf",
            NodeKind::Cast { .. } => "Cast",
            NodeKind::Prefix { .. } => "Prefix",
            NodeKind::Paren { .. } => "Paren",
            NodeKind::ClassLiteral { .. } => "ClassLiteral",
            NodeKind::BasicType { .. } => "BasicType",
            NodeKind::ReferenceType { .. } => "ReferenceType",
            NodeKind::TypeArguments { .. } => "TypeArguments",
            NodeKind::Wildcard { .. } => "Wildcard",
            NodeKind::Missing => "Missing",
        }
    }

    pub fn category(&self) -> Option<NodeCategory> {
        Some(match self {
            NodeKind::Import(_) => NodeCategory::Import,
            NodeKind::TypeDecl(_) => NodeCategory::Type,
            NodeKind::Method(_) => NodeCategory::Method,
            NodeKind::VarDefs(defs) if defs.role == VarRole::Field => NodeCategory::Field,
            NodeKind::VarDef(_) => NodeCategory::VarDef,
            NodeKind::Block { .. } => NodeCategory::Block,
            NodeKind::If { .. }
            | NodeKind::While { .. }
            | NodeKind::For { .. }
            | NodeKind::Switch { .. }
            | NodeKind::Try { .. }
            | NodeKind::Assert { .. }
            | NodeKind::Labeled { .. }
            | NodeKind::Break { .. }
            | NodeKind::Continue { .. }
            | NodeKind::Return { .. }
            | NodeKind::Throw { .. }
            | NodeKind::Synchronized { .. } => NodeCategory::Statement,
            kind if kind.is_expression() => NodeCategory::Expression,
            _ => return None,
        })
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Literal { .. }
                | NodeKind::Identifier { .. }
                | NodeKind::MethodCall { .. }
                | NodeKind::ArrayAccess { .. }
                | NodeKind::Selector { .. }
                | NodeKind::Creator(_)
                | NodeKind::ArrayInitializer { .. }
                | NodeKind::Assignment { .. }
                | NodeKind::Infix { .. }
                | NodeKind::Ternary { .. }
                | NodeKind::InstanceOf { .. }
                | NodeKind::Cast { .. }
                | NodeKind::Prefix { .. }
                | NodeKind::Paren { .. }
                | NodeKind::ClassLiteral { .. }
        )
    }

    pub fn is_type(&self) -> bool {
        matches!(
            self,
            NodeKind::BasicType { .. } | NodeKind::ReferenceType { .. }
        )
    }

    /// Nodes that introduce names visible to nodes below them.
    pub fn is_scope(&self) -> bool {
        matches!(
            self,
            NodeKind::ClassBody(_)
                | NodeKind::Method(_)
                | NodeKind::Block { .. }
                | NodeKind::For { .. }
                | NodeKind::Switch { .. }
                | NodeKind::Catch(_)
                | NodeKind::Try { .. }
        )
    }

    /// The receiver link of a selector chain element.
    pub fn receiver(&self) -> Option<NodeId> {
        match self {
            NodeKind::Identifier { receiver, .. }
            | NodeKind::MethodCall { receiver, .. }
            | NodeKind::ArrayAccess { receiver, .. } => *receiver,
            NodeKind::Creator(creator) => creator.receiver,
            _ => None,
        }
    }

    /// The dotted name of a reference type, without type arguments.
    pub fn type_name(&self) -> Option<String> {
        match self {
            NodeKind::BasicType { name, .. } => Some(name.clone()),
            NodeKind::ReferenceType { segments, .. } => Some(
                segments
                    .iter()
                    .map(|segment| segment.name.as_str())
                    .collect::<Vec<_>>()
                    .join("."),
            ),
            _ => None,
        }
    }

    pub fn type_dims(&self) -> u32 {
        match self {
            NodeKind::BasicType { dims, .. } | NodeKind::ReferenceType { dims, .. } => *dims,
            _ => 0,
        }
    }
}
