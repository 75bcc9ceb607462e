//! Type evaluation of expressions and declarations.

use std::fmt;

use futures::future::BoxFuture;
use futures::FutureExt;
use njast_core::name;
use njast_syntax::literals::LiteralKind;
use njast_syntax::operators::{InfixOp, PrefixOp};
use njast_syntax::{Ast, ClassBody, Creator, Method, NodeId, NodeKind, TypeDeclKind};

use crate::{ClassResolver, ResolveError, ResolvedType, TypeOrigin};

/// Evaluates nodes of one [`Ast`], asking `resolver` about everything the
/// buffer does not declare.
#[derive(Clone, Copy)]
pub struct TypeEvaluator<'a> {
    ast: &'a Ast,
    resolver: &'a dyn ClassResolver,
}

/// A type declared in the evaluated buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LocalType {
    /// The `TypeDecl`, or the `ClassBody` of an anonymous class.
    pub node: NodeId,
    pub body: NodeId,
}

impl fmt::Debug for TypeEvaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEvaluator")
            .field("path", &self.ast.path())
            .finish_non_exhaustive()
    }
}

impl<'a> TypeEvaluator<'a> {
    pub fn new(ast: &'a Ast, resolver: &'a dyn ClassResolver) -> Self {
        Self { ast, resolver }
    }

    #[inline]
    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    #[inline]
    pub fn resolver(&self) -> &'a dyn ClassResolver {
        self.resolver
    }

    pub(crate) fn local_type(&self, qualified: &str) -> Option<LocalType> {
        let id = self.ast.qualified(qualified)?;
        match self.ast.kind(id) {
            NodeKind::TypeDecl(decl) => Some(LocalType {
                node: id,
                body: decl.body,
            }),
            NodeKind::ClassBody(_) => Some(LocalType { node: id, body: id }),
            _ => None,
        }
    }

    /// The type `id` evaluates to.
    pub fn evaluate(self, id: NodeId) -> BoxFuture<'a, Result<ResolvedType, ResolveError>> {
        async move {
            let result = self.evaluate_node(id).await;
            if let Err(err) = &result {
                tracing::trace!(
                    target: "njast.resolve",
                    kind = self.ast.kind(id).name(),
                    at = %self.ast.span(id),
                    error = %err,
                    "evaluation failed"
                );
            }
            result
        }
        .boxed()
    }

    async fn evaluate_node(self, id: NodeId) -> Result<ResolvedType, ResolveError> {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Literal { kind, .. } => Ok(ResolvedType::object(kind.java_type())),
            NodeKind::Identifier { name, receiver } => {
                self.evaluate_identifier(id, name, *receiver).await
            }
            NodeKind::MethodCall { name, receiver, .. } => {
                self.evaluate_method_call(id, name, *receiver).await
            }
            NodeKind::ArrayAccess { receiver, .. } => {
                let receiver = receiver.ok_or(ResolveError::NotEvaluable("ArrayAccess"))?;
                let array = self.evaluate(receiver).await?;
                let dims = array.array.saturating_sub(1);
                Ok(ResolvedType::object(array.ty).with_array(dims))
            }
            NodeKind::Selector { primary, chain } => {
                self.evaluate(chain.last().copied().unwrap_or(*primary)).await
            }
            NodeKind::Creator(creator) => {
                let created = self.created_type(creator).await?;
                Ok(ResolvedType::object(created).with_array(creator.dims))
            }
            NodeKind::Assignment { left, .. } => self.evaluate(*left).await,
            NodeKind::Infix { left, rest } => self.evaluate_infix(*left, rest).await,
            NodeKind::Ternary {
                then, otherwise, ..
            } => {
                let branch = if is_literal(ast, *then, LiteralKind::Null) {
                    *otherwise
                } else {
                    *then
                };
                self.evaluate(branch).await
            }
            NodeKind::InstanceOf { .. }
            | NodeKind::Prefix {
                op: PrefixOp::Not, ..
            } => Ok(ResolvedType::object("boolean")),
            NodeKind::Prefix { expr, .. } | NodeKind::Paren { expr } => self.evaluate(*expr).await,
            NodeKind::Cast { ty, .. } => self.resolve_type_node(*ty).await,
            NodeKind::ClassLiteral { .. } => Ok(ResolvedType::object("java.lang.Class")),
            NodeKind::BasicType { .. } | NodeKind::ReferenceType { .. } => {
                self.resolve_type_node(id).await
            }
            NodeKind::VarDefs(defs) => self.resolve_type_node(defs.ty).await,
            NodeKind::VarDef(def) => self.declared(def.ty, def.dims).await,
            NodeKind::Parameter(param) => {
                self.declared(param.ty, param.dims + u32::from(param.varargs))
                    .await
            }
            NodeKind::Catch(catch) => match catch.types.first() {
                Some(&ty) => self.resolve_type_node(ty).await,
                None => Err(ResolveError::NotEvaluable("Catch")),
            },
            NodeKind::EnumConstant(constant) => {
                let owner = name::enclosing(&constant.qualified).unwrap_or(&constant.qualified);
                Ok(ResolvedType::object(owner))
            }
            NodeKind::Method(method) => self.evaluate_method_decl(id, method).await,
            NodeKind::ClassBody(body) => self.evaluate_body(id, body).await,
            NodeKind::TypeDecl(decl) => Ok(ResolvedType::new(
                decl.qualified.clone(),
                TypeOrigin::Class,
            )),
            kind => Err(ResolveError::NotEvaluable(kind.name())),
        }
    }

    async fn declared(self, ty: NodeId, extra_dims: u32) -> Result<ResolvedType, ResolveError> {
        let declared = self.resolve_type_node(ty).await?;
        let dims = declared.array + extra_dims;
        Ok(declared.with_array(dims))
    }

    async fn evaluate_method_decl(
        self,
        id: NodeId,
        method: &Method,
    ) -> Result<ResolvedType, ResolveError> {
        match method.return_type {
            Some(ty) => Ok(self
                .resolve_type_node(ty)
                .await?
                .with_origin(TypeOrigin::Method)),
            None => {
                let owner = self.this_type(id).await?;
                Ok(ResolvedType::new(owner, TypeOrigin::Method))
            }
        }
    }

    async fn evaluate_body(self, id: NodeId, body: &ClassBody) -> Result<ResolvedType, ResolveError> {
        let parent = self.ast.parent(id).map(|parent| self.ast.kind(parent));
        match parent {
            Some(NodeKind::Creator(creator)) => {
                let created = self.created_type(creator).await?;
                Ok(ResolvedType::new(created, TypeOrigin::Anonymous))
            }
            Some(NodeKind::EnumConstant(constant)) => {
                let owner = name::enclosing(&constant.qualified).unwrap_or(&constant.qualified);
                Ok(ResolvedType::new(owner, TypeOrigin::Anonymous))
            }
            _ => match &body.qualified {
                Some(qualified) => Ok(ResolvedType::new(qualified.clone(), TypeOrigin::Body)),
                None => Err(ResolveError::NotEvaluable("ClassBody")),
            },
        }
    }

    /// Boolean operators make the whole chain boolean; string concatenation
    /// makes it a `String`. Otherwise the left operand decides.
    async fn evaluate_infix(
        self,
        left: NodeId,
        rest: &[(InfixOp, NodeId)],
    ) -> Result<ResolvedType, ResolveError> {
        if rest.iter().any(|(op, _)| op.is_boolean()) {
            return Ok(ResolvedType::object("boolean"));
        }
        let concatenates = rest.iter().any(|&(op, right)| {
            op == InfixOp::Add
                && (is_literal(self.ast, left, LiteralKind::String)
                    || is_literal(self.ast, right, LiteralKind::String))
        });
        if concatenates {
            return Ok(ResolvedType::object(LiteralKind::String.java_type()));
        }
        self.evaluate(left).await
    }

    async fn evaluate_identifier(
        self,
        id: NodeId,
        name: &str,
        receiver: Option<NodeId>,
    ) -> Result<ResolvedType, ResolveError> {
        match (name, receiver) {
            ("super", _) => Err(ResolveError::InvalidSuper),
            ("this", None) => Ok(ResolvedType::object(self.this_type(id).await?)),
            ("this", Some(outer)) => Ok(self
                .evaluate(outer)
                .await?
                .with_origin(TypeOrigin::Object)
                .with_array(0)),
            (_, Some(receiver)) => self.evaluate_field_access(id, name, receiver).await,
            (_, None) => self.evaluate_name(id, name).await,
        }
    }

    /// `receiver.name`: a field, an array's `length`, a nested type, or a
    /// package-qualified type name.
    async fn evaluate_field_access(
        self,
        id: NodeId,
        name: &str,
        receiver: NodeId,
    ) -> Result<ResolvedType, ResolveError> {
        let owner = match self.evaluate(receiver).await {
            Ok(owner) => owner,
            Err(err) => {
                if let Some(dotted) = self.ast.dotted_name(id) {
                    if let Ok(qualified) = self.resolve_type_name(id, dotted).await {
                        return Ok(ResolvedType::new(qualified, TypeOrigin::Class));
                    }
                }
                return Err(err);
            }
        };

        if owner.is_array() && name == "length" {
            return Ok(ResolvedType::object("int"));
        }
        if let Some(field) = self.find_field(owner.ty.clone(), name.to_owned()).await? {
            return Ok(field.resolved());
        }
        if owner.from == TypeOrigin::Class {
            if let Some(nested) = self.nested_type(&owner.ty, name).await? {
                return Ok(ResolvedType::new(nested, TypeOrigin::Class));
            }
        }
        Err(ResolveError::UnresolvedIdentifier(name.to_owned()))
    }

    /// A bare name: a variable in scope, an inherited or statically imported
    /// field, or a type.
    async fn evaluate_name(self, id: NodeId, name: &str) -> Result<ResolvedType, ResolveError> {
        if let Some(binding) = self.ast.search_scope(id, name) {
            return self
                .evaluate(binding)
                .await
                .map(|found| found.with_origin(TypeOrigin::Object));
        }

        match self.inherited_field(id, name).await {
            Ok(Some(field)) => return Ok(field.resolved()),
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(target: "njast.resolve", %name, error = %err, "supertype field lookup failed");
            }
        }

        for owner in self.static_import_owners(name) {
            if let Some(field) = self.find_field(owner.to_owned(), name.to_owned()).await? {
                return Ok(field.resolved());
            }
        }

        match self.resolve_type_name(id, name.to_owned()).await {
            Ok(qualified) => Ok(ResolvedType::new(qualified, TypeOrigin::Class)),
            Err(ResolveError::UnresolvedType(_)) => {
                Err(ResolveError::UnresolvedIdentifier(name.to_owned()))
            }
            Err(err) => Err(err),
        }
    }

    async fn evaluate_method_call(
        self,
        id: NodeId,
        name: &str,
        receiver: Option<NodeId>,
    ) -> Result<ResolvedType, ResolveError> {
        match (name, receiver) {
            ("this", None) => {
                let owner = self.this_type(id).await?;
                return Ok(ResolvedType::new(owner, TypeOrigin::Method));
            }
            ("super", None) => {
                let owner = self.superclass_of(id).await?;
                return Ok(ResolvedType::new(owner, TypeOrigin::Method));
            }
            _ => {}
        }

        if let Some(receiver) = receiver {
            let owner = self
                .receiver_type(receiver)
                .await
                .map_err(|err| ResolveError::method(name, Some(err)))?;
            return match self.method_return(owner, name.to_owned(), 0).await {
                Ok(Some(found)) => Ok(found),
                Ok(None) => Err(ResolveError::method(name, None)),
                Err(err) => Err(ResolveError::method(name, Some(err))),
            };
        }

        if let Some(method) = self.ast.search_method_scope(id, name) {
            return self
                .evaluate(method)
                .await
                .map_err(|err| ResolveError::method(name, Some(err)));
        }

        let mut first_err = None;
        match self.inherited_method(id, name).await {
            Ok(Some(found)) => return Ok(found),
            Ok(None) => {}
            Err(err) => first_err = Some(err),
        }

        for owner in self.static_import_owners(name) {
            match self.method_return(owner.to_owned(), name.to_owned(), 0).await {
                Ok(Some(found)) => return Ok(found),
                Ok(None) => {}
                Err(err) => {
                    first_err.get_or_insert(err);
                }
            }
        }
        Err(ResolveError::method(name, first_err))
    }

    /// The type a member access on `receiver` looks in. `super` names the
    /// superclass of the enclosing type; `Outer.super` the superclass of an
    /// enclosing class `Outer`, or `Outer` itself for an interface.
    pub(crate) async fn receiver_type(self, receiver: NodeId) -> Result<String, ResolveError> {
        match self.ast.kind(receiver) {
            NodeKind::Identifier {
                name,
                receiver: None,
            } if name == "super" => self.superclass_of(receiver).await,
            NodeKind::Identifier {
                name,
                receiver: Some(outer),
            } if name == "super" => {
                let outer = self.evaluate(*outer).await?.ty;
                let decl = self.ast.qualified(&outer).map(|decl| self.ast.kind(decl));
                match decl {
                    Some(NodeKind::TypeDecl(decl)) if decl.kind == TypeDeclKind::Class => {
                        match decl.superclass() {
                            Some(superclass) => Ok(self.resolve_type_node(superclass).await?.ty),
                            None => Ok("java.lang.Object".to_owned()),
                        }
                    }
                    _ => Ok(outer),
                }
            }
            _ => Ok(self.evaluate(receiver).await?.ty),
        }
    }

    /// The type `this` refers to at `id`. Inside an anonymous class that is
    /// the instantiated type.
    pub(crate) async fn this_type(self, id: NodeId) -> Result<String, ResolveError> {
        let body = self
            .ast
            .enclosing_body(id)
            .ok_or_else(|| ResolveError::UnresolvedIdentifier("this".to_owned()))?;
        let parent = self.ast.parent(body).map(|parent| self.ast.kind(parent));
        match parent {
            Some(NodeKind::Creator(creator)) => self.created_type(creator).await,
            Some(NodeKind::EnumConstant(constant)) => Ok(name::enclosing(&constant.qualified)
                .unwrap_or(&constant.qualified)
                .to_owned()),
            _ => self
                .ast
                .enclosing_type_name(id)
                .map(str::to_owned)
                .ok_or_else(|| ResolveError::UnresolvedIdentifier("this".to_owned())),
        }
    }

    /// The superclass of the type enclosing `id`.
    pub(crate) async fn superclass_of(self, id: NodeId) -> Result<String, ResolveError> {
        let body = self
            .ast
            .enclosing_body(id)
            .ok_or(ResolveError::InvalidSuper)?;
        let owner = self.ast.parent(body).map(|parent| self.ast.kind(parent));
        match owner {
            Some(NodeKind::TypeDecl(decl)) => match decl.superclass() {
                Some(superclass) => Ok(self.resolve_type_node(superclass).await?.ty),
                None => Ok("java.lang.Object".to_owned()),
            },
            Some(NodeKind::Creator(creator)) => self.created_type(creator).await,
            Some(NodeKind::EnumConstant(constant)) => Ok(name::enclosing(&constant.qualified)
                .unwrap_or(&constant.qualified)
                .to_owned()),
            _ => Err(ResolveError::InvalidSuper),
        }
    }

    /// The class a creator instantiates, without array dimensions.
    pub(crate) async fn created_type(self, creator: &Creator) -> Result<String, ResolveError> {
        let Some(outer) = creator.receiver else {
            return Ok(self.resolve_type_node(creator.ty).await?.ty);
        };
        let outer = self.evaluate(outer).await?.ty;
        let inner = self
            .ast
            .kind(creator.ty)
            .type_name()
            .unwrap_or_default()
            .replace('.', "$");
        self.nested_type(&outer, &inner)
            .await?
            .ok_or_else(|| ResolveError::UnresolvedType(name::nested(&outer, &inner)))
    }

    /// `outer$inner`, if that type exists.
    async fn nested_type(self, outer: &str, inner: &str) -> Result<Option<String>, ResolveError> {
        let candidate = name::nested(outer, inner);
        if self.local_type(&candidate).is_some() {
            return Ok(Some(candidate));
        }
        self.resolver.resolve_type(&candidate).await
    }

    /// Types whose members `import static` makes visible under `name`, in
    /// import order.
    pub(crate) fn static_import_owners(&self, name: &str) -> Vec<&'a str> {
        self.ast
            .imports()
            .filter(|import| import.is_star || import.simple_name() == Some(name))
            .filter_map(|import| import.static_owner())
            .collect()
    }
}

fn is_literal(ast: &Ast, id: NodeId, expected: LiteralKind) -> bool {
    matches!(ast.kind(id), NodeKind::Literal { kind, .. } if *kind == expected)
}
