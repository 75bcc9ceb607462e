//! Member lookup through type hierarchies, and class projections.

use futures::future::{self, join_all, BoxFuture};
use futures::FutureExt;
use njast_core::name;
use njast_syntax::{Modifier, NodeId, NodeKind, TypeDeclKind, VarRole};

use crate::evaluate::{LocalType, TypeEvaluator};
use crate::resolver::first_found;
use crate::{
    ClassProjection, MemberKind, MemberProjection, Projection, ResolveError, ResolvedType,
};

/// Supertype chains deeper than this are assumed to be cyclic.
const MAX_SUPERTYPE_DEPTH: usize = 32;

type Lookup<'a, T> = BoxFuture<'a, Result<Option<T>, ResolveError>>;

impl<'a> TypeEvaluator<'a> {
    /// Return type of `method` as declared in or inherited by `owner`.
    ///
    /// Types declared in this buffer are searched here, walking their
    /// supertypes; anything else goes to the resolver.
    pub fn method_return(self, owner: String, method: String, depth: usize) -> Lookup<'a, ResolvedType> {
        async move {
            if depth > MAX_SUPERTYPE_DEPTH {
                tracing::warn!(target: "njast.resolve", %owner, %method, "supertype chain too deep");
                return Ok(None);
            }
            let Some(local) = self.local_type(&owner) else {
                return self.resolver().resolve_method_return_type(&owner, &method).await;
            };
            if let Some(declared) = self.declared_method(local.body, &method) {
                return self.evaluate(declared).await.map(Some);
            }
            let supertypes = self.supertypes(local).await;
            self.fan_out(supertypes, |ty| self.method_return(ty, method.clone(), depth + 1))
                .await
        }
        .boxed()
    }

    /// The member `projection` names, declared in or inherited by `owner`.
    pub(crate) fn find_member(
        self,
        owner: String,
        projection: Projection,
        depth: usize,
    ) -> Lookup<'a, MemberProjection> {
        async move {
            if depth > MAX_SUPERTYPE_DEPTH {
                tracing::warn!(target: "njast.resolve", %owner, ?projection, "supertype chain too deep");
                return Ok(None);
            }
            let Some(local) = self.local_type(&owner) else {
                let class = self.resolver().open_class(&owner, &projection).await?;
                return Ok(class.and_then(|class| class.member().cloned()));
            };
            let declared = match &projection {
                Projection::Method(method) => self.declared_method(local.body, method),
                Projection::Field(field) => self.declared_field(local.body, field),
                Projection::Members { .. } => return Ok(None),
            };
            if let Some(declared) = declared {
                return Ok(Some(self.member_projection(declared).await));
            }
            let supertypes = self.supertypes(local).await;
            self.fan_out(supertypes, |ty| self.find_member(ty, projection.clone(), depth + 1))
                .await
        }
        .boxed()
    }

    pub(crate) fn find_field(self, owner: String, field: String) -> Lookup<'a, MemberProjection> {
        self.find_member(owner, Projection::Field(field), 0)
    }

    /// A field inherited by any type enclosing `from`.
    pub(crate) async fn inherited_field(
        self,
        from: NodeId,
        field: &str,
    ) -> Result<Option<MemberProjection>, ResolveError> {
        self.inherited(from, Projection::Field(field.to_owned())).await
    }

    /// Return type of a method inherited by any type enclosing `from`.
    pub(crate) async fn inherited_method(
        self,
        from: NodeId,
        method: &str,
    ) -> Result<Option<ResolvedType>, ResolveError> {
        let mut first_err = None;
        for local in self.enclosing_types(from) {
            let supertypes = self.supertypes(local).await;
            let found = self
                .fan_out(supertypes, |ty| self.method_return(ty, method.to_owned(), 1))
                .await;
            match found {
                Ok(Some(found)) => return Ok(Some(found)),
                Ok(None) => {}
                Err(err) => {
                    first_err.get_or_insert(err);
                }
            }
        }
        first_err.map_or(Ok(None), Err)
    }

    async fn inherited(
        self,
        from: NodeId,
        projection: Projection,
    ) -> Result<Option<MemberProjection>, ResolveError> {
        let mut first_err = None;
        for local in self.enclosing_types(from) {
            let supertypes = self.supertypes(local).await;
            let found = self
                .fan_out(supertypes, |ty| self.find_member(ty, projection.clone(), 1))
                .await;
            match found {
                Ok(Some(found)) => return Ok(Some(found)),
                Ok(None) => {}
                Err(err) => {
                    first_err.get_or_insert(err);
                }
            }
        }
        first_err.map_or(Ok(None), Err)
    }

    /// Runs `lookup` on every resolved candidate concurrently. The first
    /// value in candidate order wins.
    async fn fan_out<T, F>(
        self,
        candidates: Vec<Result<String, ResolveError>>,
        lookup: F,
    ) -> Result<Option<T>, ResolveError>
    where
        T: Send + 'a,
        F: Fn(String) -> Lookup<'a, T> + Send,
    {
        let lookups = candidates
            .into_iter()
            .map(|candidate| match candidate {
                Ok(ty) => lookup(ty),
                Err(err) => future::ready(Err(err)).boxed(),
            })
            .collect::<Vec<_>>();
        first_found(join_all(lookups).await)
    }

    /// Types declared in this buffer that enclose `from`, innermost first.
    fn enclosing_types(&self, from: NodeId) -> Vec<LocalType> {
        let ast = self.ast();
        ast.ancestors(from)
            .filter_map(|id| ast.class_body(id)?.qualified.as_deref())
            .filter_map(|qualified| self.local_type(qualified))
            .collect()
    }

    /// Direct supertypes in declaration order: `extends`, then each
    /// `implements`. An anonymous class extends the instantiated type.
    pub(crate) async fn supertypes(self, local: LocalType) -> Vec<Result<String, ResolveError>> {
        let ast = self.ast();
        match ast.kind(local.node) {
            NodeKind::TypeDecl(decl) => {
                let resolved = join_all(decl.supertypes().map(|ty| self.resolve_type_node(ty))).await;
                resolved
                    .into_iter()
                    .map(|result| result.map(|resolved| resolved.ty))
                    .collect()
            }
            NodeKind::ClassBody(_) => {
                let parent = ast.parent(local.node).map(|parent| ast.kind(parent));
                match parent {
                    Some(NodeKind::Creator(creator)) => vec![self.created_type(creator).await],
                    Some(NodeKind::EnumConstant(constant)) => {
                        vec![Ok(name::enclosing(&constant.qualified)
                            .unwrap_or(&constant.qualified)
                            .to_owned())]
                    }
                    _ => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }

    fn declared_method(&self, body: NodeId, method: &str) -> Option<NodeId> {
        let body = self.ast().class_body(body)?;
        body.methods.iter().copied().find(|&id| {
            matches!(self.ast().kind(id), NodeKind::Method(m) if m.name == method && !m.is_constructor())
        })
    }

    fn declared_field(&self, body: NodeId, field: &str) -> Option<NodeId> {
        let ast = self.ast();
        let body = ast.class_body(body)?;
        let defs = body
            .fields
            .iter()
            .filter_map(|&group| match ast.kind(group) {
                NodeKind::VarDefs(group) => Some(group.defs.iter().copied()),
                _ => None,
            })
            .flatten();
        defs.chain(body.constants.iter().copied()).find(|&id| match ast.kind(id) {
            NodeKind::VarDef(def) => def.name == field,
            NodeKind::EnumConstant(constant) => constant.name == field,
            _ => false,
        })
    }

    /// Describes a method, field or enum constant declared in this buffer.
    pub(crate) async fn member_projection(self, id: NodeId) -> MemberProjection {
        let ast = self.ast();
        let owner = ast.enclosing_type_name(id).unwrap_or_default().to_owned();
        let javadoc = ast.javadoc(id).map(str::to_owned);
        let (name, kind, resolved, modifiers) = match ast.kind(id) {
            NodeKind::Method(method) => {
                let resolved = match method.return_type {
                    Some(ty) => self.type_or_written(ty).await,
                    None => ResolvedType::object(owner.clone()),
                };
                (method.name.clone(), MemberKind::Method, resolved, method.modifiers)
            }
            NodeKind::VarDef(def) => {
                let mut resolved = self.type_or_written(def.ty).await;
                resolved.array += def.dims;
                let modifiers = ast.parent(id).and_then(|group| match ast.kind(group) {
                    NodeKind::VarDefs(group) if group.role == VarRole::Field => group.modifiers,
                    _ => None,
                });
                (def.name.clone(), MemberKind::Field, resolved, modifiers)
            }
            NodeKind::EnumConstant(constant) => (
                constant.name.clone(),
                MemberKind::Field,
                ResolvedType::object(owner.clone()),
                None,
            ),
            kind => (
                kind.name().to_owned(),
                MemberKind::Field,
                ResolvedType::object(""),
                None,
            ),
        };
        let is_static = matches!(ast.kind(id), NodeKind::EnumConstant(_))
            || modifiers.is_some_and(|modifiers| match ast.kind(modifiers) {
                NodeKind::Modifiers(modifiers) => modifiers.has(Modifier::Static),
                _ => false,
            });
        MemberProjection {
            name,
            kind,
            ty: resolved.ty,
            array: resolved.array,
            owner,
            javadoc,
            is_static,
        }
    }

    /// Describes the type `qualified` declared in this buffer.
    pub async fn project_type(
        self,
        qualified: &str,
        projection: &Projection,
    ) -> Result<Option<ClassProjection>, ResolveError> {
        let Some(local) = self.local_type(qualified) else {
            return Ok(None);
        };
        let ast = self.ast();

        let (methods, fields) = match projection {
            Projection::Members { methods, fields } => {
                let Some(body) = ast.class_body(local.body) else {
                    return Ok(None);
                };
                let method_ids = body
                    .methods
                    .iter()
                    .copied()
                    .filter(|&id| matches!(ast.kind(id), NodeKind::Method(m) if !m.is_constructor()))
                    .filter(|_| *methods)
                    .collect::<Vec<_>>();
                let field_ids = body
                    .fields
                    .iter()
                    .filter_map(|&group| match ast.kind(group) {
                        NodeKind::VarDefs(group) => Some(group.defs.clone()),
                        _ => None,
                    })
                    .flatten()
                    .chain(body.constants.iter().copied())
                    .filter(|_| *fields)
                    .collect::<Vec<_>>();
                let methods = join_all(method_ids.into_iter().map(|id| self.member_projection(id))).await;
                let fields = join_all(field_ids.into_iter().map(|id| self.member_projection(id))).await;
                (methods, fields)
            }
            specific => {
                let Some(member) = self
                    .find_member(qualified.to_owned(), specific.clone(), 0)
                    .await?
                else {
                    return Ok(None);
                };
                match member.kind {
                    MemberKind::Method => (vec![member], Vec::new()),
                    MemberKind::Field => (Vec::new(), vec![member]),
                }
            }
        };

        let (kind, superclass, interfaces) = match ast.kind(local.node) {
            NodeKind::TypeDecl(decl) => {
                let superclass = match decl.superclass() {
                    Some(ty) => Some(self.type_or_written(ty).await.ty),
                    None => None,
                };
                let interface_ids = match decl.kind {
                    TypeDeclKind::Interface => &decl.extends,
                    _ => &decl.implements,
                };
                let interfaces = join_all(interface_ids.iter().map(|&ty| self.type_or_written(ty)))
                    .await
                    .into_iter()
                    .map(|resolved| resolved.ty)
                    .collect();
                (decl.kind, superclass, interfaces)
            }
            _ => {
                let superclass = self.supertypes(local).await.into_iter().next().and_then(Result::ok);
                (TypeDeclKind::Class, superclass, Vec::new())
            }
        };

        Ok(Some(ClassProjection {
            qualified_name: qualified.to_owned(),
            kind,
            superclass,
            interfaces,
            methods,
            fields,
        }))
    }

    /// The qualified type a member access at `id` applies to.
    pub async fn resolve_declaring_type(self, id: NodeId) -> Result<String, ResolveError> {
        let ast = self.ast();
        let id = match ast.kind(id) {
            NodeKind::Selector { primary, chain } => chain.last().copied().unwrap_or(*primary),
            _ => id,
        };
        let (member, receiver, is_method) = match ast.kind(id) {
            NodeKind::Identifier { name, receiver } => (name.as_str(), *receiver, false),
            NodeKind::MethodCall { name, receiver, .. } => (name.as_str(), *receiver, true),
            kind => return Err(ResolveError::NotEvaluable(kind.name())),
        };

        if let Some(receiver) = receiver {
            return self.receiver_type(receiver).await;
        }
        match (member, is_method) {
            ("this", _) => return self.this_type(id).await,
            ("super", true) => return self.superclass_of(id).await,
            _ => {}
        }

        if is_method {
            let owner = ast
                .search_method_scope(id, member)
                .and_then(|method| ast.enclosing_type_name(method));
            if let Some(owner) = owner {
                return Ok(owner.to_owned());
            }
        } else if let Some(binding) = ast.search_scope(id, member) {
            let is_member = match ast.kind(binding) {
                NodeKind::VarDef(def) => def.qualified.is_some(),
                NodeKind::EnumConstant(_) => true,
                _ => false,
            };
            if let Some(owner) = ast.enclosing_type_name(binding).filter(|_| is_member) {
                return Ok(owner.to_owned());
            }
            // Locals and parameters belong to the code around them.
            return self.this_type(id).await;
        }

        let projection = if is_method {
            Projection::Method(member.to_owned())
        } else {
            Projection::Field(member.to_owned())
        };
        let mut first_err = match self.inherited(id, projection.clone()).await {
            Ok(Some(found)) => return Ok(found.owner),
            Ok(None) => None,
            Err(err) => Some(err),
        };

        for owner in self.static_import_owners(member) {
            match self.find_member(owner.to_owned(), projection.clone(), 0).await {
                Ok(Some(found)) => return Ok(found.owner),
                Ok(None) => {}
                Err(err) => {
                    first_err.get_or_insert(err);
                }
            }
        }

        Err(match (first_err, is_method) {
            (source, true) => ResolveError::method(member, source),
            (Some(err), false) => err,
            (None, false) => ResolveError::UnresolvedIdentifier(member.to_owned()),
        })
    }
}
