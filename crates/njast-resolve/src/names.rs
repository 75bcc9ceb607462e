//! Resolution of type names written in source to qualified names.

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use njast_core::name;
use njast_syntax::keywords;
use njast_syntax::{NodeId, NodeKind};

use crate::evaluate::TypeEvaluator;
use crate::resolver::first_found;
use crate::{ResolveError, ResolvedType};

/// `java.lang` types assumed present when the resolver cannot see a JDK.
const JAVA_LANG: &[&str] = &[
    "AutoCloseable",
    "Boolean",
    "Byte",
    "CharSequence",
    "Character",
    "Class",
    "ClassLoader",
    "Cloneable",
    "Comparable",
    "Deprecated",
    "Double",
    "Enum",
    "Error",
    "Exception",
    "Float",
    "IllegalArgumentException",
    "IllegalStateException",
    "IndexOutOfBoundsException",
    "Integer",
    "InterruptedException",
    "Iterable",
    "Long",
    "Math",
    "NullPointerException",
    "Number",
    "Object",
    "Override",
    "Runnable",
    "RuntimeException",
    "Short",
    "String",
    "StringBuilder",
    "SuppressWarnings",
    "System",
    "Thread",
    "Throwable",
    "UnsupportedOperationException",
    "Void",
];

fn is_builtin(word: &str) -> bool {
    word == "void" || keywords::is_primitive(word)
}

impl<'a> TypeEvaluator<'a> {
    /// Qualified name of the type `dotted` refers to when written at `from`.
    pub fn resolve_type_name(
        self,
        from: NodeId,
        dotted: String,
    ) -> BoxFuture<'a, Result<String, ResolveError>> {
        self.resolve_name(from, dotted, true)
    }

    /// A type node as a value of that type.
    pub async fn resolve_type_node(self, id: NodeId) -> Result<ResolvedType, ResolveError> {
        match self.ast().kind(id) {
            NodeKind::BasicType { name, dims } => Ok(ResolvedType::object(name.clone()).with_array(*dims)),
            kind @ NodeKind::ReferenceType { dims, .. } => {
                let dotted = kind.type_name().unwrap_or_default();
                let qualified = self.resolve_type_name(id, dotted).await?;
                Ok(ResolvedType::object(qualified).with_array(*dims))
            }
            kind => Err(ResolveError::NotEvaluable(kind.name())),
        }
    }

    /// Like [`resolve_type_node`](Self::resolve_type_node), falling back to
    /// the name as written. Used where a best-effort description is better
    /// than none.
    pub(crate) async fn type_or_written(self, id: NodeId) -> ResolvedType {
        match self.resolve_type_node(id).await {
            Ok(resolved) => resolved,
            Err(err) => {
                let kind = self.ast().kind(id);
                tracing::debug!(target: "njast.resolve", error = %err, "keeping written type name");
                ResolvedType::object(kind.type_name().unwrap_or_default()).with_array(kind.type_dims())
            }
        }
    }

    fn resolve_name(
        self,
        from: NodeId,
        dotted: String,
        type_vars: bool,
    ) -> BoxFuture<'a, Result<String, ResolveError>> {
        async move {
            let (head, rest) = match dotted.split_once('.') {
                Some((head, rest)) => (head, Some(rest)),
                None => (dotted.as_str(), None),
            };
            if rest.is_none() && is_builtin(head) {
                return Ok(dotted);
            }

            if let Some(found) = self.resolve_head(from, head, type_vars).await? {
                return Ok(match rest {
                    Some(rest) => rest
                        .split('.')
                        .fold(found, |outer, segment| name::nested(&outer, segment)),
                    None => found,
                });
            }

            if rest.is_some() {
                if let Some(found) = self.resolve_qualified(&dotted).await? {
                    return Ok(found);
                }
            }
            Err(ResolveError::UnresolvedType(dotted))
        }
        .boxed()
    }

    /// A fully qualified name such as `a.b.C.D`.
    async fn resolve_qualified(self, dotted: &str) -> Result<Option<String>, ResolveError> {
        let local = name::nested_candidates(dotted)
            .into_iter()
            .find(|candidate| self.local_type(candidate).is_some());
        if local.is_some() {
            return Ok(local);
        }
        self.resolver().resolve_type(dotted).await
    }

    async fn resolve_head(
        self,
        from: NodeId,
        head: &str,
        type_vars: bool,
    ) -> Result<Option<String>, ResolveError> {
        let ast = self.ast();

        if type_vars {
            if let Some(bound) = self.type_variable(from, head) {
                let erased = match bound {
                    Some(bound) => {
                        let written = ast.kind(bound).type_name().unwrap_or_default();
                        self.resolve_name(bound, written, false).await?
                    }
                    None => "java.lang.Object".to_owned(),
                };
                return Ok(Some(erased));
            }
        }

        let imported = ast
            .imports()
            .find(|import| !import.is_static && import.simple_name() == Some(head));
        if let Some(import) = imported {
            let canonical = self.resolver().resolve_type(&import.path).await?;
            return Ok(Some(canonical.unwrap_or_else(|| import.path.clone())));
        }

        let top = name::top_level(ast.package(), head);
        for candidate in [top.as_str(), head] {
            if self.local_type(candidate).is_some() {
                return Ok(Some(candidate.to_owned()));
            }
        }

        if let Some(local) = ast.search_local_type(from, head) {
            return Ok(Some(local.to_owned()));
        }

        let mut enclosing = ast.enclosing_type_name(from);
        while let Some(outer) = enclosing {
            let candidate = name::nested(outer, head);
            if self.local_type(&candidate).is_some() {
                return Ok(Some(candidate));
            }
            enclosing = name::enclosing(outer);
        }

        let nested = ast.type_names().find(|qualified| {
            qualified.contains(name::NESTED_SEPARATOR)
                && name::simple_name(qualified) == head
                && ast
                    .qualified(qualified)
                    .and_then(|id| ast.type_decl(id))
                    .is_some_and(|decl| !decl.local)
        });
        if let Some(nested) = nested {
            return Ok(Some(nested.to_owned()));
        }

        if let Some(found) = self.resolver().resolve_type(&top).await? {
            return Ok(Some(found));
        }

        let wildcards = ast
            .imports()
            .filter(|import| !import.is_static && import.is_star)
            .map(|import| format!("{}.{head}", import.path))
            .collect::<Vec<_>>();
        let lookups = wildcards
            .iter()
            .map(|candidate| self.resolver().resolve_type(candidate));
        if let Some(found) = first_found(join_all(lookups).await)? {
            return Ok(Some(found));
        }

        let lang = format!("java.lang.{head}");
        if let Some(found) = self.resolver().resolve_type(&lang).await? {
            return Ok(Some(found));
        }
        Ok(JAVA_LANG.contains(&head).then_some(lang))
    }

    /// The first bound of the type variable `name` visible at `from`:
    /// `None` if unknown, `Some(None)` if declared without bounds.
    fn type_variable(&self, from: NodeId, name: &str) -> Option<Option<NodeId>> {
        let ast = self.ast();
        ast.ancestors(from).find_map(|scope| {
            let params = match ast.kind(scope) {
                NodeKind::Method(method) => method.type_params?,
                NodeKind::TypeDecl(decl) => decl.type_params?,
                _ => return None,
            };
            let NodeKind::TypeParameters { params } = ast.kind(params) else {
                return None;
            };
            params.iter().find_map(|&param| match ast.kind(param) {
                NodeKind::TypeParameter(param) if param.name == name => {
                    Some(param.bounds.first().copied())
                }
                _ => None,
            })
        })
    }
}
