use std::sync::Arc;

use async_trait::async_trait;

use njast_syntax::Ast;

use crate::{ClassProjection, Projection, ResolveError, ResolvedType};

/// Looks up classes that are not declared in the buffer being evaluated.
#[async_trait]
pub trait ClassResolver: Send + Sync {
    /// The canonical qualified name of `name` (`pkg.Outer$Inner`), or `None`
    /// if this resolver does not know the type.
    async fn resolve_type(&self, name: &str) -> Result<Option<String>, ResolveError>;

    /// Return type of the method `method` declared in or inherited by
    /// `qualified`.
    async fn resolve_method_return_type(
        &self,
        qualified: &str,
        method: &str,
    ) -> Result<Option<ResolvedType>, ResolveError>;

    async fn open_class(
        &self,
        qualified: &str,
        projection: &Projection,
    ) -> Result<Option<ClassProjection>, ResolveError>;

    /// Qualified names of known types whose simple name is `name`.
    async fn suggest_import(&self, _name: &str) -> Result<Vec<String>, ResolveError> {
        Ok(Vec::new())
    }

    /// Replaces the cached parse of `ast.path()` with a fresher one. Returns
    /// whether this resolver owns the path.
    fn put_cache(&self, _ast: Arc<Ast>) -> bool {
        false
    }
}

/// A resolver that knows nothing. Evaluation still works for types declared
/// in the buffer and for `java.lang`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopClassResolver;

#[async_trait]
impl ClassResolver for NoopClassResolver {
    async fn resolve_type(&self, _name: &str) -> Result<Option<String>, ResolveError> {
        Ok(None)
    }

    async fn resolve_method_return_type(
        &self,
        _qualified: &str,
        _method: &str,
    ) -> Result<Option<ResolvedType>, ResolveError> {
        Ok(None)
    }

    async fn open_class(
        &self,
        _qualified: &str,
        _projection: &Projection,
    ) -> Result<Option<ClassProjection>, ResolveError> {
        Ok(None)
    }
}

/// Reduces results gathered in candidate order: the first value wins, and
/// the first error is only reported when no candidate produced a value.
pub(crate) fn first_found<T>(
    results: impl IntoIterator<Item = Result<Option<T>, ResolveError>>,
) -> Result<Option<T>, ResolveError> {
    let mut first_err = None;
    for result in results {
        match result {
            Ok(Some(value)) => return Ok(Some(value)),
            Ok(None) => {}
            Err(err) => {
                first_err.get_or_insert(err);
            }
        }
    }
    match first_err {
        Some(err) => Err(err),
        None => Ok(None),
    }
}
