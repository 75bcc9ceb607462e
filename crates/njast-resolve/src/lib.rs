//! Type evaluation over parsed Java sources.
//!
//! [`evaluate_type`] answers "what type does the expression at this node
//! have" for an [`Ast`] produced by `njast-syntax`. Anything the buffer does
//! not declare is looked up through a [`ClassResolver`]; the
//! [`SourceClassResolver`] reads sibling sources from disk and the
//! [`ComposedClassResolver`] combines several resolvers behind a cache.
//!
//! Evaluation is async. Independent lookups (every supertype of a class,
//! every wildcard import) run concurrently and the first answer in
//! declaration order wins.

mod cache;
mod composed;
mod error;
mod evaluate;
mod members;
mod names;
mod resolver;
mod source;
mod types;

use njast_syntax::{Ast, NodeId};

pub use cache::ResolverCache;
pub use composed::ComposedClassResolver;
pub use error::ResolveError;
pub use evaluate::TypeEvaluator;
pub use resolver::{ClassResolver, NoopClassResolver};
pub use source::{SourceClassResolver, SourceLayout};
pub use types::{
    ClassProjection, MemberKind, MemberProjection, Projection, ResolvedType, TypeOrigin,
};

/// The type the node `id` of `ast` evaluates to.
pub async fn evaluate_type(
    ast: &Ast,
    id: NodeId,
    resolver: &dyn ClassResolver,
) -> Result<ResolvedType, ResolveError> {
    TypeEvaluator::new(ast, resolver).evaluate(id).await
}

/// Qualified name of the type `name` refers to at the top level of `ast`.
pub async fn resolve_type(
    ast: &Ast,
    resolver: &dyn ClassResolver,
    name: &str,
) -> Result<String, ResolveError> {
    TypeEvaluator::new(ast, resolver)
        .resolve_type_name(ast.root(), name.to_owned())
        .await
}

/// The qualified type a member access at `id` looks in.
pub async fn resolve_declaring_type(
    ast: &Ast,
    id: NodeId,
    resolver: &dyn ClassResolver,
) -> Result<String, ResolveError> {
    TypeEvaluator::new(ast, resolver).resolve_declaring_type(id).await
}

/// Return type of `method` in the type `qualified` declared by `ast`,
/// walking its supertypes.
pub async fn resolve_method_return_type(
    ast: &Ast,
    resolver: &dyn ClassResolver,
    qualified: &str,
    method: &str,
) -> Result<Option<ResolvedType>, ResolveError> {
    TypeEvaluator::new(ast, resolver)
        .method_return(qualified.to_owned(), method.to_owned(), 0)
        .await
}

/// Describes the type `qualified` declared by `ast`.
pub async fn project_type(
    ast: &Ast,
    resolver: &dyn ClassResolver,
    qualified: &str,
    projection: &Projection,
) -> Result<Option<ClassProjection>, ResolveError> {
    TypeEvaluator::new(ast, resolver)
        .project_type(qualified, projection)
        .await
}
