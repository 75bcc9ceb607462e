use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use njast_core::name;
use njast_syntax::Ast;
use parking_lot::Mutex;

use crate::resolver::first_found;
use crate::{ClassProjection, ClassResolver, Projection, ResolveError, ResolvedType};

/// Queries several resolvers at once; the first member, in order, with an
/// answer wins.
///
/// Positive answers are cached. Class projections are only cached for the
/// general [`Projection::Members`] shape; narrower projections are cheap to
/// recompute and rarely repeated.
#[derive(Default)]
pub struct ComposedClassResolver {
    members: Vec<Arc<dyn ClassResolver>>,
    types: Mutex<HashMap<String, String>>,
    methods: Mutex<HashMap<String, ResolvedType>>,
    classes: Mutex<HashMap<(String, Projection), ClassProjection>>,
}

impl fmt::Debug for ComposedClassResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedClassResolver")
            .field("members", &self.members.len())
            .field("types", &self.types.lock().len())
            .field("methods", &self.methods.lock().len())
            .finish_non_exhaustive()
    }
}

impl ComposedClassResolver {
    pub fn new(members: Vec<Arc<dyn ClassResolver>>) -> Self {
        Self {
            members,
            ..Self::default()
        }
    }

    pub fn members(&self) -> &[Arc<dyn ClassResolver>] {
        &self.members
    }

    /// Forgets every cached answer.
    pub fn clear(&self) {
        self.types.lock().clear();
        self.methods.lock().clear();
        self.classes.lock().clear();
    }
}

#[async_trait]
impl ClassResolver for ComposedClassResolver {
    async fn resolve_type(&self, name: &str) -> Result<Option<String>, ResolveError> {
        let cached = self.types.lock().get(name).cloned();
        if cached.is_some() {
            return Ok(cached);
        }
        let found = first_found(
            join_all(self.members.iter().map(|member| member.resolve_type(name))).await,
        )?;
        if let Some(found) = &found {
            self.types.lock().insert(name.to_owned(), found.clone());
        }
        Ok(found)
    }

    async fn resolve_method_return_type(
        &self,
        qualified: &str,
        method: &str,
    ) -> Result<Option<ResolvedType>, ResolveError> {
        let key = name::member(qualified, method);
        let cached = self.methods.lock().get(&key).cloned();
        if cached.is_some() {
            return Ok(cached);
        }
        let found = first_found(
            join_all(
                self.members
                    .iter()
                    .map(|member| member.resolve_method_return_type(qualified, method)),
            )
            .await,
        )?;
        if let Some(found) = &found {
            self.methods.lock().insert(key, found.clone());
        }
        Ok(found)
    }

    async fn open_class(
        &self,
        qualified: &str,
        projection: &Projection,
    ) -> Result<Option<ClassProjection>, ResolveError> {
        let key = (qualified.to_owned(), projection.clone());
        if projection.is_general() {
            let cached = self.classes.lock().get(&key).cloned();
            if cached.is_some() {
                return Ok(cached);
            }
        }
        let found = first_found(
            join_all(
                self.members
                    .iter()
                    .map(|member| member.open_class(qualified, projection)),
            )
            .await,
        )?;
        if let Some(found) = &found {
            if projection.is_general() {
                self.classes.lock().insert(key, found.clone());
            }
        }
        Ok(found)
    }

    async fn suggest_import(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        let mut suggestions: Vec<String> = Vec::new();
        for result in join_all(self.members.iter().map(|member| member.suggest_import(name))).await
        {
            match result {
                Ok(found) => {
                    for candidate in found {
                        if !suggestions.contains(&candidate) {
                            suggestions.push(candidate);
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(target: "njast.resolve", error = %err, "import suggestions failed");
                }
            }
        }
        Ok(suggestions)
    }

    /// Offers the parse to each member in turn; the first to accept keeps
    /// it. Cached answers are dropped since they may describe the old text.
    fn put_cache(&self, ast: Arc<Ast>) -> bool {
        let accepted = self
            .members
            .iter()
            .any(|member| member.put_cache(Arc::clone(&ast)));
        if accepted {
            self.clear();
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoopClassResolver, TypeOrigin};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        ty: Option<&'static str>,
        calls: AtomicUsize,
        accepts: bool,
    }

    impl Fixed {
        fn new(ty: Option<&'static str>) -> Self {
            Self {
                ty,
                calls: AtomicUsize::new(0),
                accepts: false,
            }
        }
    }

    #[async_trait]
    impl ClassResolver for Fixed {
        async fn resolve_type(&self, _name: &str) -> Result<Option<String>, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.ty.map(str::to_owned))
        }

        async fn resolve_method_return_type(
            &self,
            _qualified: &str,
            _method: &str,
        ) -> Result<Option<ResolvedType>, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.ty.map(|ty| ResolvedType::new(ty, TypeOrigin::Method)))
        }

        async fn open_class(
            &self,
            _qualified: &str,
            _projection: &Projection,
        ) -> Result<Option<ClassProjection>, ResolveError> {
            Ok(None)
        }

        async fn suggest_import(&self, _name: &str) -> Result<Vec<String>, ResolveError> {
            Ok(self.ty.into_iter().map(str::to_owned).collect())
        }

        fn put_cache(&self, _ast: Arc<Ast>) -> bool {
            self.accepts
        }
    }

    #[tokio::test]
    async fn first_member_with_an_answer_wins() {
        let composed = ComposedClassResolver::new(vec![
            Arc::new(NoopClassResolver),
            Arc::new(Fixed::new(Some("a.First"))),
            Arc::new(Fixed::new(Some("b.Second"))),
        ]);
        assert_eq!(
            composed.resolve_type("First").await.unwrap().as_deref(),
            Some("a.First")
        );
    }

    #[tokio::test]
    async fn answers_are_cached() {
        let member = Arc::new(Fixed::new(Some("a.Thing")));
        let composed = ComposedClassResolver::new(vec![member.clone()]);

        composed.resolve_type("Thing").await.unwrap();
        composed.resolve_type("Thing").await.unwrap();
        composed.resolve_method_return_type("a.Thing", "m").await.unwrap();
        composed.resolve_method_return_type("a.Thing", "m").await.unwrap();
        assert_eq!(member.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn misses_are_not_cached() {
        let member = Arc::new(Fixed::new(None));
        let composed = ComposedClassResolver::new(vec![member.clone()]);

        assert_eq!(composed.resolve_type("Nope").await.unwrap(), None);
        assert_eq!(composed.resolve_type("Nope").await.unwrap(), None);
        assert_eq!(member.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn suggestions_are_a_deduplicated_union() {
        let composed = ComposedClassResolver::new(vec![
            Arc::new(Fixed::new(Some("a.Thing"))),
            Arc::new(Fixed::new(Some("b.Thing"))),
            Arc::new(Fixed::new(Some("a.Thing"))),
        ]);
        assert_eq!(
            composed.suggest_import("Thing").await.unwrap(),
            vec!["a.Thing".to_owned(), "b.Thing".to_owned()]
        );
    }

    #[test]
    fn put_cache_stops_at_first_acceptor() {
        let mut accepting = Fixed::new(None);
        accepting.accepts = true;
        let composed = ComposedClassResolver::new(vec![
            Arc::new(Fixed::new(None)),
            Arc::new(accepting),
        ]);
        let ast = njast_syntax::parse("A.java", "class A {}", &Default::default()).unwrap();
        assert!(composed.put_cache(Arc::new(ast)));

        let none = ComposedClassResolver::new(vec![Arc::new(NoopClassResolver)]);
        let ast = njast_syntax::parse("A.java", "class A {}", &Default::default()).unwrap();
        assert!(!none.put_cache(Arc::new(ast)));
    }
}
