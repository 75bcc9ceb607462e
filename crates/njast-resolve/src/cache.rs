use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use njast_syntax::{Ast, JavaLevel};
use parking_lot::Mutex;

use crate::{ClassResolver, ComposedClassResolver, SourceClassResolver};

/// Hands out one resolver per project so that parses and type lookups are
/// shared by every file in it.
#[derive(Debug)]
pub struct ResolverCache {
    extra_roots: Vec<PathBuf>,
    level: JavaLevel,
    enabled: bool,
    resolvers: Mutex<HashMap<PathBuf, Arc<ComposedClassResolver>>>,
}

impl Default for ResolverCache {
    fn default() -> Self {
        Self {
            extra_roots: Vec::new(),
            level: JavaLevel::default(),
            enabled: true,
            resolvers: Mutex::new(HashMap::new()),
        }
    }
}

impl ResolverCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source roots searched after the standard ones, relative to each
    /// project root.
    pub fn with_extra_roots(mut self, extra_roots: Vec<PathBuf>) -> Self {
        self.extra_roots = extra_roots;
        self
    }

    pub fn with_level(mut self, level: JavaLevel) -> Self {
        self.level = level;
        self
    }

    /// With caching off every call builds a fresh resolver.
    pub fn with_caching(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The resolver for the project containing the source file `path`.
    ///
    /// The project root is the directory above the first `src` component of
    /// the file's directory. A file outside any `src` tree gets a resolver
    /// for its own directory, whose package base is learned from the first
    /// type found there.
    pub fn from_source(&self, path: &Path) -> Arc<ComposedClassResolver> {
        self.resolver_for(path, None)
    }

    /// Like [`from_source`](Self::from_source) for a parsed buffer. The
    /// buffer's package fixes the package base of a directory resolver and
    /// the parse itself is offered to the resolver's cache.
    pub fn from_ast(&self, ast: &Arc<Ast>) -> Arc<ComposedClassResolver> {
        let resolver = self.resolver_for(ast.path(), Some(ast.package()));
        resolver.put_cache(Arc::clone(ast));
        resolver
    }

    pub fn len(&self) -> usize {
        self.resolvers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.resolvers.lock().clear();
    }

    fn resolver_for(&self, path: &Path, package: Option<Option<&str>>) -> Arc<ComposedClassResolver> {
        let dir = path.parent().unwrap_or(Path::new(""));
        let project = project_root(dir);
        let key = project.clone().unwrap_or_else(|| dir.to_owned());

        if self.enabled {
            if let Some(resolver) = self.resolvers.lock().get(&key) {
                return Arc::clone(resolver);
            }
        }

        let source = match project {
            Some(root) => {
                tracing::debug!(target: "njast.resolve", root = %root.display(), "project resolver");
                SourceClassResolver::project_with_roots(root, self.extra_roots.clone())
            }
            None => {
                tracing::debug!(target: "njast.resolve", dir = %dir.display(), "directory resolver");
                match package {
                    Some(package) => SourceClassResolver::directory_for_package(dir, package),
                    None => SourceClassResolver::directory(dir),
                }
            }
        };
        let members: Vec<Arc<dyn ClassResolver>> = vec![Arc::new(source.with_level(self.level))];
        let resolver = Arc::new(ComposedClassResolver::new(members));

        if !self.enabled {
            return resolver;
        }
        Arc::clone(
            self.resolvers
                .lock()
                .entry(key)
                .or_insert(resolver),
        )
    }
}

/// The directory above the first `src` component of `dir`.
fn project_root(dir: &Path) -> Option<PathBuf> {
    let components = dir.components().collect::<Vec<_>>();
    let src = components
        .iter()
        .position(|component| matches!(component, Component::Normal(name) if *name == "src"))?;
    Some(components[..src].iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn project_root_is_above_first_src() {
        assert_eq!(
            project_root(Path::new("/work/app/src/main/java/net/dhleong")),
            Some(PathBuf::from("/work/app"))
        );
        assert_eq!(
            project_root(Path::new("/work/src/app/src/net")),
            Some(PathBuf::from("/work"))
        );
        assert_eq!(project_root(Path::new("/work/app/lib")), None);
    }

    #[test]
    fn resolvers_are_shared_per_project() {
        let cache = ResolverCache::new();
        let a = cache.from_source(Path::new("/p/src/a/A.java"));
        let b = cache.from_source(Path::new("/p/src/main/java/b/B.java"));
        let other = cache.from_source(Path::new("/q/src/a/A.java"));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn disabled_cache_builds_fresh_resolvers() {
        let cache = ResolverCache::new().with_caching(false);
        let a = cache.from_source(Path::new("/p/src/a/A.java"));
        let b = cache.from_source(Path::new("/p/src/a/A.java"));
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(cache.is_empty());
    }
}
