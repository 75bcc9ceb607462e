//! Class resolution from `.java` files on disk.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use njast_core::name;
use njast_syntax::{parse, Ast, JavaLevel, ParseOptions};
use parking_lot::{Mutex, RwLock};

use crate::{ClassProjection, ClassResolver, Projection, ResolveError, ResolvedType};

/// Where a [`SourceClassResolver`] looks for sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLayout {
    /// A project checkout: `root/src`, `root/src/main/java` and
    /// `root/src/debug/java`, then any extra roots.
    Project {
        root: PathBuf,
        extra_roots: Vec<PathBuf>,
    },
    /// A single directory of sources whose package base is not known up
    /// front. It is derived from the first type found, or from the first
    /// parse handed to [`ClassResolver::put_cache`].
    Directory { dir: PathBuf },
}

impl SourceLayout {
    pub fn root(&self) -> &Path {
        match self {
            SourceLayout::Project { root, .. } => root,
            SourceLayout::Directory { dir } => dir,
        }
    }

    /// Candidate source roots, in lookup order. They need not exist.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        match self {
            SourceLayout::Project { root, extra_roots } => {
                let mut paths = vec![
                    root.join("src"),
                    root.join("src").join("main").join("java"),
                    root.join("src").join("debug").join("java"),
                ];
                paths.extend(extra_roots.iter().map(|extra| root.join(extra)));
                paths
            }
            SourceLayout::Directory { dir } => vec![dir.clone()],
        }
    }
}

#[derive(Debug, Default)]
struct TypeIndex {
    by_file: HashMap<PathBuf, Vec<String>>,
    all: Vec<String>,
}

impl TypeIndex {
    /// Swaps the types recorded for `file`, keeping `all` in step.
    fn replace(&mut self, file: PathBuf, types: Vec<String>) {
        let existing = self.by_file.entry(file).or_default();
        self.all.retain(|known| !existing.contains(known) || types.contains(known));
        for added in types.iter().filter(|&ty| !existing.contains(ty)) {
            self.all.push(added.clone());
        }
        *existing = types;
    }
}

/// Marks a lookup as running. A cyclic hierarchy re-entering the same lookup
/// answers `None` instead of recursing forever.
struct InFlight<'r> {
    set: &'r Mutex<HashSet<String>>,
    key: String,
}

impl<'r> InFlight<'r> {
    fn enter(set: &'r Mutex<HashSet<String>>, key: String) -> Option<Self> {
        if !set.lock().insert(key.clone()) {
            tracing::debug!(target: "njast.resolve", %key, "cyclic lookup");
            return None;
        }
        Some(Self { set, key })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.key);
    }
}

/// Resolves classes by parsing the sources that declare them.
///
/// Parses are lenient and cached per path; the list of every known type is
/// built on the first [`suggest_import`](ClassResolver::suggest_import) and
/// kept current through [`put_cache`](ClassResolver::put_cache).
pub struct SourceClassResolver {
    layout: SourceLayout,
    options: ParseOptions,
    asts: RwLock<HashMap<PathBuf, Arc<Ast>>>,
    /// Top-level type -> declaring file.
    paths: Mutex<HashMap<String, PathBuf>>,
    /// Leading package segments a directory layout does not mirror.
    package_depth: Mutex<Option<usize>>,
    types: Mutex<Option<TypeIndex>>,
    in_flight: Mutex<HashSet<String>>,
}

impl fmt::Debug for SourceClassResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceClassResolver")
            .field("layout", &self.layout)
            .field("cached", &self.asts.read().len())
            .finish_non_exhaustive()
    }
}

impl SourceClassResolver {
    pub fn new(layout: SourceLayout) -> Self {
        Self {
            layout,
            options: ParseOptions::lenient(),
            asts: RwLock::new(HashMap::new()),
            paths: Mutex::new(HashMap::new()),
            package_depth: Mutex::new(None),
            types: Mutex::new(None),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn project(root: impl Into<PathBuf>) -> Self {
        Self::project_with_roots(root, Vec::new())
    }

    /// A project layout with additional source roots, relative to `root`
    /// unless absolute.
    pub fn project_with_roots(root: impl Into<PathBuf>, extra_roots: Vec<PathBuf>) -> Self {
        Self::new(SourceLayout::Project {
            root: root.into(),
            extra_roots,
        })
    }

    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self::new(SourceLayout::Directory { dir: dir.into() })
    }

    /// A directory layout whose sources belong to `package`.
    pub fn directory_for_package(dir: impl Into<PathBuf>, package: Option<&str>) -> Self {
        let resolver = Self::directory(dir);
        *resolver.package_depth.lock() = Some(package_depth(package));
        resolver
    }

    /// Language level used to parse sources. Parses are always lenient.
    pub fn with_level(mut self, level: JavaLevel) -> Self {
        self.options = self.options.with_level(level);
        self
    }

    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    /// The file declaring `qualified`, if one exists.
    pub async fn path_for_type(&self, qualified: &str) -> Option<PathBuf> {
        let top = name::top_level_type(qualified);
        let known = self.paths.lock().get(top).cloned();
        if known.is_some() {
            return known;
        }

        let relative = name::source_path(qualified);
        let found = match &self.layout {
            SourceLayout::Project { .. } => {
                let candidates = self
                    .layout
                    .search_paths()
                    .into_iter()
                    .map(|base| base.join(&relative))
                    .collect::<Vec<_>>();
                let exists = join_all(candidates.iter().map(tokio::fs::try_exists)).await;
                candidates
                    .into_iter()
                    .zip(exists)
                    .find_map(|(candidate, exists)| matches!(exists, Ok(true)).then_some(candidate))
            }
            SourceLayout::Directory { dir } => {
                let segments = relative.components().count();
                let known_depth = *self.package_depth.lock();
                let depth = known_depth.unwrap_or(segments.saturating_sub(1));
                if segments <= depth {
                    return None;
                }
                let candidate = dir.join(relative.components().skip(depth).collect::<PathBuf>());
                let exists = matches!(tokio::fs::try_exists(&candidate).await, Ok(true));
                if exists && known_depth.is_none() {
                    tracing::debug!(target: "njast.resolve", depth, "derived package depth");
                    self.package_depth.lock().get_or_insert(depth);
                }
                exists.then_some(candidate)
            }
        }?;

        self.paths.lock().insert(top.to_owned(), found.clone());
        Some(found)
    }

    /// The cached parse of `path`, reading and parsing it on first use.
    pub async fn open_ast(&self, path: &Path) -> Result<Arc<Ast>, ResolveError> {
        let cached = self.asts.read().get(path).cloned();
        if let Some(ast) = cached {
            return Ok(ast);
        }
        let ast = Arc::new(self.read_ast(path).await?);
        Ok(self
            .asts
            .write()
            .entry(path.to_owned())
            .or_insert(ast)
            .clone())
    }

    async fn read_ast(&self, path: &Path) -> Result<Ast, ResolveError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ResolveError::Io {
                path: path.to_owned(),
                source,
            })?;
        let ast = parse(path, &text, &self.options).map_err(|source| ResolveError::Parse {
            path: path.to_owned(),
            source,
        })?;
        tracing::debug!(
            target: "njast.resolve",
            path = %path.display(),
            errors = ast.errors().len(),
            "parsed source"
        );
        Ok(ast)
    }

    async fn load(&self, qualified: &str) -> Result<Option<Arc<Ast>>, ResolveError> {
        match self.path_for_type(qualified).await {
            Some(path) => self.open_ast(&path).await.map(Some),
            None => Ok(None),
        }
    }

    /// Every type declared under the search paths.
    pub async fn walk_types(&self) -> Result<Vec<String>, ResolveError> {
        let cached = self.types.lock().as_ref().map(|index| index.all.clone());
        if let Some(all) = cached {
            return Ok(all);
        }

        let roots = self.layout.search_paths();
        let files = tokio::task::spawn_blocking(move || java_files(&roots))
            .await
            .map_err(|err| ResolveError::Resolver(err.to_string()))?;

        let parsed = join_all(files.iter().map(|file| async move {
            let cached = self.asts.read().get(file.as_path()).cloned();
            match cached {
                Some(ast) => Ok(ast),
                None => self.read_ast(file).await.map(Arc::new),
            }
        }))
        .await;

        let mut index = TypeIndex::default();
        for (file, result) in files.into_iter().zip(parsed) {
            match result {
                Ok(ast) => {
                    let types = ast.type_names().map(str::to_owned).collect::<Vec<_>>();
                    index.replace(file, types);
                }
                Err(err) => {
                    tracing::warn!(target: "njast.resolve", error = %err, "skipping source");
                }
            }
        }
        tracing::debug!(target: "njast.resolve", types = index.all.len(), "indexed sources");

        let all = index.all.clone();
        *self.types.lock() = Some(index);
        Ok(all)
    }
}

#[async_trait]
impl ClassResolver for SourceClassResolver {
    async fn resolve_type(&self, name: &str) -> Result<Option<String>, ResolveError> {
        for candidate in name::nested_candidates(name) {
            if let Some(ast) = self.load(&candidate).await? {
                if ast.qualified(&candidate).is_some() {
                    return Ok(Some(candidate));
                }
            }
        }
        Ok(None)
    }

    async fn resolve_method_return_type(
        &self,
        qualified: &str,
        method: &str,
    ) -> Result<Option<ResolvedType>, ResolveError> {
        let Some(_guard) = InFlight::enter(&self.in_flight, name::member(qualified, method)) else {
            return Ok(None);
        };
        let Some(ast) = self.load(qualified).await? else {
            return Ok(None);
        };
        crate::resolve_method_return_type(&ast, self, qualified, method).await
    }

    async fn open_class(
        &self,
        qualified: &str,
        projection: &Projection,
    ) -> Result<Option<ClassProjection>, ResolveError> {
        let key = format!("{qualified} {projection:?}");
        let Some(_guard) = InFlight::enter(&self.in_flight, key) else {
            return Ok(None);
        };
        let Some(ast) = self.load(qualified).await? else {
            return Ok(None);
        };
        crate::project_type(&ast, self, qualified, projection).await
    }

    async fn suggest_import(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        let types = self.walk_types().await?;
        Ok(types
            .into_iter()
            .filter(|qualified| {
                qualified
                    .strip_suffix(name)
                    .is_some_and(|prefix| prefix.is_empty() || prefix.ends_with(['.', '$']))
            })
            .collect())
    }

    fn put_cache(&self, ast: Arc<Ast>) -> bool {
        let path = ast.path().to_owned();
        if !path.starts_with(self.root()) {
            return false;
        }
        if let SourceLayout::Directory { .. } = self.layout {
            self.package_depth
                .lock()
                .get_or_insert_with(|| package_depth(ast.package()));
        }
        if let Some(index) = self.types.lock().as_mut() {
            index.replace(path.clone(), ast.type_names().map(str::to_owned).collect());
        }
        self.asts.write().insert(path, ast);
        true
    }
}

fn package_depth(package: Option<&str>) -> usize {
    package.map_or(0, |package| package.split('.').count())
}

fn java_files(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = BTreeSet::new();
    for root in roots.iter().filter(|root| root.is_dir()) {
        for entry in walkdir::WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
        {
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "java")
            {
                files.insert(entry.into_path());
            }
        }
    }
    files.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn project_search_paths_in_order() {
        let layout = SourceLayout::Project {
            root: PathBuf::from("/p"),
            extra_roots: vec![PathBuf::from("gen")],
        };
        assert_eq!(
            layout.search_paths(),
            vec![
                PathBuf::from("/p/src"),
                PathBuf::from("/p/src/main/java"),
                PathBuf::from("/p/src/debug/java"),
                PathBuf::from("/p/gen"),
            ]
        );
    }

    #[test]
    fn type_index_tracks_replaced_files() {
        let mut index = TypeIndex::default();
        index.replace(PathBuf::from("A.java"), vec!["a.A".into(), "a.A$In".into()]);
        index.replace(PathBuf::from("B.java"), vec!["a.B".into()]);
        index.replace(PathBuf::from("A.java"), vec!["a.A".into(), "a.A$Out".into()]);
        assert_eq!(index.all, vec!["a.A", "a.B", "a.A$Out"]);
    }

    #[test]
    fn in_flight_lookups_are_exclusive() {
        let set = Mutex::new(HashSet::new());
        let guard = InFlight::enter(&set, "a.B#m".into());
        assert!(guard.is_some());
        assert!(InFlight::enter(&set, "a.B#m".into()).is_none());
        drop(guard);
        assert!(InFlight::enter(&set, "a.B#m".into()).is_some());
    }
}
