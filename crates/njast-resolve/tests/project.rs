use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use njast_resolve::{
    evaluate_type, resolve_type, ClassResolver, ResolveError, ResolvedType, ResolverCache,
    TypeOrigin,
};
use njast_syntax::{parse, Ast, NodeId, NodeKind, ParseOptions};

const BORING: &str = include_str!("../../njast-syntax/tests/fixtures/Boring.java");

const FANCIEST: &str = r#"package net.dhleong.njast.util;

public class Fanciest {
    public static String NAME = "fanciest";

    public Fanciest prepare() {
        return this;
    }
}
"#;

const SUBCLASS: &str = r#"package net.dhleong.njast;

import net.dhleong.njast.util.Fanciest;

class Subclass extends Fanciest {
    void run(Boring arg3) {
        prepare();
        new Boring.Fanciest().normalFactory();
        String name = NAME;
    }
}
"#;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let project = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        project.write("net/dhleong/njast/Boring.java", BORING);
        project.write("net/dhleong/njast/util/Fanciest.java", FANCIEST);
        project.write("net/dhleong/njast/Subclass.java", SUBCLASS);
        project
    }

    fn sources(&self) -> PathBuf {
        self.dir.path().join("src").join("main").join("java")
    }

    fn write(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.sources().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, text).unwrap();
        path
    }

    fn parse(&self, relative: &str) -> Arc<Ast> {
        let path = self.sources().join(relative);
        let text = fs::read_to_string(&path).unwrap();
        Arc::new(parse(path, &text, &ParseOptions::default()).unwrap())
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }
}

fn call(ast: &Ast, method: &str) -> NodeId {
    ast.ids()
        .find(|&id| matches!(ast.kind(id), NodeKind::MethodCall { name, .. } if name == method))
        .expect("no such call")
}

#[tokio::test]
async fn inherited_method_from_imported_superclass() {
    let project = Project::new();
    let ast = project.parse("net/dhleong/njast/Subclass.java");
    let cache = ResolverCache::new();
    let resolver = cache.from_ast(&ast);

    let found = evaluate_type(&ast, call(&ast, "prepare"), resolver.as_ref())
        .await
        .unwrap();
    assert_eq!(
        found,
        ResolvedType::new("net.dhleong.njast.util.Fanciest", TypeOrigin::Method)
    );
}

#[tokio::test]
async fn nested_type_of_sibling_file() {
    let project = Project::new();
    let ast = project.parse("net/dhleong/njast/Subclass.java");
    let cache = ResolverCache::new();
    let resolver = cache.from_ast(&ast);

    assert_eq!(
        resolve_type(&ast, resolver.as_ref(), "Boring.Normal").await.unwrap(),
        "net.dhleong.njast.Boring$Normal"
    );
    let found = evaluate_type(&ast, call(&ast, "normalFactory"), resolver.as_ref())
        .await
        .unwrap();
    assert_eq!(
        found,
        ResolvedType::new("net.dhleong.njast.Boring$Normal", TypeOrigin::Method)
    );
}

#[tokio::test]
async fn inherited_field_from_imported_superclass() {
    let project = Project::new();
    let ast = project.parse("net/dhleong/njast/Subclass.java");
    let cache = ResolverCache::new();
    let resolver = cache.from_ast(&ast);

    let name = ast
        .ids()
        .find(|&id| matches!(ast.kind(id), NodeKind::Identifier { name, .. } if name == "NAME"))
        .unwrap();
    let found = evaluate_type(&ast, name, resolver.as_ref()).await.unwrap();
    assert_eq!(
        found,
        ResolvedType::new("java.lang.String", TypeOrigin::Object)
    );
}

#[tokio::test]
async fn resolvers_are_shared_by_project_files() {
    let project = Project::new();
    let cache = ResolverCache::new();
    let a = cache.from_source(&project.sources().join("net/dhleong/njast/Subclass.java"));
    let b = cache.from_source(&project.root().join("src").join("Other.java"));
    assert!(Arc::ptr_eq(&a, &b));
}

#[tokio::test]
async fn suggestions_cover_every_source_root() {
    let project = Project::new();
    let ast = project.parse("net/dhleong/njast/Subclass.java");
    let cache = ResolverCache::new();
    let resolver = cache.from_ast(&ast);

    assert_eq!(
        resolver.suggest_import("Fanciest").await.unwrap(),
        vec![
            "net.dhleong.njast.Boring$Fanciest".to_owned(),
            "net.dhleong.njast.util.Fanciest".to_owned(),
        ]
    );

    // A buffer that is not on disk yet joins the index once cached.
    let extra = project.sources().join("net/dhleong/njast/Extra.java");
    let extra = Arc::new(
        parse(extra, "package net.dhleong.njast; class Extra {}", &ParseOptions::default())
            .unwrap(),
    );
    assert!(resolver.put_cache(extra));
    assert_eq!(
        resolver.suggest_import("Extra").await.unwrap(),
        vec!["net.dhleong.njast.Extra".to_owned()]
    );
}

#[tokio::test]
async fn buffers_outside_the_project_are_refused() {
    let project = Project::new();
    let cache = ResolverCache::new();
    let resolver = cache.from_source(&project.sources().join("net/dhleong/njast/Subclass.java"));
    let stranger = Arc::new(
        parse("/elsewhere/src/A.java", "class A {}", &ParseOptions::default()).unwrap(),
    );
    assert!(!resolver.put_cache(stranger));
}

#[tokio::test]
async fn cyclic_hierarchies_terminate() {
    let project = Project::new();
    project.write(
        "cycle/Ping.java",
        "package cycle; class Ping extends Pong { void run() { missing(); } }",
    );
    project.write("cycle/Pong.java", "package cycle; class Pong extends Ping {}");
    let ast = project.parse("cycle/Ping.java");
    let cache = ResolverCache::new();
    let resolver = cache.from_ast(&ast);

    let err = evaluate_type(&ast, call(&ast, "missing"), resolver.as_ref())
        .await
        .unwrap_err();
    assert!(
        matches!(&err, ResolveError::UnresolvedMethod { method, .. } if method == "missing"),
        "{err}"
    );
}
