use std::path::PathBuf;

use njast_syntax::SyntaxError;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("couldn't resolve class {0}")]
    UnresolvedType(String),
    #[error("couldn't resolve identifier `{0}`")]
    UnresolvedIdentifier(String),
    #[error("couldn't resolve method `{method}`")]
    UnresolvedMethod {
        method: String,
        #[source]
        source: Option<Box<ResolveError>>,
    },
    #[error("`super` is not an expression")]
    InvalidSuper,
    #[error("{0} nodes have no type")]
    NotEvaluable(&'static str),
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: SyntaxError,
    },
    #[error("resolver error: {0}")]
    Resolver(String),
}

impl ResolveError {
    pub(crate) fn method(method: impl Into<String>, source: Option<ResolveError>) -> Self {
        ResolveError::UnresolvedMethod {
            method: method.into(),
            source: source.map(Box::new),
        }
    }
}
