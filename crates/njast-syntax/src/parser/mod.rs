//! Recursive-descent parser producing an [`Ast`].
//!
//! Ambiguous constructs (casts, local declarations, class literals, member
//! kinds) are decided by [`Parser::lookahead`], which runs a trial parse and always
//! rewinds the tokenizer, the arena and the registry afterwards.

mod decl;
mod expr;
mod stmt;
mod types;

use std::path::PathBuf;

use indexmap::IndexMap;
use njast_core::{name, Position, Span};

use crate::ast::Ast;
use crate::error::{PResult, SyntaxError, SyntaxErrorKind};
use crate::keywords;
use crate::listeners::Publish;
use crate::nodes::{ClassBody, CompilationUnit, Node, NodeId, NodeKind};
use crate::tokenizer::{Checkpoint, Tokenizer};
use crate::ParseOptions;

pub(crate) fn parse(
    path: PathBuf,
    text: &str,
    options: &ParseOptions,
    sink: &mut dyn Publish,
) -> PResult<Ast> {
    let mut parser = Parser::new(text, options, sink);
    let root = if options.partial {
        parser.parse_fragment_unit()?
    } else {
        parser.parse_compilation_unit()?
    };
    let ast = Ast {
        path,
        nodes: parser.nodes,
        root,
        qualifieds: parser.qualifieds,
        errors: parser.tok.into_errors(),
        partial: options.partial,
    };
    tracing::debug!(
        target: "njast.parse",
        path = %ast.path().display(),
        nodes = ast.len(),
        declarations = ast.qualifieds().len(),
        errors = ast.errors().len(),
        "parsed"
    );
    Ok(ast)
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    tok: Checkpoint,
    nodes: usize,
    qualifieds: usize,
    types: usize,
}

pub(crate) struct Parser<'a, 'p> {
    tok: Tokenizer<'a>,
    start: Position,
    nodes: Vec<Node>,
    qualifieds: IndexMap<String, NodeId>,
    package: Option<String>,
    /// Qualified names of the enclosing type bodies, innermost last.
    types: Vec<String>,
    /// Simple names of the local classes declared in each open block.
    local_classes: Vec<Vec<String>>,
    speculating: u32,
    sink: &'p mut dyn Publish,
}

impl<'a, 'p> Parser<'a, 'p> {
    fn new(text: &'a str, options: &ParseOptions, sink: &'p mut dyn Publish) -> Self {
        Self {
            tok: Tokenizer::new(text, options),
            start: Position::new(options.line, options.ch),
            nodes: Vec::new(),
            qualifieds: IndexMap::new(),
            package: None,
            types: Vec::new(),
            local_classes: Vec::new(),
            speculating: 0,
            sink,
        }
    }

    fn parse_compilation_unit(&mut self) -> PResult<NodeId> {
        let root = self.reserve();

        let package_annotations = if self.lookahead(|p| {
            p.parse_annotations()?;
            Ok(p.tok.peek_keyword("package"))
        })? {
            self.parse_annotations()?
        } else {
            Vec::new()
        };

        if self.tok.read_keyword("package") {
            self.package = self.tok.read_qualified();
            if self.package.is_none() {
                self.tok.raise("package name")?;
            }
            self.tok.expect_char(';')?;
        }

        let mut imports = Vec::new();
        loop {
            if self.tok.peek_keyword("import") {
                imports.push(self.parse_import()?);
            } else if !self.tok.read_char(';') {
                break;
            }
        }

        let mut types = Vec::new();
        while !self.tok.is_eof() {
            if self.tok.read_char(';') {
                continue;
            }
            let before = self.tok.offset();
            match self.parse_type_declaration()? {
                Some(id) => types.push(id),
                None => self.tok.raise("type declaration")?,
            }
            self.ensure_progress(before);
        }

        let unit = CompilationUnit {
            package: self.package.clone(),
            package_annotations,
            imports,
            types,
            fragment: None,
        };
        let end = self.tok.prepare().max(self.start);
        self.finish(
            root,
            NodeKind::CompilationUnit(unit),
            Span::new(self.start, end),
        );
        Ok(root)
    }

    /// Parses a source fragment as a sequence of members, falling back to
    /// block statements for anything that does not look like a member.
    fn parse_fragment_unit(&mut self) -> PResult<NodeId> {
        let root = self.reserve();
        let body_id = self.reserve();
        let mut body = ClassBody::default();
        self.local_classes.push(Vec::new());

        while !self.tok.is_eof() {
            if self.tok.read_char(';') {
                continue;
            }
            let before = self.tok.offset();
            if self.at_member_start()? {
                if let Some(member) = self.parse_member()? {
                    self.index_member(&mut body, member);
                }
            } else if let Some(statement) = self.parse_block_statement()? {
                body.members.push(statement);
            }
            if self.tok.offset() == before {
                self.tok.raise("member or statement")?;
                self.ensure_progress(before);
            }
        }
        self.local_classes.pop();

        let end = self.tok.prepare().max(self.start);
        let span = Span::new(self.start, end);
        self.finish(body_id, NodeKind::ClassBody(body), span);
        let unit = CompilationUnit {
            package: None,
            package_annotations: Vec::new(),
            imports: Vec::new(),
            types: Vec::new(),
            fragment: Some(body_id),
        };
        self.finish(root, NodeKind::CompilationUnit(unit), span);
        Ok(root)
    }

    /// Skips a character if nothing was consumed since `before`.
    fn ensure_progress(&mut self, before: usize) {
        if self.tok.offset() == before {
            self.tok.bump();
        }
    }

    // --- arena ---

    /// Allocates a slot to be filled by [`Parser::finish`], so that a node
    /// can be named before its children are parsed.
    fn reserve(&mut self) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node {
            kind: NodeKind::Missing,
            span: Span::default(),
            parent: None,
        });
        id
    }

    fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = self.reserve();
        self.finish(id, kind, span);
        id
    }

    fn finish(&mut self, id: NodeId, kind: NodeKind, span: Span) {
        for child in kind.children() {
            self.nodes[child.index()].parent = Some(id);
        }
        let node = &mut self.nodes[id.index()];
        node.kind = kind;
        node.span = span;
        if self.speculating == 0 {
            self.sink.publish(id, &self.nodes[id.index()]);
        }
    }

    /// A [`NodeKind::Missing`] placeholder at the cursor, after reporting
    /// that `expecting` was not found.
    fn missing(&mut self, expecting: &str) -> PResult<NodeId> {
        self.tok.raise(expecting)?;
        let at = self.tok.prepare();
        Ok(self.alloc(NodeKind::Missing, Span::point(at)))
    }

    /// Span from `start` to the end of the last consumed lexeme.
    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.tok.last_end().max(start))
    }

    fn kind_of(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    // --- speculation ---

    fn mark(&self) -> Mark {
        Mark {
            tok: self.tok.save(),
            nodes: self.nodes.len(),
            qualifieds: self.qualifieds.len(),
            types: self.types.len(),
        }
    }

    fn rewind(&mut self, mark: Mark) {
        self.tok.restore(mark.tok);
        self.nodes.truncate(mark.nodes);
        self.qualifieds.truncate(mark.qualifieds);
        self.types.truncate(mark.types);
    }

    /// Runs `attempt` and rewinds everything it consumed. Recoverable errors
    /// inside the attempt count as a mismatch; unsupported constructs do not.
    fn lookahead(&mut self, attempt: impl FnOnce(&mut Self) -> PResult<bool>) -> PResult<bool> {
        let mark = self.mark();
        self.speculating += 1;
        self.tok.begin_speculation();
        let result = attempt(self);
        self.tok.end_speculation();
        self.speculating -= 1;
        self.rewind(mark);
        match result {
            Ok(matched) => Ok(matched),
            Err(err) if err.is_unsupported() => Err(err),
            Err(_) => Ok(false),
        }
    }

    // --- names ---

    /// Reads an identifier that is not a reserved word.
    fn read_name(&mut self) -> Option<&'a str> {
        match self.tok.peek_identifier() {
            Some(word) if !keywords::is_reserved(word) => self.tok.read_identifier(),
            _ => None,
        }
    }

    fn expect_name(&mut self) -> PResult<Option<&'a str>> {
        if let Some(word) = self.read_name() {
            return Ok(Some(word));
        }
        self.tok.raise("identifier")?;
        Ok(None)
    }

    fn current_type(&self) -> Option<&str> {
        self.types.last().map(String::as_str)
    }

    fn member_name(&self, name: &str) -> Option<String> {
        self.current_type().map(|owner| name::member(owner, name))
    }

    fn type_name(&self, simple: &str) -> String {
        match self.current_type() {
            Some(outer) => name::nested(outer, simple),
            None => name::top_level(self.package.as_deref(), simple),
        }
    }

    /// `Outer$<n>Name` with the smallest unused occurrence index.
    fn local_type_name(&self, simple: &str) -> String {
        let outer = self.current_type().unwrap_or_default();
        (1..)
            .map(|n| format!("{outer}{}{n}{simple}", name::NESTED_SEPARATOR))
            .find(|candidate| !self.qualifieds.contains_key(candidate))
            .unwrap_or_default()
    }

    /// `Outer$<n>` with the smallest unused index.
    fn anonymous_type_name(&self) -> String {
        self.local_type_name("")
    }

    fn register_type(&mut self, qualified: &str, id: NodeId, at: Position) -> PResult<()> {
        if self.qualifieds.contains_key(qualified) {
            return self.tok.record(SyntaxError::new(
                SyntaxErrorKind::Duplicate,
                format!("duplicate type {qualified}"),
                at,
            ));
        }
        self.qualifieds.insert(qualified.to_owned(), id);
        Ok(())
    }

    /// Methods and fields keep the first declaration under a name.
    fn register_member(&mut self, qualified: &str, id: NodeId) {
        self.qualifieds.entry(qualified.to_owned()).or_insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_text(text: &str) -> Ast {
        parse(PathBuf::from("Test.java"), text, &ParseOptions::default(), &mut ()).unwrap()
    }

    #[test]
    fn lookahead_rewinds_arena_and_registry() {
        let mut sink = ();
        let options = ParseOptions::default();
        let mut parser = Parser::new("Foo<Bar> x", &options, &mut sink);
        let matched = parser
            .lookahead(|p| Ok(p.parse_type(types::TypeContext::DECLARATION)?.is_some()))
            .unwrap();
        assert!(matched);
        assert!(parser.nodes.is_empty());
        assert_eq!(parser.tok.offset(), 0);
    }

    #[test]
    fn local_and_anonymous_names_count_up() {
        let ast = parse_text(
            "package a; class Outer { void m() { class L {} new Object() {}; new Object() {}; } \
             void n() { class L {} } }",
        );
        let names: Vec<&str> = ast.type_names().collect();
        assert_eq!(
            names,
            vec!["a.Outer", "a.Outer$1L", "a.Outer$1", "a.Outer$2", "a.Outer$2L"]
        );
    }
}
