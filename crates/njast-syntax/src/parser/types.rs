//! Type references, type arguments and array dimensions.

use super::Parser;
use crate::error::{PResult, SyntaxErrorKind};
use crate::keywords;
use crate::language_level::JavaFeature;
use crate::nodes::{NodeId, NodeKind, TypeSegment, WildcardBoundKind};

/// Where a type is being read; decides which forms are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct TypeContext {
    void: bool,
    type_args: bool,
    wildcards: bool,
    diamond: bool,
    dims: bool,
}

impl TypeContext {
    /// Fields, locals, parameters, bounds and casts.
    pub(super) const DECLARATION: Self = Self {
        void: false,
        type_args: true,
        wildcards: true,
        diamond: false,
        dims: true,
    };
    pub(super) const RETURN: Self = Self {
        void: true,
        ..Self::DECLARATION
    };
    /// `extends`, `implements` and `throws` clauses.
    pub(super) const SUPERTYPE: Self = Self {
        wildcards: false,
        dims: false,
        ..Self::DECLARATION
    };
    /// The type after `new`; dimensions are read by the creator.
    pub(super) const CREATOR: Self = Self {
        wildcards: false,
        diamond: true,
        dims: false,
        ..Self::DECLARATION
    };
    pub(super) const CLASS_LITERAL: Self = Self {
        void: true,
        type_args: false,
        ..Self::DECLARATION
    };
    /// Explicit type arguments of a method call or constructor.
    pub(super) const EXPLICIT_ARGS: Self = Self {
        wildcards: false,
        ..Self::DECLARATION
    };

    fn arguments(self) -> Self {
        Self {
            diamond: self.diamond,
            wildcards: self.wildcards,
            ..Self::DECLARATION
        }
    }
}

impl<'a, 'p> Parser<'a, 'p> {
    /// Reads a type, or returns `None` without consuming anything if the
    /// input does not start one.
    pub(super) fn parse_type(&mut self, context: TypeContext) -> PResult<Option<NodeId>> {
        let start = self.tok.prepare();
        let Some(word) = self.tok.peek_identifier() else {
            return Ok(None);
        };

        let kind = if keywords::is_primitive(word) || (context.void && word == "void") {
            self.tok.read_identifier();
            let dims = if context.dims { self.read_dims() } else { 0 };
            NodeKind::BasicType {
                name: word.to_owned(),
                dims,
            }
        } else if keywords::is_reserved(word) {
            return Ok(None);
        } else {
            let mut segments = Vec::new();
            loop {
                let segment_start = self.tok.prepare();
                let Some(name) = self.read_name() else {
                    self.tok.raise("type name")?;
                    break;
                };
                let name_span = self.span_from(segment_start);
                let type_args = if context.type_args && self.tok.peek_char_is('<') {
                    Some(self.parse_type_arguments(context.arguments())?)
                } else {
                    None
                };
                segments.push(TypeSegment {
                    name: name.to_owned(),
                    name_span,
                    type_args,
                });
                if !self.at_segment_separator() {
                    break;
                }
                self.tok.read_char('.');
            }
            let dims = if context.dims { self.read_dims() } else { 0 };
            NodeKind::ReferenceType { segments, dims }
        };
        Ok(Some(self.alloc(kind, self.span_from(start))))
    }

    /// `.` followed by a plain identifier, so `Foo.class` and `Foo.this`
    /// are not read as types.
    fn at_segment_separator(&mut self) -> bool {
        let checkpoint = self.tok.save();
        let found = self.tok.read_char('.') && self.read_name().is_some();
        self.tok.restore(checkpoint);
        found
    }

    /// `<...>`. An empty list is the diamond.
    pub(super) fn parse_type_arguments(&mut self, context: TypeContext) -> PResult<NodeId> {
        let start = self.tok.prepare();
        self.tok.read_char('<');
        let mut args = Vec::new();

        if self.tok.read_char('>') {
            if context.diamond {
                self.tok.check_feature(JavaFeature::Diamond)?;
            } else {
                let error = self
                    .tok
                    .error(SyntaxErrorKind::Unexpected, "type arguments expected");
                self.tok.record(error)?;
            }
            let kind = NodeKind::TypeArguments { args };
            return Ok(self.alloc(kind, self.span_from(start)));
        }

        loop {
            let arg_start = self.tok.prepare();
            if self.tok.read_char('?') {
                if !context.wildcards {
                    let error = self
                        .tok
                        .error(SyntaxErrorKind::Unexpected, "wildcard is not allowed here");
                    self.tok.record(error)?;
                }
                let bound_kind = if self.tok.read_keyword("extends") {
                    Some(WildcardBoundKind::Extends)
                } else if self.tok.read_keyword("super") {
                    Some(WildcardBoundKind::Super)
                } else {
                    None
                };
                let bound = match bound_kind {
                    Some(kind) => match self.parse_type(TypeContext::DECLARATION)? {
                        Some(ty) => Some((kind, ty)),
                        None => Some((kind, self.missing("wildcard bound")?)),
                    },
                    None => None,
                };
                let kind = NodeKind::Wildcard { bound };
                args.push(self.alloc(kind, self.span_from(arg_start)));
            } else {
                match self.parse_type(TypeContext::DECLARATION)? {
                    Some(ty) => args.push(ty),
                    None => {
                        self.tok.raise("type argument")?;
                        break;
                    }
                }
            }
            if !self.tok.read_char(',') {
                break;
            }
        }
        self.tok.expect_char('>')?;
        let kind = NodeKind::TypeArguments { args };
        Ok(self.alloc(kind, self.span_from(start)))
    }

    /// Counts `[]` pairs; leaves `[expr]` alone.
    pub(super) fn read_dims(&mut self) -> u32 {
        let mut dims = 0;
        loop {
            let checkpoint = self.tok.save();
            if self.tok.read_char('[') && self.tok.read_char(']') {
                dims += 1;
            } else {
                self.tok.restore(checkpoint);
                return dims;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use crate::nodes::NodeKind;
    use crate::{parse, JavaLevel, ParseOptions, SyntaxErrorKind};

    fn field_type(text: &str, options: &ParseOptions) -> String {
        let source = format!("class T {{ {text} }}");
        let ast = parse(PathBuf::from("T.java"), &source, options).unwrap();
        let field = ast
            .ids()
            .find(|&id| matches!(ast.kind(id), NodeKind::VarDefs(_)))
            .unwrap();
        let NodeKind::VarDefs(group) = ast.kind(field) else {
            unreachable!()
        };
        let ty = ast.kind(group.ty);
        format!("{}{}", ty.type_name().unwrap(), "[]".repeat(ty.type_dims() as usize))
    }

    #[test]
    fn qualified_generic_types() {
        let options = ParseOptions::default();
        assert_eq!(
            field_type("Map.Entry<String, List<int[]>>[] x;", &options),
            "Map.Entry[]"
        );
        assert_eq!(
            field_type(
                "FullAst<? extends Object, Imported>.NestedClass<FullInterface> o;",
                &options
            ),
            "FullAst.NestedClass"
        );
        assert_eq!(field_type("int[][] grid;", &options), "int[][]");
    }

    #[test]
    fn diamond_depends_on_level() {
        let source = "class T { java.util.List<String> x = new java.util.ArrayList<>(); }";
        parse(PathBuf::from("T.java"), source, &ParseOptions::default()).unwrap();

        let jdk6 = ParseOptions {
            level: JavaLevel::JDK6,
            ..ParseOptions::default()
        };
        let err = parse(PathBuf::from("T.java"), source, &jdk6).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Level);
    }

    #[test]
    fn wildcards_are_rejected_after_new() {
        let source = "class T { Object x = new ArrayList<?>(); }";
        let err = parse(PathBuf::from("T.java"), source, &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Unexpected);
    }
}
