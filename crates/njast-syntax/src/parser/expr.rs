//! Expressions.
//!
//! Binary operators are not ranked: an operand chain is kept flat in a
//! single [`NodeKind::Infix`] node, which is all type evaluation needs.

use njast_core::Position;

use super::types::TypeContext;
use super::Parser;
use crate::error::PResult;
use crate::keywords;
use crate::literals::LiteralKind;
use crate::nodes::{Creator, NodeId, NodeKind};

impl<'a, 'p> Parser<'a, 'p> {
    /// An expression, including assignments. `None` if the input does not
    /// start one.
    pub(super) fn parse_expression(&mut self) -> PResult<Option<NodeId>> {
        let start = self.tok.prepare();
        let Some(left) = self.parse_ternary()? else {
            return Ok(None);
        };
        let Some(op) = self.tok.read_assignment() else {
            return Ok(Some(left));
        };
        let right = self.parse_required_expression()?;
        let kind = NodeKind::Assignment { left, op, right };
        Ok(Some(self.alloc(kind, self.span_from(start))))
    }

    pub(super) fn parse_required_expression(&mut self) -> PResult<NodeId> {
        match self.parse_expression()? {
            Some(expr) => Ok(expr),
            None => self.missing("expression"),
        }
    }

    pub(super) fn parse_ternary(&mut self) -> PResult<Option<NodeId>> {
        let start = self.tok.prepare();
        let Some(condition) = self.parse_binary()? else {
            return Ok(None);
        };
        if !self.tok.read_char('?') {
            return Ok(Some(condition));
        }
        let then = self.parse_required_expression()?;
        self.tok.expect_char(':')?;
        let otherwise = match self.parse_ternary()? {
            Some(otherwise) => otherwise,
            None => self.missing("expression")?,
        };
        let kind = NodeKind::Ternary {
            condition,
            then,
            otherwise,
        };
        Ok(Some(self.alloc(kind, self.span_from(start))))
    }

    fn parse_binary(&mut self) -> PResult<Option<NodeId>> {
        let start = self.tok.prepare();
        let Some(left) = self.parse_instanceof()? else {
            return Ok(None);
        };
        let mut rest = Vec::new();
        loop {
            if self.tok.peek_str("->") {
                return Err(self.tok.unsupported("lambda expressions"));
            }
            let Some(op) = self.tok.read_infix_op() else {
                break;
            };
            let right = match self.parse_instanceof()? {
                Some(right) => right,
                None => self.missing("expression")?,
            };
            rest.push((op, right));
        }
        if rest.is_empty() {
            return Ok(Some(left));
        }
        let kind = NodeKind::Infix { left, rest };
        Ok(Some(self.alloc(kind, self.span_from(start))))
    }

    fn parse_instanceof(&mut self) -> PResult<Option<NodeId>> {
        let start = self.tok.prepare();
        let Some(mut expr) = self.parse_unary()? else {
            return Ok(None);
        };
        while self.tok.read_keyword("instanceof") {
            let ty = match self.parse_type(TypeContext::DECLARATION)? {
                Some(ty) => ty,
                None => self.missing("type")?,
            };
            let kind = NodeKind::InstanceOf { expr, ty };
            expr = self.alloc(kind, self.span_from(start));
        }
        Ok(Some(expr))
    }

    fn parse_unary(&mut self) -> PResult<Option<NodeId>> {
        let start = self.tok.prepare();
        if let Some(op) = self.tok.read_prefix_op() {
            let expr = match self.parse_unary()? {
                Some(expr) => expr,
                None => self.missing("expression")?,
            };
            let kind = NodeKind::Prefix { op, expr };
            return Ok(Some(self.alloc(kind, self.span_from(start))));
        }

        if self.tok.peek_char_is('(') {
            if self.at_lambda()? {
                return Err(self.tok.unsupported("lambda expressions"));
            }
            if let Some(cast) = self.parse_cast(start)? {
                return Ok(Some(cast));
            }
        }

        let Some(primary) = self.parse_primary()? else {
            return Ok(None);
        };
        let expr = self.parse_selectors(start, primary)?;
        // Postfix operators do not change the operand's type.
        self.tok.read_postfix_op();
        Ok(Some(expr))
    }

    fn at_lambda(&mut self) -> PResult<bool> {
        self.lookahead(|p| Ok(p.tok.skip_balanced('(', ')') && p.tok.peek_str("->")))
    }

    fn parse_cast(&mut self, start: Position) -> PResult<Option<NodeId>> {
        let is_cast = self.lookahead(|p| {
            p.tok.read_char('(');
            let Some(ty) = p.parse_type(TypeContext::DECLARATION)? else {
                return Ok(false);
            };
            let primitive = matches!(p.kind_of(ty), NodeKind::BasicType { dims: 0, .. });
            Ok(p.tok.read_char(')') && p.at_cast_operand(primitive))
        })?;
        if !is_cast {
            return Ok(None);
        }

        self.tok.read_char('(');
        let ty = match self.parse_type(TypeContext::DECLARATION)? {
            Some(ty) => ty,
            None => self.missing("type")?,
        };
        self.tok.expect_char(')')?;
        let expr = match self.parse_unary()? {
            Some(expr) => expr,
            None => self.missing("expression")?,
        };
        let kind = NodeKind::Cast { ty, expr };
        Ok(Some(self.alloc(kind, self.span_from(start))))
    }

    /// Whether the input after `(Type)` can only be read as a cast operand.
    /// Signs continue a cast only when the type is primitive.
    fn at_cast_operand(&mut self, primitive: bool) -> bool {
        if let Some(word) = self.tok.peek_identifier() {
            return !keywords::is_reserved(word) || keywords::starts_expression(word);
        }
        match self.tok.peek_char() {
            Some(c) if c.is_ascii_digit() => true,
            Some('"' | '\'' | '(' | '!' | '~') => true,
            Some('+' | '-' | '.') => primitive,
            _ => false,
        }
    }

    fn parse_primary(&mut self) -> PResult<Option<NodeId>> {
        let start = self.tok.prepare();

        if let Some(literal) = self.parse_literal()? {
            return Ok(Some(self.alloc(literal, self.span_from(start))));
        }

        if self.tok.read_char('(') {
            let expr = self.parse_required_expression()?;
            self.tok.expect_char(')')?;
            let kind = NodeKind::Paren { expr };
            return Ok(Some(self.alloc(kind, self.span_from(start))));
        }

        if self.tok.peek_char_is('<') {
            return Err(self
                .tok
                .unsupported("explicit type arguments without a receiver"));
        }

        let Some(word) = self.tok.peek_identifier() else {
            return Ok(None);
        };

        match word {
            "this" | "super" => {
                self.tok.read_identifier();
                let kind = if self.tok.peek_char_is('(') {
                    NodeKind::MethodCall {
                        name: word.to_owned(),
                        type_args: None,
                        args: self.parse_arguments()?,
                        receiver: None,
                    }
                } else {
                    NodeKind::Identifier {
                        name: word.to_owned(),
                        receiver: None,
                    }
                };
                return Ok(Some(self.alloc(kind, self.span_from(start))));
            }
            "new" => return self.parse_creator(start, None).map(Some),
            _ => {}
        }

        if let Some(literal) = self.parse_class_literal(start)? {
            return Ok(Some(literal));
        }

        let Some(name) = self.read_name() else {
            return Ok(None);
        };
        let kind = if self.tok.peek_char_is('(') {
            NodeKind::MethodCall {
                name: name.to_owned(),
                type_args: None,
                args: self.parse_arguments()?,
                receiver: None,
            }
        } else {
            NodeKind::Identifier {
                name: name.to_owned(),
                receiver: None,
            }
        };
        Ok(Some(self.alloc(kind, self.span_from(start))))
    }

    fn parse_literal(&mut self) -> PResult<Option<NodeKind>> {
        let literal = |kind, value: &str| NodeKind::Literal {
            kind,
            value: value.to_owned(),
        };
        if let Some((kind, text)) = self.tok.read_number()? {
            return Ok(Some(literal(kind, text)));
        }
        if let Some(text) = self.tok.read_string_literal()? {
            return Ok(Some(literal(LiteralKind::String, text)));
        }
        if let Some(text) = self.tok.read_char_literal()? {
            return Ok(Some(literal(LiteralKind::Char, text)));
        }
        for (word, kind) in [
            ("true", LiteralKind::Boolean),
            ("false", LiteralKind::Boolean),
            ("null", LiteralKind::Null),
        ] {
            if self.tok.read_keyword(word) {
                return Ok(Some(literal(kind, word)));
            }
        }
        Ok(None)
    }

    /// `Type.class`, including primitives, arrays and `void`.
    fn parse_class_literal(&mut self, start: Position) -> PResult<Option<NodeId>> {
        let found = self.lookahead(|p| {
            Ok(p.parse_type(TypeContext::CLASS_LITERAL)?.is_some()
                && p.tok.read_char('.')
                && p.tok.read_keyword("class"))
        })?;
        if !found {
            return Ok(None);
        }
        let ty = match self.parse_type(TypeContext::CLASS_LITERAL)? {
            Some(ty) => ty,
            None => self.missing("type")?,
        };
        self.tok.read_char('.');
        self.tok.read_keyword("class");
        let kind = NodeKind::ClassLiteral { ty };
        Ok(Some(self.alloc(kind, self.span_from(start))))
    }

    /// Field accesses, method calls, array accesses and qualified creators
    /// following `primary`. Each element's receiver is the one before it.
    fn parse_selectors(&mut self, start: Position, primary: NodeId) -> PResult<NodeId> {
        let mut chain = Vec::new();
        let mut previous = primary;
        loop {
            if self.tok.peek_str("::") {
                return Err(self.tok.unsupported("method references"));
            }
            let element = if self.tok.peek_char_is('[') {
                let at = self.tok.prepare();
                self.tok.read_char('[');
                let index = self.parse_required_expression()?;
                self.tok.expect_char(']')?;
                let kind = NodeKind::ArrayAccess {
                    index,
                    receiver: Some(previous),
                };
                self.alloc(kind, self.span_from(at))
            } else if self.tok.read_char('.') {
                let at = self.tok.prepare();
                match self.parse_selector(at, previous)? {
                    Some(element) => element,
                    None => {
                        self.tok.raise("identifier")?;
                        break;
                    }
                }
            } else {
                break;
            };
            chain.push(element);
            previous = element;
        }

        if chain.is_empty() {
            return Ok(primary);
        }
        let kind = NodeKind::Selector { primary, chain };
        Ok(self.alloc(kind, self.span_from(start)))
    }

    /// The element after a `.`.
    fn parse_selector(&mut self, at: Position, receiver: NodeId) -> PResult<Option<NodeId>> {
        if self.tok.peek_char_is('<') {
            let type_args = Some(self.parse_type_arguments(TypeContext::EXPLICIT_ARGS)?);
            let name = self.expect_name()?.unwrap_or_default().to_owned();
            let args = self.parse_arguments()?;
            let kind = NodeKind::MethodCall {
                name,
                type_args,
                args,
                receiver: Some(receiver),
            };
            return Ok(Some(self.alloc(kind, self.span_from(at))));
        }
        if self.tok.peek_keyword("new") {
            return self.parse_creator(at, Some(receiver)).map(Some);
        }
        for word in ["this", "super"] {
            if self.tok.read_keyword(word) {
                let kind = NodeKind::Identifier {
                    name: word.to_owned(),
                    receiver: Some(receiver),
                };
                return Ok(Some(self.alloc(kind, self.span_from(at))));
            }
        }
        let Some(name) = self.read_name() else {
            return Ok(None);
        };
        let kind = if self.tok.peek_char_is('(') {
            NodeKind::MethodCall {
                name: name.to_owned(),
                type_args: None,
                args: self.parse_arguments()?,
                receiver: Some(receiver),
            }
        } else {
            NodeKind::Identifier {
                name: name.to_owned(),
                receiver: Some(receiver),
            }
        };
        Ok(Some(self.alloc(kind, self.span_from(at))))
    }

    /// `new` and what follows it: an array creation, or a class instance
    /// creation with an optional anonymous body.
    fn parse_creator(&mut self, start: Position, receiver: Option<NodeId>) -> PResult<NodeId> {
        self.tok.read_keyword("new");
        let type_args = if self.tok.peek_char_is('<') {
            Some(self.parse_type_arguments(TypeContext::EXPLICIT_ARGS)?)
        } else {
            None
        };
        let ty = match self.parse_type(TypeContext::CREATOR)? {
            Some(ty) => ty,
            None => self.missing("type")?,
        };

        let mut creator = Creator {
            type_args,
            ty,
            args: None,
            dim_exprs: Vec::new(),
            dims: 0,
            initializer: None,
            body: None,
            receiver,
        };

        if self.tok.peek_char_is('[') {
            while self.tok.read_char('[') {
                if !self.tok.read_char(']') {
                    creator.dim_exprs.push(self.parse_required_expression()?);
                    self.tok.expect_char(']')?;
                }
                creator.dims += 1;
            }
            if self.tok.peek_char_is('{') {
                creator.initializer = Some(self.parse_array_initializer()?);
            }
        } else if self.tok.peek_char_is('(') {
            creator.args = Some(self.parse_arguments()?);
            if self.tok.peek_char_is('{') {
                creator.body = Some(self.parse_anonymous_body()?);
            }
        } else {
            self.tok.raise("`(` or `[`")?;
        }

        Ok(self.alloc(NodeKind::Creator(creator), self.span_from(start)))
    }

    /// `(args)`.
    pub(super) fn parse_arguments(&mut self) -> PResult<Vec<NodeId>> {
        let mut args = Vec::new();
        if !self.tok.expect_char('(')? {
            return Ok(args);
        }
        if !self.tok.peek_char_is(')') {
            loop {
                args.push(self.parse_required_expression()?);
                if !self.tok.read_char(',') {
                    break;
                }
            }
        }
        self.tok.expect_char(')')?;
        Ok(args)
    }

    fn parse_array_initializer(&mut self) -> PResult<NodeId> {
        let start = self.tok.prepare();
        self.tok.read_char('{');
        let mut elements = Vec::new();
        while !self.tok.peek_char_is('}') && !self.tok.is_eof() {
            match self.parse_variable_initializer()? {
                Some(element) => elements.push(element),
                None => {
                    self.tok.raise("array element")?;
                    break;
                }
            }
            if !self.tok.read_char(',') {
                break;
            }
        }
        self.tok.expect_char('}')?;
        let kind = NodeKind::ArrayInitializer { elements };
        Ok(self.alloc(kind, self.span_from(start)))
    }

    pub(super) fn parse_variable_initializer(&mut self) -> PResult<Option<NodeId>> {
        if self.tok.peek_char_is('{') {
            return self.parse_array_initializer().map(Some);
        }
        self.parse_expression()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use crate::nodes::NodeKind;
    use crate::operators::InfixOp;
    use crate::{parse, Ast, ParseOptions, SyntaxErrorKind};

    fn parse_init(expr: &str) -> (Ast, crate::NodeId) {
        let source = format!("class T {{ Object x = {expr}; }}");
        let ast = parse(PathBuf::from("T.java"), &source, &ParseOptions::default()).unwrap();
        let def = ast.qualified("T#x").unwrap();
        let NodeKind::VarDef(def) = ast.kind(def) else {
            unreachable!()
        };
        let init = def.init.unwrap();
        (ast, init)
    }

    #[test]
    fn casts_and_parens() {
        let (ast, init) = parse_init("(String) o");
        assert_eq!(ast.kind(init).name(), "Cast");

        let (ast, init) = parse_init("(a) + b");
        let NodeKind::Infix { left, rest } = ast.kind(init) else {
            panic!("expected infix, got {}", ast.kind(init).name());
        };
        assert_eq!(ast.kind(*left).name(), "Paren");
        assert_eq!(rest[0].0, InfixOp::Add);

        let (ast, init) = parse_init("(int) -x");
        assert_eq!(ast.kind(init).name(), "Cast");
    }

    #[test]
    fn instanceof_binds_before_boolean_operators() {
        let (ast, init) = parse_init("o instanceof String && ready");
        let NodeKind::Infix { left, rest } = ast.kind(init) else {
            panic!("expected infix");
        };
        assert_eq!(ast.kind(*left).name(), "InstanceOf");
        assert_eq!(rest.len(), 1);
    }

    #[test]
    fn selector_chain_links_receivers() {
        let (ast, init) = parse_init("a.b().c[0]");
        let NodeKind::Selector { primary, chain } = ast.kind(init) else {
            panic!("expected selector");
        };
        assert_eq!(chain.len(), 3);
        assert_eq!(ast.kind(chain[0]).receiver(), Some(*primary));
        assert_eq!(ast.kind(chain[1]).receiver(), Some(chain[0]));
        assert_eq!(ast.kind(chain[2]).name(), "ArrayAccess");
        assert_eq!(ast.parent(chain[2]), Some(init));
    }

    #[test]
    fn class_literals() {
        let (ast, init) = parse_init("int[].class");
        assert_eq!(ast.kind(init).name(), "ClassLiteral");
        let (ast, init) = parse_init("java.util.List.class");
        let NodeKind::ClassLiteral { ty } = ast.kind(init) else {
            panic!("expected class literal");
        };
        assert_eq!(ast.kind(*ty).type_name().as_deref(), Some("java.util.List"));
    }

    #[test]
    fn ternary_and_assignment_nest() {
        let (ast, init) = parse_init("y = flag ? 1 : 2");
        let NodeKind::Assignment { right, .. } = ast.kind(init) else {
            panic!("expected assignment");
        };
        assert_eq!(ast.kind(*right).name(), "Ternary");
    }

    #[test]
    fn array_creators() {
        let (ast, init) = parse_init("new int[3][]");
        let NodeKind::Creator(creator) = ast.kind(init) else {
            panic!("expected creator");
        };
        assert_eq!(creator.dims, 2);
        assert_eq!(creator.dim_exprs.len(), 1);

        let (ast, init) = parse_init("new String[] { \"a\", \"b\", }");
        let NodeKind::Creator(creator) = ast.kind(init) else {
            panic!("expected creator");
        };
        let NodeKind::ArrayInitializer { elements } = ast.kind(creator.initializer.unwrap()) else {
            panic!("expected initializer");
        };
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn lambdas_and_method_references_are_unsupported() {
        for expr in ["(a, b) -> a", "x -> x", "String::valueOf"] {
            let source = format!("class T {{ Object x = {expr}; }}");
            let err = parse(PathBuf::from("T.java"), &source, &ParseOptions::lenient()).unwrap_err();
            assert_eq!(err.kind, SyntaxErrorKind::Unsupported, "{expr}");
        }
    }
}
