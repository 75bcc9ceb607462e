//! Blocks and statements.

use njast_core::Position;

use super::types::TypeContext;
use super::Parser;
use crate::error::{PResult, SyntaxErrorKind};
use crate::keywords;
use crate::language_level::JavaFeature;
use crate::nodes::{Catch, ForControl, NodeId, NodeKind, SwitchLabel, VarDefs, VarRole};

impl<'a, 'p> Parser<'a, 'p> {
    pub(super) fn parse_block(&mut self) -> PResult<NodeId> {
        let start = self.tok.prepare();
        self.parse_block_with(start, None)
    }

    /// `{ statements }`. `modifiers` is the `static` of a static initializer.
    pub(super) fn parse_block_with(
        &mut self,
        start: Position,
        modifiers: Option<NodeId>,
    ) -> PResult<NodeId> {
        let mut statements = Vec::new();
        if self.tok.expect_char('{')? {
            self.local_classes.push(Vec::new());
            let parsed = self.parse_statements(|p| p.tok.peek_char_is('}'));
            self.local_classes.pop();
            statements = parsed?;
            self.tok.expect_char('}')?;
        }
        self.tok.clear_javadoc();
        let kind = NodeKind::Block {
            modifiers,
            statements,
        };
        Ok(self.alloc(kind, self.span_from(start)))
    }

    fn parse_statements(&mut self, at_end: impl Fn(&mut Self) -> bool) -> PResult<Vec<NodeId>> {
        let mut out = Vec::new();
        loop {
            if self.tok.is_eof() || at_end(self) {
                return Ok(out);
            }
            let before = self.tok.offset();
            if let Some(statement) = self.parse_block_statement()? {
                out.push(statement);
            }
            if self.tok.offset() == before {
                self.tok.raise("statement")?;
                self.ensure_progress(before);
            }
        }
    }

    /// A statement, local variable declaration or local class. `None` for
    /// the empty statement and for input that starts none of these.
    pub(super) fn parse_block_statement(&mut self) -> PResult<Option<NodeId>> {
        let start = self.tok.prepare();
        let javadoc = self.tok.take_javadoc();

        if self.tok.peek_char_is('{') {
            return self.parse_block().map(Some);
        }
        if self.tok.read_char(';') {
            return Ok(None);
        }
        if let Some(word) = self.tok.peek_identifier() {
            if keywords::is_control(word) && (word != "synchronized" || self.at_synchronized()) {
                return self.parse_control(start, word);
            }
        }

        let local_class = self.lookahead(|p| {
            p.parse_modifiers()?;
            Ok(p.at_type_keyword())
        })?;
        if local_class {
            let modifiers = self.parse_modifiers()?;
            return self
                .parse_type_decl_rest(start, javadoc, modifiers, true)
                .map(Some);
        }

        if self.at_local_var_decl()? {
            let group = self.parse_var_group(start, VarRole::Local)?;
            return Ok(Some(group));
        }

        let labeled = self.lookahead(|p| {
            Ok(p.read_name().is_some() && p.tok.read_char(':') && !p.tok.peek_char_is(':'))
        })?;
        if labeled {
            let label = self.read_name().unwrap_or_default().to_owned();
            self.tok.read_char(':');
            let statement = self.parse_required_statement()?;
            let kind = NodeKind::Labeled { label, statement };
            return Ok(Some(self.alloc(kind, self.span_from(start))));
        }

        let Some(expr) = self.parse_expression()? else {
            return Ok(None);
        };
        self.tok.expect_char(';')?;
        Ok(Some(expr))
    }

    fn at_synchronized(&mut self) -> bool {
        let checkpoint = self.tok.save();
        self.tok.read_identifier();
        let found = self.tok.peek_char_is('(');
        self.tok.restore(checkpoint);
        found
    }

    /// `[modifiers] Type name` followed by something only a declaration
    /// can continue with.
    fn at_local_var_decl(&mut self) -> PResult<bool> {
        self.lookahead(|p| {
            p.parse_modifiers()?;
            if p.parse_type(TypeContext::DECLARATION)?.is_none() || p.read_name().is_none() {
                return Ok(false);
            }
            if p.tok.peek_str("==") {
                return Ok(false);
            }
            Ok(matches!(
                p.tok.peek_char(),
                Some('=' | ';' | ',' | '[' | ':')
            ))
        })
    }

    /// `[modifiers] Type declarators`, terminated by `;` for locals.
    fn parse_var_group(&mut self, start: Position, role: VarRole) -> PResult<NodeId> {
        let modifiers = self.parse_modifiers()?;
        let ty = match self.parse_type(TypeContext::DECLARATION)? {
            Some(ty) => ty,
            None => self.missing("type")?,
        };
        let defs = self.parse_declarators(ty, None, role)?;
        if role == VarRole::Local {
            self.tok.expect_char(';')?;
        }
        let group = VarDefs {
            role,
            javadoc: None,
            modifiers,
            ty,
            defs,
        };
        Ok(self.alloc(NodeKind::VarDefs(group), self.span_from(start)))
    }

    /// A statement in a position that requires one. `;` yields an empty
    /// block.
    fn parse_required_statement(&mut self) -> PResult<NodeId> {
        let start = self.tok.prepare();
        let before = self.tok.offset();
        if !self.tok.read_char(';') {
            if let Some(statement) = self.parse_block_statement()? {
                return Ok(statement);
            }
            if self.tok.offset() == before {
                return self.missing("statement");
            }
        }
        let kind = NodeKind::Block {
            modifiers: None,
            statements: Vec::new(),
        };
        Ok(self.alloc(kind, self.span_from(start)))
    }

    fn parse_condition(&mut self) -> PResult<NodeId> {
        self.tok.expect_char('(')?;
        let condition = self.parse_required_expression()?;
        self.tok.expect_char(')')?;
        Ok(condition)
    }

    fn parse_control(&mut self, start: Position, word: &str) -> PResult<Option<NodeId>> {
        self.tok.read_identifier();
        let kind = match word {
            "if" => {
                let condition = self.parse_condition()?;
                let then = self.parse_required_statement()?;
                let otherwise = if self.tok.read_keyword("else") {
                    Some(self.parse_required_statement()?)
                } else {
                    None
                };
                NodeKind::If {
                    condition,
                    then,
                    otherwise,
                }
            }
            "while" => {
                let condition = self.parse_condition()?;
                let body = self.parse_required_statement()?;
                NodeKind::While {
                    condition,
                    body,
                    is_do: false,
                }
            }
            "do" => {
                let body = self.parse_required_statement()?;
                self.tok.expect_keyword("while")?;
                let condition = self.parse_condition()?;
                self.tok.expect_char(';')?;
                NodeKind::While {
                    condition,
                    body,
                    is_do: true,
                }
            }
            "for" => self.parse_for()?,
            "switch" => self.parse_switch()?,
            "try" => self.parse_try()?,
            "assert" => {
                let condition = self.parse_required_expression()?;
                let message = if self.tok.read_char(':') {
                    Some(self.parse_required_expression()?)
                } else {
                    None
                };
                self.tok.expect_char(';')?;
                NodeKind::Assert { condition, message }
            }
            "break" | "continue" => {
                let label = self.read_name().map(str::to_owned);
                self.tok.expect_char(';')?;
                if word == "break" {
                    NodeKind::Break { label }
                } else {
                    NodeKind::Continue { label }
                }
            }
            "return" => {
                let value = if self.tok.peek_char_is(';') || self.tok.peek_char_is('}') {
                    None
                } else {
                    self.parse_expression()?
                };
                self.tok.expect_char(';')?;
                NodeKind::Return { value }
            }
            "throw" => {
                let value = self.parse_required_expression()?;
                self.tok.expect_char(';')?;
                NodeKind::Throw { value }
            }
            "synchronized" => {
                let lock = self.parse_condition()?;
                let body = self.parse_block()?;
                NodeKind::Synchronized { lock, body }
            }
            _ => {
                let error = SyntaxErrorKind::Unexpected;
                let error = self.tok.error(error, format!("`{word}` without a matching statement"));
                self.tok.record(error)?;
                return Ok(None);
            }
        };
        Ok(Some(self.alloc(kind, self.span_from(start))))
    }

    fn parse_for(&mut self) -> PResult<NodeKind> {
        self.tok.expect_char('(')?;
        let enhanced = self.lookahead(|p| {
            p.parse_modifiers()?;
            Ok(p.parse_type(TypeContext::DECLARATION)?.is_some()
                && p.read_name().is_some()
                && p.tok.peek_char_is(':'))
        })?;

        let control = if enhanced {
            let var_start = self.tok.prepare();
            let var = self.parse_var_group(var_start, VarRole::ForEach)?;
            self.tok.expect_char(':')?;
            let iterable = self.parse_required_expression()?;
            ForControl::Enhanced { var, iterable }
        } else {
            let init = if self.tok.peek_char_is(';') {
                Vec::new()
            } else if self.at_local_var_decl()? {
                let init_start = self.tok.prepare();
                vec![self.parse_var_group(init_start, VarRole::ForInit)?]
            } else {
                self.parse_expression_list()?
            };
            self.tok.expect_char(';')?;
            let condition = if self.tok.peek_char_is(';') {
                None
            } else {
                Some(self.parse_required_expression()?)
            };
            self.tok.expect_char(';')?;
            let update = if self.tok.peek_char_is(')') {
                Vec::new()
            } else {
                self.parse_expression_list()?
            };
            ForControl::Classic {
                init,
                condition,
                update,
            }
        };
        self.tok.expect_char(')')?;
        let body = self.parse_required_statement()?;
        Ok(NodeKind::For { control, body })
    }

    fn parse_expression_list(&mut self) -> PResult<Vec<NodeId>> {
        let mut out = Vec::new();
        loop {
            out.push(self.parse_required_expression()?);
            if !self.tok.read_char(',') {
                return Ok(out);
            }
        }
    }

    fn parse_switch(&mut self) -> PResult<NodeKind> {
        let selector = self.parse_condition()?;
        let mut groups = Vec::new();
        if self.tok.expect_char('{')? {
            loop {
                if self.tok.is_eof() || self.tok.peek_char_is('}') {
                    break;
                }
                let before = self.tok.offset();
                let group_start = self.tok.prepare();
                let mut labels = Vec::new();
                loop {
                    if self.tok.read_keyword("case") {
                        let value = self.parse_required_expression()?;
                        self.tok.expect_char(':')?;
                        labels.push(SwitchLabel::Case(value));
                    } else if self.tok.read_keyword("default") {
                        self.tok.expect_char(':')?;
                        labels.push(SwitchLabel::Default);
                    } else {
                        break;
                    }
                }
                if labels.is_empty() {
                    self.tok.raise("`case` or `default`")?;
                    self.ensure_progress(before);
                    continue;
                }
                let statements = self.parse_statements(|p| {
                    p.tok.peek_char_is('}') || p.tok.peek_keyword("case") || p.tok.peek_keyword("default")
                })?;
                let kind = NodeKind::SwitchGroup { labels, statements };
                groups.push(self.alloc(kind, self.span_from(group_start)));
            }
            self.tok.expect_char('}')?;
        }
        Ok(NodeKind::Switch { selector, groups })
    }

    fn parse_try(&mut self) -> PResult<NodeKind> {
        let mut resources = Vec::new();
        if self.tok.peek_char_is('(') {
            self.tok.check_feature(JavaFeature::TryWithResources)?;
            self.tok.read_char('(');
            loop {
                if self.tok.peek_char_is(')') || self.tok.is_eof() {
                    break;
                }
                let resource_start = self.tok.prepare();
                resources.push(self.parse_var_group(resource_start, VarRole::Resource)?);
                if !self.tok.read_char(';') {
                    break;
                }
            }
            self.tok.expect_char(')')?;
        }

        let body = self.parse_block()?;

        let mut catches = Vec::new();
        while self.tok.peek_keyword("catch") {
            catches.push(self.parse_catch()?);
        }
        let finally = if self.tok.read_keyword("finally") {
            Some(self.parse_block()?)
        } else {
            None
        };
        if resources.is_empty() && catches.is_empty() && finally.is_none() {
            self.tok.raise("`catch` or `finally`")?;
        }
        Ok(NodeKind::Try {
            resources,
            body,
            catches,
            finally,
        })
    }

    fn parse_catch(&mut self) -> PResult<NodeId> {
        let start = self.tok.prepare();
        self.tok.read_keyword("catch");
        self.tok.expect_char('(')?;
        let modifiers = self.parse_modifiers()?;
        let mut types = Vec::new();
        loop {
            match self.parse_type(TypeContext::SUPERTYPE)? {
                Some(ty) => types.push(ty),
                None => {
                    self.tok.raise("exception type")?;
                    break;
                }
            }
            if !self.tok.read_char('|') {
                break;
            }
            self.tok.check_feature(JavaFeature::MultiCatch)?;
        }
        let name_start = self.tok.prepare();
        let name = self.expect_name()?.unwrap_or_default().to_owned();
        let name_span = self.span_from(name_start);
        self.tok.expect_char(')')?;
        let body = self.parse_block()?;
        let catch = Catch {
            modifiers,
            types,
            name,
            name_span,
            body,
        };
        Ok(self.alloc(NodeKind::Catch(catch), self.span_from(start)))
    }
}
