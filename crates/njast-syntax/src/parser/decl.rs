//! Imports, annotations, modifiers, type declarations and members.

use njast_core::{name, Position, Span};

use super::types::TypeContext;
use super::Parser;
use crate::error::{PResult, SyntaxError, SyntaxErrorKind};
use crate::nodes::{
    Annotation, ClassBody, EnumConstant, Import, Method, Modifier, Modifiers, NodeId, NodeKind,
    Parameter, TypeDecl, TypeDeclKind, TypeParameter, VarDef, VarDefs, VarRole,
};

impl<'a, 'p> Parser<'a, 'p> {
    pub(super) fn parse_import(&mut self) -> PResult<NodeId> {
        let start = self.tok.prepare();
        self.tok.read_keyword("import");
        let is_static = self.tok.read_keyword("static");
        let path = match self.tok.read_qualified() {
            Some(path) => path,
            None => {
                self.tok.raise("import path")?;
                String::new()
            }
        };
        let is_star = if self.tok.read_char('.') {
            self.tok.expect_char('*')?;
            true
        } else {
            false
        };
        self.tok.expect_char(';')?;
        let import = Import {
            path,
            is_static,
            is_star,
        };
        Ok(self.alloc(NodeKind::Import(import), self.span_from(start)))
    }

    /// `@` not followed by `interface`.
    pub(super) fn at_annotation(&mut self) -> bool {
        self.tok.peek_char_is('@') && !self.at_annotation_decl()
    }

    fn at_annotation_decl(&mut self) -> bool {
        let checkpoint = self.tok.save();
        let found = self.tok.read_char('@') && self.tok.peek_keyword("interface");
        self.tok.restore(checkpoint);
        found
    }

    pub(super) fn at_type_keyword(&mut self) -> bool {
        match self.tok.peek_identifier() {
            Some("class" | "interface" | "enum") => true,
            _ => self.at_annotation_decl(),
        }
    }

    pub(super) fn parse_annotations(&mut self) -> PResult<Vec<NodeId>> {
        let mut out = Vec::new();
        while self.at_annotation() {
            out.push(self.parse_annotation()?);
        }
        Ok(out)
    }

    fn parse_annotation(&mut self) -> PResult<NodeId> {
        let start = self.tok.prepare();
        self.tok.read_char('@');
        let name = match self.tok.read_qualified() {
            Some(name) => name,
            None => {
                self.tok.raise("annotation name")?;
                String::new()
            }
        };

        let mut args = Vec::new();
        if self.tok.read_char('(') {
            let pairs = self.lookahead(|p| {
                Ok(p.read_name().is_some() && p.tok.read_char('=') && !p.tok.peek_char_is('='))
            })?;
            if pairs {
                loop {
                    let pair_start = self.tok.prepare();
                    let Some(key) = self.expect_name()? else {
                        break;
                    };
                    self.tok.expect_char('=')?;
                    let value = self.parse_required_element_value()?;
                    let pair = NodeKind::ElementValuePair {
                        name: key.to_owned(),
                        value,
                    };
                    args.push(self.alloc(pair, self.span_from(pair_start)));
                    if !self.tok.read_char(',') {
                        break;
                    }
                }
            } else if !self.tok.peek_char_is(')') {
                args.push(self.parse_required_element_value()?);
            }
            self.tok.expect_char(')')?;
        }

        let annotation = Annotation { name, args };
        Ok(self.alloc(NodeKind::Annotation(annotation), self.span_from(start)))
    }

    fn parse_required_element_value(&mut self) -> PResult<NodeId> {
        match self.parse_element_value()? {
            Some(value) => Ok(value),
            None => self.missing("element value"),
        }
    }

    fn parse_element_value(&mut self) -> PResult<Option<NodeId>> {
        if self.at_annotation() {
            return self.parse_annotation().map(Some);
        }
        if !self.tok.peek_char_is('{') {
            return self.parse_ternary();
        }
        let start = self.tok.prepare();
        self.tok.read_char('{');
        let mut values = Vec::new();
        while !self.tok.peek_char_is('}') {
            match self.parse_element_value()? {
                Some(value) => values.push(value),
                None => {
                    self.tok.raise("element value")?;
                    break;
                }
            }
            if !self.tok.read_char(',') {
                break;
            }
        }
        self.tok.expect_char('}')?;
        let kind = NodeKind::ElementValueArray { values };
        Ok(Some(self.alloc(kind, self.span_from(start))))
    }

    /// Keyword modifiers and annotations in any order. `synchronized`
    /// followed by `(` starts a statement and is left alone.
    pub(super) fn parse_modifiers(&mut self) -> PResult<Option<NodeId>> {
        let start = self.tok.prepare();
        let mut keywords = Vec::new();
        let mut annotations = Vec::new();
        loop {
            if self.at_annotation() {
                annotations.push(self.parse_annotation()?);
                continue;
            }
            let Some(modifier) = self.tok.peek_identifier().and_then(Modifier::from_keyword) else {
                break;
            };
            if modifier == Modifier::Synchronized {
                let checkpoint = self.tok.save();
                self.tok.read_identifier();
                let statement = self.tok.peek_char_is('(');
                self.tok.restore(checkpoint);
                if statement {
                    break;
                }
            }
            self.tok.read_identifier();
            keywords.push(modifier);
        }
        if keywords.is_empty() && annotations.is_empty() {
            return Ok(None);
        }
        let modifiers = Modifiers {
            keywords,
            annotations,
        };
        Ok(Some(self.alloc(
            NodeKind::Modifiers(modifiers),
            self.span_from(start),
        )))
    }

    /// A top-level type declaration, or `None` if the input does not start
    /// one.
    pub(super) fn parse_type_declaration(&mut self) -> PResult<Option<NodeId>> {
        let start = self.tok.prepare();
        let javadoc = self.tok.take_javadoc();
        let modifiers = self.parse_modifiers()?;
        if !self.at_type_keyword() {
            return Ok(None);
        }
        self.parse_type_decl_rest(start, javadoc, modifiers, false)
            .map(Some)
    }

    pub(super) fn parse_type_decl_rest(
        &mut self,
        start: Position,
        javadoc: Option<String>,
        modifiers: Option<NodeId>,
        local: bool,
    ) -> PResult<NodeId> {
        let kind = if self.tok.read_keyword("class") {
            TypeDeclKind::Class
        } else if self.tok.read_keyword("interface") {
            TypeDeclKind::Interface
        } else if self.tok.read_keyword("enum") {
            TypeDeclKind::Enum
        } else {
            self.tok.read_char('@');
            self.tok.expect_keyword("interface")?;
            TypeDeclKind::Annotation
        };

        let name_start = self.tok.prepare();
        let name = self.expect_name()?.unwrap_or_default().to_owned();
        let name_span = self.span_from(name_start);

        if local {
            if let Some(frame) = self.local_classes.last_mut() {
                if frame.contains(&name) {
                    self.tok.record(SyntaxError::new(
                        SyntaxErrorKind::Duplicate,
                        format!("local class {name} is already defined in this block"),
                        name_start,
                    ))?;
                } else {
                    frame.push(name.clone());
                }
            }
        }

        let qualified = if local {
            self.local_type_name(&name)
        } else {
            self.type_name(&name)
        };
        let id = self.reserve();
        self.register_type(&qualified, id, name_start)?;

        let type_params = if self.tok.peek_char_is('<') {
            Some(self.parse_type_parameters()?)
        } else {
            None
        };

        let mut extends = Vec::new();
        if self.tok.read_keyword("extends") {
            let many = kind == TypeDeclKind::Interface;
            extends = self.parse_type_list(TypeContext::SUPERTYPE, many)?;
        }
        let mut implements = Vec::new();
        if self.tok.read_keyword("implements") {
            implements = self.parse_type_list(TypeContext::SUPERTYPE, true)?;
        }

        self.types.push(qualified.clone());
        let body = if kind == TypeDeclKind::Enum {
            self.parse_enum_body(&qualified)
        } else {
            self.parse_class_body(Some(qualified.clone()))
        };
        self.types.pop();
        let body = body?;

        let decl = TypeDecl {
            kind,
            name,
            name_span,
            qualified,
            javadoc,
            modifiers,
            type_params,
            extends,
            implements,
            body,
            local,
        };
        self.finish(id, NodeKind::TypeDecl(decl), self.span_from(start));
        Ok(id)
    }

    fn parse_type_list(&mut self, context: TypeContext, many: bool) -> PResult<Vec<NodeId>> {
        let mut out = Vec::new();
        loop {
            match self.parse_type(context)? {
                Some(ty) => out.push(ty),
                None => {
                    self.tok.raise("type")?;
                    break;
                }
            }
            if !many || !self.tok.read_char(',') {
                break;
            }
        }
        Ok(out)
    }

    pub(super) fn parse_type_parameters(&mut self) -> PResult<NodeId> {
        let start = self.tok.prepare();
        self.tok.read_char('<');
        let mut params = Vec::new();
        loop {
            let param_start = self.tok.prepare();
            let Some(name) = self.expect_name()? else {
                break;
            };
            let mut bounds = Vec::new();
            if self.tok.read_keyword("extends") {
                loop {
                    match self.parse_type(TypeContext::DECLARATION)? {
                        Some(bound) => bounds.push(bound),
                        None => {
                            self.tok.raise("type bound")?;
                            break;
                        }
                    }
                    if !self.tok.read_char('&') {
                        break;
                    }
                }
            }
            let param = TypeParameter {
                name: name.to_owned(),
                bounds,
            };
            params.push(self.alloc(NodeKind::TypeParameter(param), self.span_from(param_start)));
            if !self.tok.read_char(',') {
                break;
            }
        }
        self.tok.expect_char('>')?;
        let kind = NodeKind::TypeParameters { params };
        Ok(self.alloc(kind, self.span_from(start)))
    }

    /// `{ members }`. The caller pushes `qualified` onto the type stack.
    pub(super) fn parse_class_body(&mut self, qualified: Option<String>) -> PResult<NodeId> {
        let start = self.tok.prepare();
        let id = self.reserve();
        let mut body = ClassBody {
            qualified,
            ..ClassBody::default()
        };
        if self.tok.expect_char('{')? {
            self.parse_members(&mut body)?;
            self.tok.expect_char('}')?;
        }
        self.tok.clear_javadoc();
        self.finish(id, NodeKind::ClassBody(body), self.span_from(start));
        Ok(id)
    }

    fn parse_members(&mut self, body: &mut ClassBody) -> PResult<()> {
        loop {
            if self.tok.is_eof() || self.tok.peek_char_is('}') {
                return Ok(());
            }
            if self.tok.read_char(';') {
                continue;
            }
            let before = self.tok.offset();
            if let Some(member) = self.parse_member()? {
                self.index_member(body, member);
            }
            if self.tok.offset() == before {
                self.tok.raise("member declaration")?;
                self.ensure_progress(before);
            }
        }
    }

    pub(super) fn index_member(&self, body: &mut ClassBody, member: NodeId) {
        match self.kind_of(member) {
            NodeKind::TypeDecl(_) => body.types.push(member),
            NodeKind::Block { .. } => body.blocks.push(member),
            NodeKind::VarDefs(_) => body.fields.push(member),
            NodeKind::Method(_) => body.methods.push(member),
            NodeKind::EnumConstant(_) => body.constants.push(member),
            _ => {}
        }
        body.members.push(member);
    }

    /// Whether the input starts a member rather than a statement.
    pub(super) fn at_member_start(&mut self) -> PResult<bool> {
        self.lookahead(|p| {
            let modifiers = p.parse_modifiers()?;
            if p.at_type_keyword() {
                return Ok(true);
            }
            if p.tok.peek_char_is('{') {
                return Ok(modifiers.is_some());
            }
            if p.tok.peek_char_is('<') {
                return Ok(true);
            }
            if p.at_constructor()? {
                return Ok(true);
            }
            if p.parse_type(TypeContext::RETURN)?.is_none() || p.read_name().is_none() {
                return Ok(false);
            }
            Ok(matches!(
                p.tok.peek_char(),
                Some('(' | '=' | ';' | ',' | '[')
            ))
        })
    }

    /// `Name (params) {` or `Name (params) throws`.
    fn at_constructor(&mut self) -> PResult<bool> {
        self.lookahead(|p| {
            Ok(p.read_name().is_some()
                && p.tok.skip_balanced('(', ')')
                && (p.tok.peek_char_is('{') || p.tok.peek_keyword("throws")))
        })
    }

    pub(super) fn parse_member(&mut self) -> PResult<Option<NodeId>> {
        let start = self.tok.prepare();
        let javadoc = self.tok.take_javadoc();
        if self.tok.peek_char_is('{') {
            return self.parse_block_with(start, None).map(Some);
        }
        let modifiers = self.parse_modifiers()?;
        if self.tok.peek_char_is('{') {
            return self.parse_block_with(start, modifiers).map(Some);
        }
        if self.at_type_keyword() {
            return self
                .parse_type_decl_rest(start, javadoc, modifiers, false)
                .map(Some);
        }

        let type_params = if self.tok.peek_char_is('<') {
            Some(self.parse_type_parameters()?)
        } else {
            None
        };

        let is_constructor = self.lookahead(|p| Ok(p.read_name().is_some() && p.tok.peek_char_is('(')))?;
        if is_constructor {
            let name_start = self.tok.prepare();
            let name = self.read_name().unwrap_or_default();
            let name_span = self.span_from(name_start);
            let header = MemberHeader {
                start,
                javadoc,
                modifiers,
                type_params,
            };
            return self
                .parse_method_rest(header, None, name, name_span)
                .map(Some);
        }

        let Some(ty) = self.parse_type(TypeContext::RETURN)? else {
            if modifiers.is_some() || type_params.is_some() {
                self.tok.raise("type")?;
            }
            return Ok(None);
        };
        let header = MemberHeader {
            start,
            javadoc,
            modifiers,
            type_params,
        };

        let name_start = self.tok.prepare();
        let Some(name) = self.expect_name()? else {
            // An incomplete field keeps its type reachable from the tree.
            let group = VarDefs {
                role: VarRole::Field,
                javadoc: header.javadoc,
                modifiers: header.modifiers,
                ty,
                defs: Vec::new(),
            };
            return Ok(Some(self.alloc(
                NodeKind::VarDefs(group),
                self.span_from(header.start),
            )));
        };
        let name_span = self.span_from(name_start);

        if self.tok.peek_char_is('(') {
            return self
                .parse_method_rest(header, Some(ty), name, name_span)
                .map(Some);
        }

        let defs = self.parse_declarators(ty, Some((name, name_span)), VarRole::Field)?;
        self.tok.expect_char(';')?;
        let group = VarDefs {
            role: VarRole::Field,
            javadoc: header.javadoc,
            modifiers: header.modifiers,
            ty,
            defs,
        };
        Ok(Some(self.alloc(
            NodeKind::VarDefs(group),
            self.span_from(header.start),
        )))
    }

    fn parse_method_rest(
        &mut self,
        header: MemberHeader,
        return_type: Option<NodeId>,
        name: &str,
        name_span: Span,
    ) -> PResult<NodeId> {
        let params = self.parse_formal_parameters()?;
        while self.tok.read_char('[') {
            self.tok.expect_char(']')?;
        }

        let mut throws = Vec::new();
        if self.tok.read_keyword("throws") {
            throws = self.parse_type_list(TypeContext::SUPERTYPE, true)?;
        }

        let default_value = if self.tok.read_keyword("default") {
            Some(self.parse_required_element_value()?)
        } else {
            None
        };

        let body = if self.tok.peek_char_is('{') {
            Some(self.parse_block()?)
        } else {
            self.tok.expect_char(';')?;
            None
        };

        let qualified = return_type.and_then(|_| self.member_name(name));
        let method = Method {
            name: name.to_owned(),
            name_span,
            qualified: qualified.clone(),
            javadoc: header.javadoc,
            modifiers: header.modifiers,
            type_params: header.type_params,
            return_type,
            params,
            throws,
            body,
            default_value,
        };
        let id = self.alloc(NodeKind::Method(method), self.span_from(header.start));
        if let Some(qualified) = qualified {
            self.register_member(&qualified, id);
        }
        Ok(id)
    }

    fn parse_formal_parameters(&mut self) -> PResult<NodeId> {
        let start = self.tok.prepare();
        let mut params = Vec::new();
        if self.tok.expect_char('(')? {
            while !self.tok.peek_char_is(')') && !self.tok.is_eof() {
                match self.parse_parameter()? {
                    Some(param) => params.push(param),
                    None => {
                        self.tok.raise("parameter")?;
                        break;
                    }
                }
                if !self.tok.read_char(',') {
                    break;
                }
            }
            self.tok.expect_char(')')?;
        }
        let kind = NodeKind::FormalParameters { params };
        Ok(self.alloc(kind, self.span_from(start)))
    }

    fn parse_parameter(&mut self) -> PResult<Option<NodeId>> {
        let start = self.tok.prepare();
        let modifiers = self.parse_modifiers()?;
        let Some(ty) = self.parse_type(TypeContext::DECLARATION)? else {
            return Ok(None);
        };
        let varargs = self.tok.read_str("...");
        let name_start = self.tok.prepare();
        let name = self.expect_name()?.unwrap_or_default();
        let name_span = self.span_from(name_start);
        let dims = self.read_dims();
        let param = Parameter {
            modifiers,
            ty,
            name: name.to_owned(),
            name_span,
            varargs,
            dims,
        };
        Ok(Some(self.alloc(
            NodeKind::Parameter(param),
            self.span_from(start),
        )))
    }

    /// One or more `name [dims] [= init]` declarators sharing `ty`. Single
    /// declarators are read for resources and enhanced-for variables.
    pub(super) fn parse_declarators(
        &mut self,
        ty: NodeId,
        first: Option<(&str, Span)>,
        role: VarRole,
    ) -> PResult<Vec<NodeId>> {
        let mut defs = Vec::new();
        let mut pending = first;
        loop {
            let (name, name_span) = match pending.take() {
                Some(first) => first,
                None => {
                    let name_start = self.tok.prepare();
                    let Some(name) = self.expect_name()? else {
                        break;
                    };
                    (name, self.span_from(name_start))
                }
            };
            defs.push(self.parse_var_def(ty, name, name_span, role)?);
            let single = matches!(role, VarRole::Resource | VarRole::ForEach);
            if single || !self.tok.read_char(',') {
                break;
            }
        }
        Ok(defs)
    }

    fn parse_var_def(
        &mut self,
        ty: NodeId,
        name: &str,
        name_span: Span,
        role: VarRole,
    ) -> PResult<NodeId> {
        let dims = self.read_dims();
        let init = if role != VarRole::ForEach
            && !self.tok.peek_str("==")
            && self.tok.read_char('=')
        {
            match self.parse_variable_initializer()? {
                Some(init) => Some(init),
                None => Some(self.missing("initializer")?),
            }
        } else {
            None
        };
        let qualified = match role {
            VarRole::Field => self.member_name(name),
            _ => None,
        };
        let def = VarDef {
            name: name.to_owned(),
            name_span,
            qualified: qualified.clone(),
            ty,
            dims,
            init,
        };
        let id = self.alloc(NodeKind::VarDef(def), self.span_from(name_span.start));
        if let Some(qualified) = qualified {
            self.register_member(&qualified, id);
        }
        Ok(id)
    }

    fn parse_enum_body(&mut self, qualified: &str) -> PResult<NodeId> {
        let start = self.tok.prepare();
        let id = self.reserve();
        let mut body = ClassBody {
            qualified: Some(qualified.to_owned()),
            ..ClassBody::default()
        };
        if self.tok.expect_char('{')? {
            loop {
                if self.tok.peek_char_is(';') || self.tok.peek_char_is('}') || self.tok.is_eof() {
                    break;
                }
                let Some(constant) = self.parse_enum_constant(qualified)? else {
                    break;
                };
                self.index_member(&mut body, constant);
                if !self.tok.read_char(',') {
                    break;
                }
            }
            if self.tok.read_char(';') {
                self.parse_members(&mut body)?;
            }
            self.tok.expect_char('}')?;
        }
        self.tok.clear_javadoc();
        self.finish(id, NodeKind::ClassBody(body), self.span_from(start));
        Ok(id)
    }

    fn parse_enum_constant(&mut self, owner: &str) -> PResult<Option<NodeId>> {
        let start = self.tok.prepare();
        let javadoc = self.tok.take_javadoc();
        let modifiers = self.parse_modifiers()?;
        let name_start = self.tok.prepare();
        let Some(name) = self.expect_name()? else {
            return Ok(None);
        };
        let name_span = self.span_from(name_start);
        let args = if self.tok.peek_char_is('(') {
            Some(self.parse_arguments()?)
        } else {
            None
        };
        let body = if self.tok.peek_char_is('{') {
            Some(self.parse_anonymous_body()?)
        } else {
            None
        };
        let qualified = name::member(owner, name);
        let constant = EnumConstant {
            name: name.to_owned(),
            name_span,
            qualified: qualified.clone(),
            javadoc,
            modifiers,
            args,
            body,
        };
        let id = self.alloc(NodeKind::EnumConstant(constant), self.span_from(start));
        self.register_member(&qualified, id);
        Ok(Some(id))
    }

    /// An anonymous class body, registered as `Outer$<n>`.
    pub(super) fn parse_anonymous_body(&mut self) -> PResult<NodeId> {
        let at = self.tok.prepare();
        let qualified = self.anonymous_type_name();
        self.types.push(qualified.clone());
        let body = self.parse_class_body(Some(qualified.clone()));
        self.types.pop();
        let body = body?;
        self.register_type(&qualified, body, at)?;
        Ok(body)
    }
}

/// What precedes a member's name.
struct MemberHeader {
    start: Position,
    javadoc: Option<String>,
    modifiers: Option<NodeId>,
    type_params: Option<NodeId>,
}
