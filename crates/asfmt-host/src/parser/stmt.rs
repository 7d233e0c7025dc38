//! Statement and declaration parsing

use crate::ast::*;
use crate::diagnostic::error_codes;
use crate::parser::Parser;
use crate::token::TokenKind;

/// Modifier words accepted in front of class and interface members
const MEMBER_MODIFIERS: &[&str] = &[
    "static",
    "public",
    "private",
    "protected",
    "readonly",
    "abstract",
    "declare",
    "override",
];

/// Modifier words accepted in front of constructor parameters
const PARAM_MODIFIERS: &[&str] = &["public", "private", "protected", "readonly"];

impl Parser {
    /// Parse a statement or declaration
    pub(super) fn parse_statement(&mut self) -> Result<Stmt, ()> {
        let start = self.peek().span.start;

        match self.peek().kind {
            TokenKind::At => {
                self.error_with_code(
                    error_codes::DECORATOR_NOT_ALLOWED,
                    "Decorators are not supported",
                );
                Err(())
            }
            TokenKind::Export => self.parse_export(),
            TokenKind::Import => Ok(Stmt::Import(self.parse_import()?)),
            TokenKind::Let | TokenKind::Const | TokenKind::Var
                if !(self.check(TokenKind::Const) && self.peek_at(1).kind == TokenKind::Enum) =>
            {
                let mut var = self.parse_var_decl(Modifiers::at(start))?;
                self.consume_semicolon()?;
                var.span = self.span_from(start);
                Ok(Stmt::Var(var))
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break | TokenKind::Continue => self.parse_jump(),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::LeftBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::Empty(self.span_from(start)))
            }
            _ if self.check_word("declare") && self.starts_declaration(1) => {
                self.advance();
                let mut modifiers = Modifiers::at(start);
                modifiers.declare = true;
                modifiers.end = self.peek().span.start;
                self.parse_declaration(modifiers, start)
            }
            _ if self.starts_declaration(0) => {
                self.parse_declaration(Modifiers::at(start), start)
            }
            _ => {
                let expr = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Stmt::Expr(ExprStmt {
                    expr,
                    span: self.span_from(start),
                }))
            }
        }
    }

    /// Whether the token `n` ahead begins a declaration
    fn starts_declaration(&self, n: usize) -> bool {
        let token = self.peek_at(n);
        let next = self.peek_at(n + 1);
        match token.kind {
            TokenKind::Let
            | TokenKind::Const
            | TokenKind::Var
            | TokenKind::Function
            | TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Enum => true,
            TokenKind::Identifier => match token.lexeme.as_str() {
                "abstract" => next.kind == TokenKind::Class && !next.newline_before,
                "namespace" | "module" | "type" => {
                    next.kind == TokenKind::Identifier && !next.newline_before
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Parse a declaration after its `export`/`declare` modifiers
    fn parse_declaration(&mut self, modifiers: Modifiers, start: usize) -> Result<Stmt, ()> {
        match self.peek().kind {
            TokenKind::Let | TokenKind::Var => {
                let mut var = self.parse_var_decl(modifiers)?;
                self.consume_semicolon()?;
                var.span = self.span_from(start);
                Ok(Stmt::Var(var))
            }
            TokenKind::Const if self.peek_at(1).kind != TokenKind::Enum => {
                let mut var = self.parse_var_decl(modifiers)?;
                self.consume_semicolon()?;
                var.span = self.span_from(start);
                Ok(Stmt::Var(var))
            }
            TokenKind::Const | TokenKind::Enum => self.parse_enum(modifiers, start),
            TokenKind::Function => self.parse_function(modifiers, start),
            TokenKind::Class => self.parse_class(modifiers, start),
            TokenKind::Interface => self.parse_interface(modifiers, start),
            TokenKind::Identifier if self.check_word("abstract") => {
                self.parse_class(modifiers, start)
            }
            TokenKind::Identifier if self.check_word("namespace") || self.check_word("module") => {
                self.parse_namespace(modifiers, start)
            }
            TokenKind::Identifier if self.check_word("type") => {
                self.parse_type_alias(modifiers, start)
            }
            _ => {
                self.error("Expected a declaration");
                Err(())
            }
        }
    }

    /// Parse `let/const/var` declarators without the terminator
    pub(super) fn parse_var_decl(&mut self, modifiers: Modifiers) -> Result<VarStmt, ()> {
        let start = self.peek().span.start;
        let kind = match self.advance().kind {
            TokenKind::Let => VarKind::Let,
            TokenKind::Const => VarKind::Const,
            _ => VarKind::Var,
        };

        let mut declarators = Vec::new();
        loop {
            let name = self.consume_identifier("a variable name")?;
            let definite = self.match_token(TokenKind::Bang);
            let type_ann = if self.match_token(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let init = if self.match_token(TokenKind::Equal) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarators.push(VarDeclarator {
                name,
                definite,
                type_ann,
                init,
            });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        Ok(VarStmt {
            modifiers,
            kind,
            declarators,
            span: self.span_from(start),
        })
    }

    fn parse_function(&mut self, modifiers: Modifiers, start: usize) -> Result<Stmt, ()> {
        self.consume(TokenKind::Function, "Expected 'function'")?;
        let name = self.consume_identifier("a function name")?;
        let type_params = self.parse_type_params()?;
        let params = self.parse_params()?;
        let return_type = if self.match_token(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = if self.check(TokenKind::LeftBrace) {
            Some(self.parse_block()?)
        } else {
            self.consume_semicolon()?;
            None
        };

        Ok(Stmt::Function(FunctionDecl {
            modifiers,
            name,
            type_params,
            params,
            return_type,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_class(&mut self, modifiers: Modifiers, start: usize) -> Result<Stmt, ()> {
        let is_abstract = self.match_word("abstract");
        self.consume(TokenKind::Class, "Expected 'class'")?;
        let name = self.consume_identifier("a class name")?;
        let type_params = self.parse_type_params()?;

        let extends = if self.match_token(TokenKind::Extends) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let mut implements = Vec::new();
        if self.match_token(TokenKind::Implements) {
            loop {
                implements.push(self.parse_type()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        let members = self.parse_members("class")?;

        Ok(Stmt::Class(ClassDecl {
            modifiers,
            is_abstract,
            name,
            type_params,
            extends,
            implements,
            members,
            span: self.span_from(start),
        }))
    }

    fn parse_interface(&mut self, modifiers: Modifiers, start: usize) -> Result<Stmt, ()> {
        self.consume(TokenKind::Interface, "Expected 'interface'")?;
        let name = self.consume_identifier("an interface name")?;
        let type_params = self.parse_type_params()?;

        let mut extends = Vec::new();
        if self.match_token(TokenKind::Extends) {
            loop {
                extends.push(self.parse_type()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        let members = self.parse_members("interface")?;

        Ok(Stmt::Interface(InterfaceDecl {
            modifiers,
            name,
            type_params,
            extends,
            members,
            span: self.span_from(start),
        }))
    }

    /// Parse a `{ ... }` member list of a class or interface
    fn parse_members(&mut self, owner: &str) -> Result<Vec<Member>, ()> {
        self.consume(TokenKind::LeftBrace, &format!("Expected '{{' to open {} body", owner))?;
        let mut members = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if self.match_token(TokenKind::Semicolon) {
                continue;
            }
            members.push(self.parse_member()?);
        }

        self.consume(TokenKind::RightBrace, &format!("Expected '}}' to close {} body", owner))?;
        Ok(members)
    }

    fn parse_member(&mut self) -> Result<Member, ()> {
        let start = self.peek().span.start;

        if self.check(TokenKind::At) {
            self.error_with_code(
                error_codes::DECORATOR_NOT_ALLOWED,
                "Decorators are not supported",
            );
            return Err(());
        }

        let mut modifiers = Vec::new();
        while MEMBER_MODIFIERS.iter().any(|m| self.check_word(m)) && self.next_is_member_name(1) {
            modifiers.push(self.advance().lexeme.clone());
        }

        if self.check(TokenKind::LeftBracket) {
            let kind = self.parse_index_signature()?;
            self.consume_member_terminator()?;
            return Ok(Member {
                modifiers,
                kind,
                span: self.span_from(start),
            });
        }

        let accessor = if (self.check_word("get") || self.check_word("set")) && self.next_is_member_name(1)
        {
            let token = self.advance();
            Some(if token.lexeme == "get" {
                Accessor::Get
            } else {
                Accessor::Set
            })
        } else {
            None
        };

        if accessor.is_none() && self.check_word("constructor") && self.peek_at(1).kind == TokenKind::LeftParen {
            self.advance();
            let params = self.parse_params()?;
            let body = self.parse_optional_body()?;
            return Ok(Member {
                modifiers,
                kind: MemberKind::Constructor { params, body },
                span: self.span_from(start),
            });
        }

        let name = self.parse_member_name()?;
        let optional = self.match_token(TokenKind::Question);

        let kind = if self.check(TokenKind::LeftParen) || self.check(TokenKind::Less) {
            let type_params = self.parse_type_params()?;
            let params = self.parse_params()?;
            let return_type = if self.match_token(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let body = self.parse_optional_body()?;
            MemberKind::Method {
                name,
                accessor,
                optional,
                type_params,
                params,
                return_type,
                body,
            }
        } else {
            let definite = self.match_token(TokenKind::Bang);
            let type_ann = if self.match_token(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let init = if self.match_token(TokenKind::Equal) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            self.consume_member_terminator()?;
            MemberKind::Field {
                name,
                optional,
                definite,
                type_ann,
                init,
            }
        };

        Ok(Member {
            modifiers,
            kind,
            span: self.span_from(start),
        })
    }

    /// Whether the token `n` ahead can name a member (so the current word is a modifier)
    fn next_is_member_name(&self, n: usize) -> bool {
        let token = self.peek_at(n);
        matches!(
            token.kind,
            TokenKind::Identifier | TokenKind::String | TokenKind::Number | TokenKind::LeftBracket
        ) || token.kind.is_keyword()
    }

    fn parse_member_name(&mut self) -> Result<String, ()> {
        let token = self.peek();
        if matches!(token.kind, TokenKind::Identifier | TokenKind::String | TokenKind::Number)
            || token.kind.is_keyword()
        {
            Ok(self.advance().lexeme.clone())
        } else {
            self.error("Expected a member name");
            Err(())
        }
    }

    fn parse_index_signature(&mut self) -> Result<MemberKind, ()> {
        self.consume(TokenKind::LeftBracket, "Expected '['")?;
        let key = self.consume_identifier("an index parameter name")?;
        self.consume(TokenKind::Colon, "Expected ':' after index parameter")?;
        let key_type = self.parse_type()?;
        self.consume(TokenKind::RightBracket, "Expected ']'")?;
        self.consume(TokenKind::Colon, "Expected ':' after index signature")?;
        let value_type = self.parse_type()?;
        Ok(MemberKind::Index {
            key,
            key_type,
            value_type,
        })
    }

    /// Method body, or a terminator for signatures
    fn parse_optional_body(&mut self) -> Result<Option<Block>, ()> {
        if self.check(TokenKind::LeftBrace) {
            Ok(Some(self.parse_block()?))
        } else {
            self.consume_member_terminator()?;
            Ok(None)
        }
    }

    fn consume_member_terminator(&mut self) -> Result<(), ()> {
        if self.match_token(TokenKind::Comma) {
            return Ok(());
        }
        self.consume_semicolon()
    }

    fn parse_namespace(&mut self, modifiers: Modifiers, start: usize) -> Result<Stmt, ()> {
        self.advance(); // namespace | module
        let mut name = vec![self.consume_identifier("a namespace name")?];
        while self.match_token(TokenKind::Dot) {
            name.push(self.consume_identifier("a namespace name")?);
        }

        self.consume(TokenKind::LeftBrace, "Expected '{' to open namespace body")?;
        let body = self.parse_statements_until_brace()?;
        self.consume(TokenKind::RightBrace, "Expected '}' to close namespace body")?;

        Ok(Stmt::Namespace(NamespaceDecl {
            modifiers,
            name,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_enum(&mut self, modifiers: Modifiers, start: usize) -> Result<Stmt, ()> {
        let is_const = self.match_token(TokenKind::Const);
        self.consume(TokenKind::Enum, "Expected 'enum'")?;
        let name = self.consume_identifier("an enum name")?;
        self.consume(TokenKind::LeftBrace, "Expected '{' to open enum body")?;

        let mut members = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            let member_start = self.peek().span.start;
            let name = self.parse_member_name()?;
            let init = if self.match_token(TokenKind::Equal) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            members.push(EnumMember {
                name,
                init,
                span: self.span_from(member_start),
            });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        self.consume(TokenKind::RightBrace, "Expected '}' to close enum body")?;

        Ok(Stmt::Enum(EnumDecl {
            modifiers,
            is_const,
            name,
            members,
            span: self.span_from(start),
        }))
    }

    fn parse_type_alias(&mut self, modifiers: Modifiers, start: usize) -> Result<Stmt, ()> {
        self.advance(); // type
        let name = self.consume_identifier("a type name")?;
        let type_params = self.parse_type_params()?;
        self.consume(TokenKind::Equal, "Expected '=' in type alias")?;
        let ty = self.parse_type()?;
        self.consume_semicolon()?;

        Ok(Stmt::TypeAlias(TypeAliasDecl {
            modifiers,
            name,
            type_params,
            ty,
            span: self.span_from(start),
        }))
    }

    /// Parse an import declaration
    ///
    /// Syntax: `import "m";`, `import d, { a as b } from "m";`, `import * as ns from "m";`
    fn parse_import(&mut self) -> Result<ImportDecl, ()> {
        let start = self.consume(TokenKind::Import, "Expected 'import'")?.span.start;

        let mut default = None;
        let mut namespace = None;
        let mut named = None;

        if !self.check(TokenKind::String) {
            if self.check(TokenKind::Identifier) && !self.check_word("from") {
                default = Some(self.consume_identifier("an import name")?);
                self.match_token(TokenKind::Comma);
            }
            if self.match_token(TokenKind::Star) {
                if !self.match_word("as") {
                    self.error("Expected 'as' after '*'");
                    return Err(());
                }
                namespace = Some(self.consume_identifier("a namespace alias")?);
            } else if self.check(TokenKind::LeftBrace) {
                named = Some(self.parse_specifiers()?);
            }
            if !self.match_word("from") {
                self.error("Expected 'from'");
                return Err(());
            }
        }

        let source = self.consume(TokenKind::String, "Expected module path")?.lexeme.clone();
        self.consume_semicolon()?;

        Ok(ImportDecl {
            default,
            namespace,
            named,
            source,
            span: self.span_from(start),
        })
    }

    /// Parse `{ a, b as c }`
    fn parse_specifiers(&mut self) -> Result<Vec<Specifier>, ()> {
        self.consume(TokenKind::LeftBrace, "Expected '{'")?;
        let mut specifiers = Vec::new();
        while !self.check(TokenKind::RightBrace) {
            let name = self.consume_property_name("a binding name")?;
            let alias = if self.match_word("as") {
                Some(self.consume_property_name("an alias")?)
            } else {
                None
            };
            specifiers.push(Specifier { name, alias });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightBrace, "Expected '}'")?;
        Ok(specifiers)
    }

    /// Parse everything that starts with `export`
    fn parse_export(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::Export, "Expected 'export'")?.span.start;

        if self.check(TokenKind::LeftBrace) {
            let specifiers = self.parse_specifiers()?;
            let source = if self.match_word("from") {
                Some(self.consume(TokenKind::String, "Expected module path")?.lexeme.clone())
            } else {
                None
            };
            self.consume_semicolon()?;
            return Ok(Stmt::Export(ExportDecl {
                kind: ExportKind::Named { specifiers, source },
                span: self.span_from(start),
            }));
        }

        if self.match_token(TokenKind::Star) {
            let alias = if self.match_word("as") {
                Some(self.consume_identifier("a namespace alias")?)
            } else {
                None
            };
            if !self.match_word("from") {
                self.error("Expected 'from'");
                return Err(());
            }
            let source = self.consume(TokenKind::String, "Expected module path")?.lexeme.clone();
            self.consume_semicolon()?;
            return Ok(Stmt::Export(ExportDecl {
                kind: ExportKind::All { alias, source },
                span: self.span_from(start),
            }));
        }

        let mut modifiers = Modifiers::at(start);
        modifiers.export = true;

        if self.match_word("default") {
            modifiers.default = true;
            let is_declaration = matches!(self.peek().kind, TokenKind::Function | TokenKind::Class)
                || (self.check_word("abstract") && self.peek_at(1).kind == TokenKind::Class);
            if !is_declaration {
                let expr = self.parse_assignment()?;
                self.consume_semicolon()?;
                return Ok(Stmt::Export(ExportDecl {
                    kind: ExportKind::Default(expr),
                    span: self.span_from(start),
                }));
            }
        } else if self.check_word("declare") && self.starts_declaration(1) {
            self.advance();
            modifiers.declare = true;
        }

        modifiers.end = self.peek().span.start;
        self.parse_declaration(modifiers, start)
    }

    fn parse_if(&mut self) -> Result<Stmt, ()> {
        let start = self.advance().span.start;
        self.consume(TokenKind::LeftParen, "Expected '(' after 'if'")?;
        let cond = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after condition")?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.match_token(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If(IfStmt {
            cond,
            then_branch,
            else_branch,
            span: self.span_from(start),
        }))
    }

    fn parse_while(&mut self) -> Result<Stmt, ()> {
        let start = self.advance().span.start;
        self.consume(TokenKind::LeftParen, "Expected '(' after 'while'")?;
        let cond = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after condition")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::While(WhileStmt {
            cond,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_do_while(&mut self) -> Result<Stmt, ()> {
        let start = self.advance().span.start;
        let body = Box::new(self.parse_statement()?);
        self.consume(TokenKind::While, "Expected 'while' after do body")?;
        self.consume(TokenKind::LeftParen, "Expected '(' after 'while'")?;
        let cond = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after condition")?;
        self.match_token(TokenKind::Semicolon);
        Ok(Stmt::DoWhile(DoWhileStmt {
            body,
            cond,
            span: self.span_from(start),
        }))
    }

    fn parse_for(&mut self) -> Result<Stmt, ()> {
        let start = self.advance().span.start;
        self.consume(TokenKind::LeftParen, "Expected '(' after 'for'")?;

        let is_var = matches!(
            self.peek().kind,
            TokenKind::Let | TokenKind::Const | TokenKind::Var
        );

        if is_var && self.peek_at(1).kind == TokenKind::Identifier && self.peek_at(2).is_word("of") {
            let kind = match self.advance().kind {
                TokenKind::Let => VarKind::Let,
                TokenKind::Const => VarKind::Const,
                _ => VarKind::Var,
            };
            let name = self.consume_identifier("a loop variable")?;
            self.advance(); // of
            let iterable = self.parse_expression()?;
            self.consume(TokenKind::RightParen, "Expected ')' after for-of header")?;
            let body = Box::new(self.parse_statement()?);
            return Ok(Stmt::ForOf(ForOfStmt {
                kind,
                name,
                iterable,
                body,
                span: self.span_from(start),
            }));
        }

        let init = if self.check(TokenKind::Semicolon) {
            None
        } else if is_var {
            let init_start = self.peek().span.start;
            Some(ForInit::Var(self.parse_var_decl(Modifiers::at(init_start))?))
        } else {
            Some(ForInit::Expr(self.parse_expression()?))
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after for initializer")?;

        let cond = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after for condition")?;

        let update = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::RightParen, "Expected ')' after for clauses")?;

        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For(ForStmt {
            init,
            cond,
            update,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_return(&mut self) -> Result<Stmt, ()> {
        let start = self.advance().span.start;
        let value = if self.check(TokenKind::Semicolon)
            || self.check(TokenKind::RightBrace)
            || self.is_at_end()
            || self.peek().newline_before
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon()?;
        Ok(Stmt::Return(ReturnStmt {
            value,
            span: self.span_from(start),
        }))
    }

    fn parse_jump(&mut self) -> Result<Stmt, ()> {
        let keyword = self.advance();
        let is_break = keyword.kind == TokenKind::Break;
        let start = keyword.span.start;
        let label = if self.check(TokenKind::Identifier) && !self.peek().newline_before {
            Some(self.consume_identifier("a label")?)
        } else {
            None
        };
        self.consume_semicolon()?;
        let jump = JumpStmt {
            label,
            span: self.span_from(start),
        };
        Ok(if is_break {
            Stmt::Break(jump)
        } else {
            Stmt::Continue(jump)
        })
    }

    fn parse_throw(&mut self) -> Result<Stmt, ()> {
        let start = self.advance().span.start;
        let value = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Stmt::Throw(ThrowStmt {
            value,
            span: self.span_from(start),
        }))
    }

    /// Parse a `{ ... }` block
    pub(super) fn parse_block(&mut self) -> Result<Block, ()> {
        let start = self.consume(TokenKind::LeftBrace, "Expected '{'")?.span.start;
        let statements = self.parse_statements_until_brace()?;
        self.consume(TokenKind::RightBrace, "Expected '}' to close block")?;
        Ok(Block {
            statements,
            span: self.span_from(start),
        })
    }

    fn parse_statements_until_brace(&mut self) -> Result<Vec<Stmt>, ()> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    /// Parse a parenthesized parameter list
    pub(super) fn parse_params(&mut self) -> Result<Vec<Param>, ()> {
        self.consume(TokenKind::LeftParen, "Expected '(' to open parameters")?;
        let mut params = Vec::new();

        while !self.check(TokenKind::RightParen) {
            let mut modifiers = Vec::new();
            while PARAM_MODIFIERS.iter().any(|m| self.check_word(m))
                && self.peek_at(1).kind == TokenKind::Identifier
            {
                modifiers.push(self.advance().lexeme.clone());
            }
            let rest = self.match_token(TokenKind::Ellipsis);
            let name = if self.check(TokenKind::This) {
                let token = self.advance();
                Identifier {
                    name: token.lexeme.clone(),
                    span: token.span,
                }
            } else {
                self.consume_identifier("a parameter name")?
            };
            let optional = self.match_token(TokenKind::Question);
            let type_ann = if self.match_token(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let default = if self.match_token(TokenKind::Equal) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            params.push(Param {
                modifiers,
                rest,
                name,
                optional,
                type_ann,
                default,
            });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        self.consume(TokenKind::RightParen, "Expected ')' to close parameters")?;
        Ok(params)
    }
}

impl Modifiers {
    /// No modifiers, declaration keyword at `offset`
    pub(super) fn at(offset: usize) -> Self {
        Self {
            end: offset,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use rstest::rstest;

    fn parse_ok(source: &str) -> Program {
        let (tokens, _) = Lexer::new(source).tokenize();
        let (program, diagnostics) = Parser::new(tokens, source).parse();
        assert!(diagnostics.is_empty(), "{}: {:?}", source, diagnostics);
        program
    }

    #[rstest]
    #[case("function add(a: i32, b: i32 = 1): i32 { return a + b; }")]
    #[case("export declare function log(msg: string): void;")]
    #[case("abstract class Base<T> extends Parent<T> implements A, B {}")]
    #[case("class P { constructor(public x: i32, private readonly y: i32) {} }")]
    #[case("class G { get value(): i32 { return 1; } set value(v: i32) {} }")]
    #[case("class S { static readonly MAX: i32 = 10; private cache!: Map<string, i32>; }")]
    #[case("interface Shape { area(): f64; readonly name?: string, [key: string]: i32 }")]
    #[case("namespace a.b { export const x = 1; }")]
    #[case("export const enum Color { Red = 1, Green, Blue, }")]
    #[case("type Pair<T = i32> = Array<T> | null;")]
    #[case("import { a, b as c } from './m';")]
    #[case("import d, * as ns from \"m\";")]
    #[case("import './side-effect';")]
    #[case("export { a as default, b } from './m';")]
    #[case("export * as util from './util';")]
    #[case("export default 42;")]
    #[case("for (let i = 0; i < 10; i++) {}")]
    #[case("for (const item of items) sum += item;")]
    #[case("do { x--; } while (x > 0)")]
    #[case("while (true) { if (done) break; else continue; }")]
    fn test_parses(#[case] source: &str) {
        parse_ok(source);
    }

    #[test]
    fn test_member_modifiers_and_names() {
        let program = parse_ok("class A { static static: i32; readonly get: i32; }");
        let Stmt::Class(class) = &program.items[0] else {
            panic!("expected class");
        };
        assert_eq!(class.members[0].modifiers, vec!["static".to_string()]);
        assert!(matches!(&class.members[0].kind, MemberKind::Field { name, .. } if name == "static"));
        assert!(matches!(&class.members[1].kind, MemberKind::Field { name, .. } if name == "get"));
    }

    #[test]
    fn test_member_spans_cover_terminator() {
        let source = "class A {\n  x: i32;\n  foo(): void {}\n}";
        let program = parse_ok(source);
        let Stmt::Class(class) = &program.items[0] else {
            panic!("expected class");
        };
        assert_eq!(class.members[0].span.text(source), "x: i32;");
        assert_eq!(class.members[1].span.text(source), "foo(): void {}");
        assert_eq!(class.span.text(source), source);
    }

    #[test]
    fn test_contextual_keywords_as_identifiers() {
        let program = parse_ok("let type = 1;\nnamespace = 2;\ndeclare(3);");
        assert_eq!(program.items.len(), 3);
    }
}
