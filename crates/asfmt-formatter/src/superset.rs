//! Decorator-aware declaration parser
//!
//! Reads the superset grammar just deeply enough to find every decorator and
//! the declaration it belongs to. Statement bodies, initializers and types
//! are skipped by bracket matching; the strict parser validates them later.
//! Decorators are accepted before top-level statements, namespace members
//! and class or interface members. A decorator anywhere else, or a malformed
//! one, fails the parse.

use asfmt_host::diagnostic::{error_codes, Diagnostic};
use asfmt_host::lexer::Lexer;
use asfmt_host::token::{Token, TokenKind};
use asfmt_host::Span;

/// One `@name` or `@name(args)` occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorator {
    /// Dotted name without the `@`
    pub name: String,
    /// From `@` through the closing `)` or the last name segment
    pub span: Span,
}

/// Declaration with the decorators written before it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Class {
        decorators: Vec<Decorator>,
        name: String,
        members: Vec<Declaration>,
    },
    Interface {
        decorators: Vec<Decorator>,
        name: String,
        members: Vec<Declaration>,
    },
    Namespace {
        decorators: Vec<Decorator>,
        name: String,
        members: Vec<Declaration>,
    },
    Enum {
        decorators: Vec<Decorator>,
        name: String,
    },
    Method {
        decorators: Vec<Decorator>,
        name: String,
    },
    /// Class or interface property, index signature included
    Field {
        decorators: Vec<Decorator>,
        name: String,
    },
    Function {
        decorators: Vec<Decorator>,
        name: String,
    },
    VariableStatement {
        decorators: Vec<Decorator>,
    },
    /// Anything that cannot carry decorators
    Other,
}

impl Declaration {
    pub fn decorators(&self) -> &[Decorator] {
        match self {
            Declaration::Class { decorators, .. }
            | Declaration::Interface { decorators, .. }
            | Declaration::Namespace { decorators, .. }
            | Declaration::Enum { decorators, .. }
            | Declaration::Method { decorators, .. }
            | Declaration::Field { decorators, .. }
            | Declaration::Function { decorators, .. }
            | Declaration::VariableStatement { decorators } => decorators,
            Declaration::Other => &[],
        }
    }

    /// Nested declarations of classes, interfaces and namespaces
    pub fn members(&self) -> &[Declaration] {
        match self {
            Declaration::Class { members, .. }
            | Declaration::Interface { members, .. }
            | Declaration::Namespace { members, .. } => members,
            _ => &[],
        }
    }
}

/// Parsed superset source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceTree {
    pub declarations: Vec<Declaration>,
}

/// Parse `source`, failing on the first misplaced or malformed decorator
pub fn parse(source: &str) -> Result<SourceTree, Diagnostic> {
    let (tokens, diagnostics) = Lexer::new(source).tokenize();
    if let Some(first) = diagnostics.into_iter().next() {
        return Err(first.with_position(source));
    }
    let mut parser = SupersetParser::new(tokens);
    parser
        .parse_program()
        .map_err(|diag| diag.with_position(source))
}

const MODIFIERS: &[&str] = &["export", "declare", "default", "abstract"];

const MEMBER_MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "static",
    "readonly",
    "abstract",
    "declare",
    "override",
    "get",
    "set",
];

type ParseResult<T> = Result<T, Diagnostic>;

struct SupersetParser {
    tokens: Vec<Token>,
    current: usize,
}

impl SupersetParser {
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let end = tokens.last().map_or(0, |t| t.span.end);
            tokens.push(Token::new(TokenKind::Eof, "", Span::new(end, end)));
        }
        Self { tokens, current: 0 }
    }

    fn parse_program(&mut self) -> ParseResult<SourceTree> {
        let declarations = self.parse_statement_list()?;
        if !self.is_at_end() {
            return Err(self.error("Unmatched '}'"));
        }
        Ok(SourceTree { declarations })
    }

    // === Token helpers ===

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &Token {
        let index = (self.current + n).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    fn is_word(token: &Token) -> bool {
        token.kind == TokenKind::Identifier || token.kind.is_keyword()
    }

    fn error(&self, message: &str) -> Diagnostic {
        Diagnostic::error_with_code(error_codes::SYNTAX_ERROR, message, self.peek().span)
    }

    fn misplaced_decorator(&self) -> Diagnostic {
        Diagnostic::error_with_code(
            error_codes::DECORATOR_NOT_ALLOWED,
            "Decorators are not valid here",
            self.peek().span,
        )
    }

    /// Modifier word followed by more of the declaration on the same line
    fn at_modifier(&self, words: &[&str]) -> bool {
        let token = self.peek();
        let next = self.peek_at(1);
        words.iter().any(|w| token.is_word(w))
            && !next.newline_before
            && (Self::is_word(next) || matches!(next.kind, TokenKind::At | TokenKind::LeftBracket))
    }

    // === Decorators ===

    fn parse_decorators(&mut self, into: &mut Vec<Decorator>) -> ParseResult<()> {
        while self.check(TokenKind::At) {
            into.push(self.parse_decorator()?);
        }
        Ok(())
    }

    fn parse_decorator(&mut self) -> ParseResult<Decorator> {
        let start = self.advance().span.start;

        if !Self::is_word(self.peek()) {
            return Err(self.error("Expected decorator name after '@'"));
        }
        let mut name = self.advance().lexeme.clone();
        while self.check(TokenKind::Dot) && Self::is_word(self.peek_at(1)) {
            self.advance();
            name.push('.');
            name.push_str(&self.advance().lexeme);
        }

        if self.check(TokenKind::LeftParen) && !self.peek().newline_before {
            self.skip_balanced()?;
        }

        Ok(Decorator {
            name,
            span: Span::new(start, self.previous().span.end),
        })
    }

    // === Statements ===

    fn parse_statement_list(&mut self) -> ParseResult<Vec<Declaration>> {
        let mut declarations = Vec::new();
        loop {
            while self.match_token(TokenKind::Semicolon) {}
            if self.is_at_end() || self.check(TokenKind::RightBrace) {
                return Ok(declarations);
            }
            declarations.push(self.parse_statement()?);
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Declaration> {
        let mut decorators = Vec::new();
        self.parse_decorators(&mut decorators)?;

        // `export` and `declare` may come before or after the decorators
        while self.at_modifier(MODIFIERS) {
            self.advance();
            self.parse_decorators(&mut decorators)?;
        }

        let token = self.peek();
        let declaration = match token.kind {
            TokenKind::Class => {
                self.advance();
                let name = self.parse_name()?;
                let members = self.parse_member_block()?;
                Declaration::Class {
                    decorators,
                    name,
                    members,
                }
            }
            TokenKind::Interface => {
                self.advance();
                let name = self.parse_name()?;
                let members = self.parse_member_block()?;
                Declaration::Interface {
                    decorators,
                    name,
                    members,
                }
            }
            TokenKind::Function => {
                self.advance();
                let name = self.parse_name()?;
                self.skip_function_rest()?;
                Declaration::Function { decorators, name }
            }
            TokenKind::Enum => {
                self.advance();
                let name = self.parse_name()?;
                self.skip_to_block()?;
                Declaration::Enum { decorators, name }
            }
            TokenKind::Const if self.peek_at(1).kind == TokenKind::Enum => {
                self.advance();
                self.advance();
                let name = self.parse_name()?;
                self.skip_to_block()?;
                Declaration::Enum { decorators, name }
            }
            TokenKind::Let | TokenKind::Const | TokenKind::Var => {
                self.skip_statement()?;
                Declaration::VariableStatement { decorators }
            }
            _ if (token.is_word("namespace") || token.is_word("module"))
                && Self::is_word(self.peek_at(1))
                && !self.peek_at(1).newline_before =>
            {
                self.advance();
                let name = self.parse_name()?;
                if !self.match_token(TokenKind::LeftBrace) {
                    return Err(self.error("Expected '{' after namespace name"));
                }
                let members = self.parse_statement_list()?;
                if !self.match_token(TokenKind::RightBrace) {
                    return Err(self.error("Expected '}' to close namespace"));
                }
                Declaration::Namespace {
                    decorators,
                    name,
                    members,
                }
            }
            _ => {
                if !decorators.is_empty() {
                    return Err(self.misplaced_decorator());
                }
                self.skip_statement()?;
                Declaration::Other
            }
        };
        Ok(declaration)
    }

    /// Declaration name, dotted for namespaces
    fn parse_name(&mut self) -> ParseResult<String> {
        if !Self::is_word(self.peek()) {
            return Err(self.error("Expected declaration name"));
        }
        let mut name = self.advance().lexeme.clone();
        while self.check(TokenKind::Dot) && Self::is_word(self.peek_at(1)) {
            self.advance();
            name.push('.');
            name.push_str(&self.advance().lexeme);
        }
        Ok(name)
    }

    // === Members ===

    /// Heritage clauses, then `{ members }`
    fn parse_member_block(&mut self) -> ParseResult<Vec<Declaration>> {
        while !self.check(TokenKind::LeftBrace) {
            match self.peek().kind {
                TokenKind::Eof => return Err(self.error("Expected '{' to open body")),
                TokenKind::At => return Err(self.misplaced_decorator()),
                TokenKind::LeftParen | TokenKind::LeftBracket => self.skip_balanced()?,
                _ => {
                    self.advance();
                }
            }
        }
        self.advance();

        let mut members = Vec::new();
        loop {
            while self.match_token(TokenKind::Semicolon) || self.match_token(TokenKind::Comma) {}
            if self.match_token(TokenKind::RightBrace) {
                return Ok(members);
            }
            if self.is_at_end() {
                return Err(self.error("Expected '}' to close body"));
            }
            members.push(self.parse_member()?);
        }
    }

    fn parse_member(&mut self) -> ParseResult<Declaration> {
        let mut decorators = Vec::new();
        self.parse_decorators(&mut decorators)?;

        while self.at_modifier(MEMBER_MODIFIERS) {
            self.advance();
        }

        let name = match self.peek().kind {
            TokenKind::LeftBracket => {
                self.skip_balanced()?;
                "[index]".to_string()
            }
            TokenKind::String | TokenKind::Number => self.advance().lexeme.clone(),
            _ if Self::is_word(self.peek()) => self.advance().lexeme.clone(),
            _ => return Err(self.error("Expected member name")),
        };

        self.match_token(TokenKind::Question);
        self.match_token(TokenKind::Bang);
        let is_method = matches!(self.peek().kind, TokenKind::LeftParen | TokenKind::Less);
        self.skip_member_rest(is_method)?;

        Ok(if is_method {
            Declaration::Method { decorators, name }
        } else {
            Declaration::Field { decorators, name }
        })
    }

    /// Rest of a member up to its terminator; a method ends with its body
    fn skip_member_rest(&mut self, is_method: bool) -> ParseResult<()> {
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof | TokenKind::RightBrace => return Ok(()),
                TokenKind::Semicolon | TokenKind::Comma => {
                    self.advance();
                    return Ok(());
                }
                TokenKind::LeftBrace if is_method => return self.skip_balanced(),
                _ if token.newline_before && self.ends_by_newline() => return Ok(()),
                TokenKind::At => return Err(self.misplaced_decorator()),
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => {
                    self.skip_balanced()?
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // === Skipping ===

    /// Skip one bracketed group starting at the current opening token
    fn skip_balanced(&mut self) -> ParseResult<()> {
        let mut stack = Vec::new();
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::LeftParen => stack.push(TokenKind::RightParen),
                TokenKind::LeftBracket => stack.push(TokenKind::RightBracket),
                TokenKind::LeftBrace => stack.push(TokenKind::RightBrace),
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => {
                    if stack.pop() != Some(token.kind) {
                        return Err(self.error("Mismatched closing bracket"));
                    }
                }
                TokenKind::At => return Err(self.misplaced_decorator()),
                TokenKind::Eof => return Err(self.error("Unterminated bracket")),
                _ => {}
            }
            self.advance();
            if stack.is_empty() {
                return Ok(());
            }
        }
    }

    /// Parameters and return type, then a body or `;`
    fn skip_function_rest(&mut self) -> ParseResult<()> {
        loop {
            match self.peek().kind {
                TokenKind::LeftBrace => return self.skip_balanced(),
                TokenKind::Semicolon => {
                    self.advance();
                    return Ok(());
                }
                TokenKind::Eof | TokenKind::RightBrace => return Ok(()),
                // `declare function f(): void` without a semicolon
                _ if self.peek().newline_before && self.ends_by_newline() => return Ok(()),
                TokenKind::At => return Err(self.misplaced_decorator()),
                TokenKind::LeftParen | TokenKind::LeftBracket => self.skip_balanced()?,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn skip_to_block(&mut self) -> ParseResult<()> {
        if !self.check(TokenKind::LeftBrace) {
            return Err(self.error("Expected '{'"));
        }
        self.skip_balanced()
    }

    /// Skip a statement: up to `;`, an automatic semicolon, or the enclosing `}`
    fn skip_statement(&mut self) -> ParseResult<()> {
        let start = self.current;
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof | TokenKind::RightBrace => return Ok(()),
                TokenKind::Semicolon => {
                    self.advance();
                    return Ok(());
                }
                _ if self.current > start && token.newline_before && self.ends_by_newline() => {
                    return Ok(())
                }
                TokenKind::At => return Err(self.misplaced_decorator()),
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => {
                    self.skip_balanced()?
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Whether the line break before the current token ends the construct
    fn ends_by_newline(&self) -> bool {
        !continues_after(self.previous().kind) && !continues_before(self.peek().kind)
    }
}

/// Tokens after which an expression or type must go on
fn continues_after(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Equal | Colon | Comma | Dot | FatArrow | Question | QuestionQuestion | Plus | Minus
            | Star | StarStar | Slash | Percent | Ampersand | AmpAmp | Pipe | PipePipe | Caret
            | Less | LessLess | LessEqual | Greater | EqualEqual | EqualEqualEqual | BangEqual
            | BangEqualEqual | PlusEqual | MinusEqual | StarEqual | StarStarEqual | SlashEqual
            | PercentEqual | AmpersandEqual | PipeEqual | CaretEqual | LessLessEqual | Bang
            | Tilde | New | Typeof | Void | Extends | Implements | Instanceof | Return
    )
}

/// Tokens that cannot start a statement, so the previous line goes on
fn continues_before(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Equal | Colon | Dot | FatArrow | Question | QuestionQuestion | Star | StarStar | Slash
            | Percent | Ampersand | AmpAmp | Pipe | PipePipe | Caret | LessLess | LessEqual
            | Greater | EqualEqual | EqualEqualEqual | BangEqual | BangEqualEqual | PlusEqual
            | MinusEqual | StarEqual | StarStarEqual | SlashEqual | PercentEqual
            | AmpersandEqual | PipeEqual | CaretEqual | LessLessEqual | Extends | Implements
            | Instanceof | Comma | LeftParen | LeftBracket | Else
    )
}
