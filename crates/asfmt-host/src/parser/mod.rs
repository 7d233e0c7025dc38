//! Parsing (tokens to AST)
//!
//! The parser converts a stream of tokens into an Abstract Syntax Tree (AST).
//! Uses precedence climbing for expressions and recursive descent for
//! statements. Decorators are not part of this grammar: any `@` is reported
//! as a syntax error.

mod expr;
mod stmt;
mod types;

use crate::ast::*;
use crate::diagnostic::{error_codes, Diagnostic};
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Parser state for building AST from tokens
pub struct Parser {
    pub(super) tokens: Vec<Token>,
    pub(super) current: usize,
    pub(super) diagnostics: Vec<Diagnostic>,
    /// Source text, used to resolve diagnostic positions
    source: String,
}

/// Saved parser position for speculative parsing
#[derive(Debug, Clone, Copy)]
pub(super) struct Checkpoint {
    current: usize,
    diagnostics: usize,
}

impl Parser {
    /// Create a new parser for the given tokens (comment tokens are skipped)
    pub fn new(tokens: Vec<Token>, source: impl Into<String>) -> Self {
        let mut tokens: Vec<Token> = tokens
            .into_iter()
            .filter(|t| !t.kind.is_comment())
            .collect();
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let source_len = tokens.last().map_or(0, |t| t.span.end);
            tokens.push(Token::new(TokenKind::Eof, "", Span::new(source_len, source_len)));
        }
        Self {
            tokens,
            current: 0,
            diagnostics: Vec::new(),
            source: source.into(),
        }
    }

    /// Parse tokens into an AST
    pub fn parse(&mut self) -> (Program, Vec<Diagnostic>) {
        let mut items = Vec::new();

        while !self.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => items.push(stmt),
                Err(_) => self.synchronize(),
            }
        }

        let span = Span::new(0, self.peek().span.end);
        (Program { items, span }, std::mem::take(&mut self.diagnostics))
    }

    // === Helper methods ===

    /// Advance to next token and return reference to previous
    pub(super) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    /// Most recently consumed token
    pub(super) fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Peek at current token
    pub(super) fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    /// Peek `n` tokens ahead of the current one
    pub(super) fn peek_at(&self, n: usize) -> &Token {
        &self.tokens[(self.current + n).min(self.tokens.len() - 1)]
    }

    /// Check if current token matches kind
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Check if current token is the identifier or keyword `word`
    pub(super) fn check_word(&self, word: &str) -> bool {
        self.peek().is_word(word)
    }

    /// Match and consume token if it matches
    pub(super) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn match_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume token of given kind or error
    pub(super) fn consume(&mut self, kind: TokenKind, message: &str) -> Result<&Token, ()> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            self.error(message);
            Err(())
        }
    }

    /// Consume a statement terminator, applying automatic semicolon insertion
    pub(super) fn consume_semicolon(&mut self) -> Result<(), ()> {
        if self.match_token(TokenKind::Semicolon) {
            return Ok(());
        }
        if self.check(TokenKind::RightBrace) || self.is_at_end() || self.peek().newline_before {
            return Ok(());
        }
        self.error("Expected ';'");
        Err(())
    }

    /// Check if at end of token stream
    pub(super) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Whether the next token starts right where the current one ends
    pub(super) fn next_is_adjacent(&self, n: usize) -> bool {
        self.peek_at(n).span.start == self.peek_at(n - 1).span.end
    }

    /// Span from `start` to the end of the last consumed token
    pub(super) fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.previous().span.end.max(start))
    }

    /// Record an error
    pub(super) fn error(&mut self, message: &str) {
        let code = if self.check(TokenKind::At) {
            error_codes::DECORATOR_NOT_ALLOWED
        } else {
            error_codes::UNEXPECTED_TOKEN
        };
        self.error_with_code(code, message);
    }

    pub(super) fn error_with_code(&mut self, code: &str, message: &str) {
        let span = self.peek().span;
        let found = if self.is_at_end() {
            "end of file".to_string()
        } else {
            format!("'{}'", self.peek().lexeme)
        };
        self.diagnostics.push(
            Diagnostic::error_with_code(code, format!("{}, found {}", message, found), span)
                .with_position(&self.source)
                .with_label("syntax error"),
        );
    }

    /// Consume an identifier token
    pub(super) fn consume_identifier(&mut self, context: &str) -> Result<Identifier, ()> {
        if self.check(TokenKind::Identifier) {
            let token = self.advance();
            Ok(Identifier {
                name: token.lexeme.clone(),
                span: token.span,
            })
        } else {
            self.error(&format!("Expected {}", context));
            Err(())
        }
    }

    /// Consume an identifier or reserved word used as a property name
    pub(super) fn consume_property_name(&mut self, context: &str) -> Result<Identifier, ()> {
        let token = self.peek();
        if token.kind == TokenKind::Identifier || token.kind.is_keyword() {
            let token = self.advance();
            Ok(Identifier {
                name: token.lexeme.clone(),
                span: token.span,
            })
        } else {
            self.error(&format!("Expected {}", context));
            Err(())
        }
    }

    /// Remember the current position for backtracking
    pub(super) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            current: self.current,
            diagnostics: self.diagnostics.len(),
        }
    }

    /// Rewind to a checkpoint, discarding diagnostics recorded since
    pub(super) fn restore(&mut self, checkpoint: Checkpoint) {
        self.current = checkpoint.current;
        self.diagnostics.truncate(checkpoint.diagnostics);
    }

    /// Synchronize after error
    pub(super) fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.peek().kind {
                TokenKind::Function
                | TokenKind::Class
                | TokenKind::Interface
                | TokenKind::Enum
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Var
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::Export
                | TokenKind::Import => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
