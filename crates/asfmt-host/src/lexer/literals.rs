//! Literal scanning for the lexer
//!
//! Literal lexemes keep their raw source text; the printer decides how to
//! re-quote strings.

use crate::diagnostic::error_codes;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

impl Lexer {
    /// Scan a string literal opened by `quote`
    pub(super) fn string(&mut self, quote: char) -> Token {
        while !self.is_at_end() && self.peek() != quote {
            match self.peek() {
                '\n' => break,
                '\\' => {
                    self.advance();
                    if self.is_at_end() {
                        break;
                    }
                    // Line continuations are legal inside strings
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }

        if self.is_at_end() || self.peek() == '\n' {
            return self.error_token(
                error_codes::UNTERMINATED_STRING,
                "Unterminated string literal",
            );
        }

        self.advance(); // closing quote
        self.make_token(TokenKind::String)
    }

    /// Scan a template literal, substitutions included, as one raw token
    pub(super) fn template(&mut self) -> Token {
        let mut depth = 0usize;

        while !self.is_at_end() {
            match self.peek() {
                '\\' => {
                    self.advance();
                    if !self.is_at_end() {
                        self.advance();
                    }
                }
                '`' if depth == 0 => {
                    self.advance();
                    return self.make_token(TokenKind::Template);
                }
                '$' if self.peek_next() == Some('{') => {
                    self.advance();
                    self.advance();
                    depth += 1;
                }
                '{' if depth > 0 => {
                    self.advance();
                    depth += 1;
                }
                '}' if depth > 0 => {
                    self.advance();
                    depth -= 1;
                }
                _ => {
                    self.advance();
                }
            }
        }

        self.error_token(
            error_codes::UNTERMINATED_TEMPLATE,
            "Unterminated template literal",
        )
    }

    /// Scan a number literal (decimal, hex, binary, octal, exponent)
    pub(super) fn number(&mut self) -> Token {
        let first = self.chars[self.start_pos];

        if first == '0' && matches!(self.peek(), 'x' | 'X' | 'b' | 'B' | 'o' | 'O') {
            let radix = match self.advance() {
                'x' | 'X' => 16,
                'b' | 'B' => 2,
                _ => 8,
            };
            let digits_start = self.current;
            while !self.is_at_end() && (self.peek().is_digit(radix) || self.peek() == '_') {
                self.advance();
            }
            if self.current == digits_start {
                return self.error_token(error_codes::INVALID_NUMBER, "Invalid number: missing digits");
            }
            return self.make_token(TokenKind::Number);
        }

        let is_digit = |c: char| c.is_ascii_digit() || c == '_';

        while !self.is_at_end() && is_digit(self.peek()) {
            self.advance();
        }

        // Fraction; a leading `.` was already consumed for `.5`
        if first != '.' && self.peek() == '.' {
            if let Some(c) = self.peek_next() {
                if c.is_ascii_digit() {
                    self.advance();
                    while !self.is_at_end() && is_digit(self.peek()) {
                        self.advance();
                    }
                }
            }
        }

        if self.peek() == 'e' || self.peek() == 'E' {
            self.advance();

            if self.peek() == '+' || self.peek() == '-' {
                self.advance();
            }

            if !self.peek().is_ascii_digit() {
                return self.error_token(
                    error_codes::INVALID_NUMBER,
                    "Invalid number: exponent requires digits",
                );
            }

            while !self.is_at_end() && is_digit(self.peek()) {
                self.advance();
            }
        }

        self.make_token(TokenKind::Number)
    }

    /// Scan an identifier or keyword
    pub(super) fn identifier(&mut self) -> Token {
        while !self.is_at_end() {
            let c = self.peek();
            if c.is_alphanumeric() || c == '_' || c == '$' {
                self.advance();
            } else {
                break;
            }
        }

        let token = self.make_token(TokenKind::Identifier);
        match TokenKind::keyword(&token.lexeme) {
            Some(kind) => Token { kind, ..token },
            None => token,
        }
    }
}
