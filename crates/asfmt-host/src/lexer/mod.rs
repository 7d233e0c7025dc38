//! Lexical analysis (tokenization)
//!
//! The lexer converts source text into a stream of tokens whose spans are
//! byte offsets into that text. Each token records whether a line break
//! precedes it, which the parsers use for automatic semicolon insertion.

use crate::diagnostic::{error_codes, Diagnostic};
use crate::span::Span;
use crate::token::{Token, TokenKind};

mod literals;

/// Lexer state for tokenizing source code
pub struct Lexer {
    /// Original source code
    pub(super) source: String,
    /// Characters of source code
    pub(super) chars: Vec<char>,
    /// Byte offset of every character, plus the source length
    offsets: Vec<usize>,
    /// Current position in chars
    pub(super) current: usize,
    /// Start position (char index) of current token
    pub(super) start_pos: usize,
    /// Whether a line break was skipped since the previous token
    saw_newline: bool,
    /// Collected diagnostics
    pub(super) diagnostics: Vec<Diagnostic>,
    /// Whether to emit comment tokens
    emit_comments: bool,
    /// Pending comment tokens to emit
    pending_comments: Vec<Token>,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let chars: Vec<char> = source.chars().collect();
        let mut offsets: Vec<usize> = source.char_indices().map(|(i, _)| i).collect();
        offsets.push(source.len());
        Self {
            source,
            chars,
            offsets,
            current: 0,
            start_pos: 0,
            saw_newline: false,
            diagnostics: Vec::new(),
            emit_comments: false,
            pending_comments: Vec::new(),
        }
    }

    /// Tokenize the source code, returning tokens and any diagnostics
    pub fn tokenize(&mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        (tokens, std::mem::take(&mut self.diagnostics))
    }

    /// Tokenize preserving comment tokens in the stream
    pub fn tokenize_with_comments(&mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        self.emit_comments = true;
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;

            // Drain any pending comment tokens collected before this token
            tokens.append(&mut self.pending_comments);
            tokens.push(token);

            if is_eof {
                break;
            }
        }

        self.emit_comments = false;
        (tokens, std::mem::take(&mut self.diagnostics))
    }

    /// Scan the next token
    fn next_token(&mut self) -> Token {
        self.saw_newline = false;
        self.skip_whitespace_and_comments();

        self.start_pos = self.current;

        if self.is_at_end() {
            return self.make_token(TokenKind::Eof);
        }

        let c = self.advance();

        match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            '{' => self.make_token(TokenKind::LeftBrace),
            '}' => self.make_token(TokenKind::RightBrace),
            '[' => self.make_token(TokenKind::LeftBracket),
            ']' => self.make_token(TokenKind::RightBracket),
            ';' => self.make_token(TokenKind::Semicolon),
            ',' => self.make_token(TokenKind::Comma),
            ':' => self.make_token(TokenKind::Colon),
            '~' => self.make_token(TokenKind::Tilde),
            '@' => self.make_token(TokenKind::At),
            '>' => self.make_token(TokenKind::Greater),

            '?' => {
                if self.match_char('?') {
                    self.make_token(TokenKind::QuestionQuestion)
                } else {
                    self.make_token(TokenKind::Question)
                }
            }
            '+' => {
                if self.match_char('+') {
                    self.make_token(TokenKind::PlusPlus)
                } else if self.match_char('=') {
                    self.make_token(TokenKind::PlusEqual)
                } else {
                    self.make_token(TokenKind::Plus)
                }
            }
            '-' => {
                if self.match_char('-') {
                    self.make_token(TokenKind::MinusMinus)
                } else if self.match_char('=') {
                    self.make_token(TokenKind::MinusEqual)
                } else {
                    self.make_token(TokenKind::Minus)
                }
            }
            '*' => {
                if self.match_char('*') {
                    if self.match_char('=') {
                        self.make_token(TokenKind::StarStarEqual)
                    } else {
                        self.make_token(TokenKind::StarStar)
                    }
                } else if self.match_char('=') {
                    self.make_token(TokenKind::StarEqual)
                } else {
                    self.make_token(TokenKind::Star)
                }
            }
            // Regular expression literals are not part of the language
            '/' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::SlashEqual)
                } else {
                    self.make_token(TokenKind::Slash)
                }
            }
            '%' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::PercentEqual)
                } else {
                    self.make_token(TokenKind::Percent)
                }
            }
            '^' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::CaretEqual)
                } else {
                    self.make_token(TokenKind::Caret)
                }
            }
            '=' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        self.make_token(TokenKind::EqualEqualEqual)
                    } else {
                        self.make_token(TokenKind::EqualEqual)
                    }
                } else if self.match_char('>') {
                    self.make_token(TokenKind::FatArrow)
                } else {
                    self.make_token(TokenKind::Equal)
                }
            }
            '!' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        self.make_token(TokenKind::BangEqualEqual)
                    } else {
                        self.make_token(TokenKind::BangEqual)
                    }
                } else {
                    self.make_token(TokenKind::Bang)
                }
            }
            '<' => {
                if self.match_char('<') {
                    if self.match_char('=') {
                        self.make_token(TokenKind::LessLessEqual)
                    } else {
                        self.make_token(TokenKind::LessLess)
                    }
                } else if self.match_char('=') {
                    self.make_token(TokenKind::LessEqual)
                } else {
                    self.make_token(TokenKind::Less)
                }
            }
            '&' => {
                if self.match_char('&') {
                    self.make_token(TokenKind::AmpAmp)
                } else if self.match_char('=') {
                    self.make_token(TokenKind::AmpersandEqual)
                } else {
                    self.make_token(TokenKind::Ampersand)
                }
            }
            '|' => {
                if self.match_char('|') {
                    self.make_token(TokenKind::PipePipe)
                } else if self.match_char('=') {
                    self.make_token(TokenKind::PipeEqual)
                } else {
                    self.make_token(TokenKind::Pipe)
                }
            }

            '"' | '\'' => self.string(c),
            '`' => self.template(),

            c if c.is_ascii_digit() => self.number(),

            '.' => {
                if self.peek().is_ascii_digit() {
                    self.number()
                } else if self.peek() == '.' && self.peek_next() == Some('.') {
                    self.advance();
                    self.advance();
                    self.make_token(TokenKind::Ellipsis)
                } else {
                    self.make_token(TokenKind::Dot)
                }
            }

            c if c.is_alphabetic() || c == '_' || c == '$' => self.identifier(),

            _ => self.error_token(
                error_codes::UNEXPECTED_CHARACTER,
                &format!("Unexpected character '{}'", c),
            ),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            if self.is_at_end() {
                return;
            }

            match self.peek() {
                ' ' | '\r' | '\t' | '\u{feff}' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    self.saw_newline = true;
                }
                '/' if self.peek_next() == Some('/') => {
                    let comment_start = self.current;
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                    self.push_comment(TokenKind::LineComment, comment_start);
                }
                '/' if self.peek_next() == Some('*') => {
                    let comment_start = self.current;
                    self.advance(); // /
                    self.advance(); // *

                    let mut terminated = false;
                    while !self.is_at_end() {
                        if self.peek() == '*' && self.peek_next() == Some('/') {
                            self.advance(); // *
                            self.advance(); // /
                            terminated = true;
                            break;
                        }
                        if self.peek() == '\n' {
                            self.saw_newline = true;
                        }
                        self.advance();
                    }

                    if terminated {
                        self.push_comment(TokenKind::BlockComment, comment_start);
                    } else {
                        let span = self.span_from(comment_start);
                        self.diagnostics.push(
                            Diagnostic::error_with_code(
                                error_codes::UNTERMINATED_COMMENT,
                                "Unterminated multi-line comment",
                                span,
                            )
                            .with_position(&self.source)
                            .with_label("comment starts here")
                            .with_help("add '*/' to close the multi-line comment"),
                        );
                    }
                }
                _ => return,
            }
        }
    }

    fn push_comment(&mut self, kind: TokenKind, start: usize) {
        if !self.emit_comments {
            return;
        }
        let span = self.span_from(start);
        let mut token = Token::new(kind, span.text(&self.source), span);
        token.newline_before = self.saw_newline;
        self.pending_comments.push(token);
    }

    // === Character navigation ===

    /// Advance to next character and return it
    pub(super) fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        c
    }

    /// Peek at current character without advancing
    pub(super) fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.current]
        }
    }

    /// Peek at next character (current + 1)
    pub(super) fn peek_next(&self) -> Option<char> {
        self.chars.get(self.current + 1).copied()
    }

    /// Check if current character matches expected, and advance if so
    pub(super) fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.chars[self.current] != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    /// Check if we've reached the end of source
    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    // === Token creation ===

    /// Byte span from the char index `start` to the current position
    pub(super) fn span_from(&self, start: usize) -> Span {
        Span::new(self.offsets[start], self.offsets[self.current])
    }

    /// Create a token spanning the current lexeme
    pub(super) fn make_token(&self, kind: TokenKind) -> Token {
        let span = self.span_from(self.start_pos);
        Token {
            kind,
            lexeme: span.text(&self.source).to_string(),
            span,
            newline_before: self.saw_newline,
        }
    }

    /// Create an error token and record a diagnostic with a specific code
    pub(super) fn error_token(&mut self, code: &str, message: &str) -> Token {
        let mut span = self.span_from(self.start_pos);
        if span.is_empty() {
            span.end = (span.start + 1).min(self.source.len());
        }

        self.diagnostics.push(
            Diagnostic::error_with_code(code, message, span)
                .with_position(&self.source)
                .with_label("lexer error"),
        );

        Token {
            kind: TokenKind::Error,
            lexeme: message.to_string(),
            span,
            newline_before: self.saw_newline,
        }
    }
}
