//! Token types for lexical analysis
//!
//! Defines all token types recognized by the lexer.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Token produced by the lexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The source text of this token
    pub lexeme: String,
    /// Source location
    pub span: Span,
    /// Whether a line break separates this token from the previous one
    pub newline_before: bool,
}

impl Token {
    /// Create a new token
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
            newline_before: false,
        }
    }

    /// Whether this token is an identifier or keyword spelled `word`
    pub fn is_word(&self, word: &str) -> bool {
        (self.kind == TokenKind::Identifier || self.kind.is_keyword()) && self.lexeme == word
    }
}

/// Classification of token types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals
    Number,
    String,
    Template,
    Identifier,

    // Reserved words
    Let,
    Const,
    Var,
    Function,
    Class,
    Interface,
    Enum,
    Import,
    Export,
    Return,
    If,
    Else,
    While,
    Do,
    For,
    Break,
    Continue,
    New,
    This,
    Super,
    Null,
    True,
    False,
    Extends,
    Implements,
    Throw,
    Typeof,
    Instanceof,
    Void,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Colon,
    Question,
    Dot,
    Ellipsis,
    /// `@` (only meaningful to decorator-aware parsers)
    At,
    FatArrow,

    // Operators
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    Bang,
    Tilde,
    Ampersand,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    LessLess,
    Less,
    LessEqual,
    /// `>` is never combined by the lexer; `>=` and shifts are rebuilt by
    /// the parser from adjacent tokens so that nested type arguments close
    Greater,
    Equal,
    EqualEqual,
    EqualEqualEqual,
    BangEqual,
    BangEqualEqual,
    QuestionQuestion,
    PlusPlus,
    MinusMinus,

    // Compound assignment
    PlusEqual,
    MinusEqual,
    StarEqual,
    StarStarEqual,
    SlashEqual,
    PercentEqual,
    AmpersandEqual,
    PipeEqual,
    CaretEqual,
    LessLessEqual,

    // Comments (only with `tokenize_with_comments`)
    LineComment,
    BlockComment,

    // Special
    Error,
    Eof,
}

impl TokenKind {
    /// Look up a reserved word
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "var" => TokenKind::Var,
            "function" => TokenKind::Function,
            "class" => TokenKind::Class,
            "interface" => TokenKind::Interface,
            "enum" => TokenKind::Enum,
            "import" => TokenKind::Import,
            "export" => TokenKind::Export,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "for" => TokenKind::For,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "new" => TokenKind::New,
            "this" => TokenKind::This,
            "super" => TokenKind::Super,
            "null" => TokenKind::Null,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "extends" => TokenKind::Extends,
            "implements" => TokenKind::Implements,
            "throw" => TokenKind::Throw,
            "typeof" => TokenKind::Typeof,
            "instanceof" => TokenKind::Instanceof,
            "void" => TokenKind::Void,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Let
                | TokenKind::Const
                | TokenKind::Var
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::Interface
                | TokenKind::Enum
                | TokenKind::Import
                | TokenKind::Export
                | TokenKind::Return
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::For
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::New
                | TokenKind::This
                | TokenKind::Super
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Extends
                | TokenKind::Implements
                | TokenKind::Throw
                | TokenKind::Typeof
                | TokenKind::Instanceof
                | TokenKind::Void
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}
