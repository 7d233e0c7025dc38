//! Comment collection and classification

use crate::span::{line_of, Span};
use crate::token::{Token, TokenKind};
use serde::{Deserialize, Serialize};

/// A collected comment from source code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// What kind of comment
    pub kind: CommentKind,
    /// The comment text (including delimiters)
    pub text: String,
    /// Source location
    pub span: Span,
    /// Where this comment is positioned relative to code
    pub position: CommentPosition,
}

impl Comment {
    /// Comment body without its delimiters
    pub fn value(&self) -> &str {
        match self.kind {
            CommentKind::Line => self.text.strip_prefix("//").unwrap_or(&self.text),
            CommentKind::Block => self
                .text
                .strip_prefix("/*")
                .and_then(|rest| rest.strip_suffix("*/"))
                .unwrap_or(&self.text),
        }
    }

    pub fn is_block(&self) -> bool {
        self.kind == CommentKind::Block
    }
}

/// Types of comments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentKind {
    /// Single-line comment: // ...
    Line,
    /// Block comment: /* ... */
    Block,
}

/// Position of a comment relative to code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentPosition {
    /// Before code: on its own line, or followed by code on the same line
    Leading,
    /// After code on the same line, with nothing but comments after it
    Trailing,
    /// No code anywhere after it
    Standalone,
}

/// Collects comments from a token stream and associates them with positions
pub struct CommentCollector {
    comments: Vec<Comment>,
}

impl Default for CommentCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl CommentCollector {
    pub fn new() -> Self {
        Self {
            comments: Vec::new(),
        }
    }

    /// Extract comments from a token stream, classifying their positions
    pub fn collect_from_tokens(&mut self, tokens: &[Token], source: &str) {
        for (i, token) in tokens.iter().enumerate() {
            let kind = match token.kind {
                TokenKind::LineComment => CommentKind::Line,
                TokenKind::BlockComment => CommentKind::Block,
                _ => continue,
            };

            let position = self.classify_position(token, tokens, i, source);

            self.comments.push(Comment {
                kind,
                text: token.lexeme.clone(),
                span: token.span,
                position,
            });
        }
    }

    /// Classify whether a comment is leading, trailing, or standalone
    fn classify_position(
        &self,
        comment_token: &Token,
        tokens: &[Token],
        index: usize,
        source: &str,
    ) -> CommentPosition {
        let start_line = line_of(source, comment_token.span.start);
        let end_line = line_of(source, comment_token.span.end);

        let is_code = |t: &Token| !t.kind.is_comment() && t.kind != TokenKind::Eof;

        // Look backwards for code ending on the line the comment starts on
        let has_code_before_on_same_line = tokens[..index]
            .iter()
            .rev()
            .find(|t| is_code(*t))
            .is_some_and(|t| line_of(source, t.span.end.saturating_sub(1)) == start_line);

        // Look forwards for the next code token
        let next_code = tokens[index + 1..].iter().find(|t| is_code(*t));
        let has_code_after_on_same_line =
            next_code.is_some_and(|t| line_of(source, t.span.start) == end_line);

        if has_code_before_on_same_line && !has_code_after_on_same_line {
            CommentPosition::Trailing
        } else if next_code.is_some() {
            CommentPosition::Leading
        } else {
            CommentPosition::Standalone
        }
    }

    /// Consume and return collected comments
    pub fn into_comments(self) -> Vec<Comment> {
        self.comments
    }

    /// Get all comments
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn collect(source: &str) -> Vec<Comment> {
        let (tokens, _) = Lexer::new(source).tokenize_with_comments();
        let mut collector = CommentCollector::new();
        collector.collect_from_tokens(&tokens, source);
        collector.into_comments()
    }

    #[test]
    fn test_collect_line_comment() {
        let comments = collect("// hello\nlet x = 5;");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].kind, CommentKind::Line);
        assert_eq!(comments[0].text, "// hello");
        assert_eq!(comments[0].value(), " hello");
        assert_eq!(comments[0].position, CommentPosition::Leading);
    }

    #[test]
    fn test_collect_trailing_comment() {
        let comments = collect("let x = 5; // inline\nlet y = 6;");
        assert_eq!(comments[0].position, CommentPosition::Trailing);
    }

    #[test]
    fn test_code_on_both_sides_is_leading() {
        let comments = collect("let x = 5; /* next */ let y = 6;");
        assert_eq!(comments[0].position, CommentPosition::Leading);
    }

    #[test]
    fn test_collect_block_comment() {
        let comments = collect("/* block */\nlet x = 5;");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].kind, CommentKind::Block);
        assert_eq!(comments[0].value(), " block ");
    }

    #[test]
    fn test_standalone_comment() {
        let comments = collect("let x = 1;\n\n// just a comment");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].position, CommentPosition::Standalone);
    }
}
