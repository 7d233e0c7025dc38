//! Diagnostics for syntax errors
//!
//! Every lexer and parser error flows through [`Diagnostic`] so that the
//! formatter, the decorator pipeline and the CLI report them the same way.

use crate::span::{line_col, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A syntax diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Error code (e.g., "AS1001")
    pub code: String,
    /// Main diagnostic message
    pub message: String,
    /// Byte range in the text that was parsed
    pub span: Span,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters)
    pub column: usize,
    /// Source line string
    pub snippet: String,
    /// Short label for caret range
    pub label: String,
    /// Suggested fix (optional)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic with code
    pub fn error_with_code(
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span,
            line: 1,
            column: span.start + 1,
            snippet: String::new(),
            label: String::new(),
            help: None,
        }
    }

    /// Create a new error diagnostic (uses generic syntax error code)
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::error_with_code(error_codes::SYNTAX_ERROR, message, span)
    }

    /// Resolve line, column and snippet of the span against `source`
    pub fn with_position(mut self, source: &str) -> Self {
        let (line, column) = line_col(source, self.span.start);
        self.line = line;
        self.column = column;
        self.snippet = source.lines().nth(line - 1).unwrap_or("").to_string();
        self
    }

    /// Set the label (caret description)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Add a help message
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Format as human-readable string, `file` naming the input
    pub fn to_human_string(&self, file: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("error[{}]: {}\n", self.code, self.message));
        output.push_str(&format!("  --> {}:{}:{}\n", file, self.line, self.column));

        if !self.snippet.is_empty() {
            output.push_str("   |\n");
            output.push_str(&format!("{:>2} | {}\n", self.line, self.snippet));

            let length = self.span.len().max(1);
            let padding = " ".repeat(self.column.saturating_sub(1));
            output.push_str(&format!("   | {}{}", padding, "^".repeat(length)));
            if !self.label.is_empty() {
                output.push_str(&format!(" {}", self.label));
            }
            output.push('\n');
        }

        if let Some(help) = &self.help {
            output.push_str(&format!("   = help: {}\n", help));
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}]",
            self.line, self.column, self.message, self.code
        )
    }
}

/// Error code registry
pub mod error_codes {
    pub const SYNTAX_ERROR: &str = "AS1000";
    pub const UNEXPECTED_TOKEN: &str = "AS1001";
    pub const UNTERMINATED_STRING: &str = "AS1002";
    pub const UNTERMINATED_TEMPLATE: &str = "AS1003";
    pub const UNTERMINATED_COMMENT: &str = "AS1004";
    pub const INVALID_NUMBER: &str = "AS1005";
    pub const UNEXPECTED_CHARACTER: &str = "AS1006";
    pub const DECORATOR_NOT_ALLOWED: &str = "AS1010";
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_with_position_resolves_line_and_snippet() {
        let source = "let a = 1;\nlet = 2;";
        let diag = Diagnostic::error("expected identifier", Span::new(15, 16)).with_position(source);
        assert_eq!(diag.line, 2);
        assert_eq!(diag.column, 5);
        assert_eq!(diag.snippet, "let = 2;");
    }

    #[test]
    fn test_human_string() {
        let source = "let = 2;";
        let diag = Diagnostic::error_with_code(error_codes::UNEXPECTED_TOKEN, "expected identifier", Span::new(4, 5))
            .with_position(source)
            .with_label("here");
        assert_eq!(
            diag.to_human_string("a.ts"),
            "error[AS1001]: expected identifier\n  --> a.ts:1:5\n   |\n 1 | let = 2;\n   |     ^ here\n"
        );
    }
}
