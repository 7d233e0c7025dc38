//! asfmt host formatter
//!
//! Formats the strict TypeScript subset used by AssemblyScript sources, with
//! comment preservation. The parser and the comment printer are replaceable
//! through the [`plugin`] contract.

pub mod ast;
pub mod comments;
pub mod diagnostic;
pub mod doc;
mod formatter;
pub mod lexer;
pub mod parser;
pub mod plugin;
pub mod span;
pub mod token;
mod visitor;

pub use comments::{Comment, CommentKind, CommentPosition};
pub use diagnostic::Diagnostic;
pub use doc::Doc;
pub use formatter::{FormatConfig, FormatError, FormatResult, Formatter};
pub use plugin::{
    CommentPath, CommentPrinter, DefaultCommentPrinter, Extensions, Placement, Plugin,
    PrintContext, SourceFile, SourceParser, StrictParser,
};
pub use span::Span;
pub use visitor::normalize_string;

/// Format source code with default configuration
pub fn format_source(source: &str) -> FormatResult {
    format_source_with_config(source, &FormatConfig::default())
}

/// Format source code with custom configuration
pub fn format_source_with_config(source: &str, config: &FormatConfig) -> FormatResult {
    Formatter::new(config.clone()).format(source)
}

/// Check if source code is already formatted (without modifying)
pub fn check_formatted(source: &str) -> bool {
    check_formatted_with_config(source, &FormatConfig::default())
}

/// Check if source code is already formatted with custom configuration
pub fn check_formatted_with_config(source: &str, config: &FormatConfig) -> bool {
    Formatter::new(config.clone()).check(source).unwrap_or(false)
}
