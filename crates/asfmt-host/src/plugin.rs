//! Plugin contract
//!
//! A [`Plugin`] replaces the two extension points of the formatter: the
//! parser that turns text into a [`SourceFile`], and the printer used for
//! every comment. Plugins are immutable and shared across threads.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ast::Program;
use crate::comments::{Comment, CommentCollector};
use crate::doc::Doc;
use crate::formatter::{FormatConfig, FormatError, FormatResult};
use crate::lexer::Lexer;
use crate::parser::Parser;

/// Parsed input handed from the parser to the printer
#[derive(Debug)]
pub struct SourceFile {
    pub program: Program,
    /// Comments in source order
    pub comments: Vec<Comment>,
    /// The text that was parsed; all spans point into it
    pub text: String,
    /// Data attached by plugins for their printers
    pub extensions: Extensions,
}

/// Type-keyed storage for plugin data attached to a [`SourceFile`]
#[derive(Default)]
pub struct Extensions {
    map: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a value, returning the previous value of the same type
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.map.len())
            .finish()
    }
}

/// Where a comment is printed relative to the code it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Before a statement or member
    Leading,
    /// After a statement or member, on its last line
    Trailing,
    /// Inside an otherwise empty body, or at the end of a body
    Dangling,
}

/// A comment about to be printed, with its attachment
#[derive(Debug, Clone, Copy)]
pub struct CommentPath<'a> {
    pub comment: &'a Comment,
    pub placement: Placement,
    /// Position within the run of comments printed at the same attachment point
    pub index: usize,
}

impl CommentPath<'_> {
    /// Whether this is the first comment of its run
    pub fn is_first(&self) -> bool {
        self.index == 0
    }
}

/// Read-only state available to comment printers
#[derive(Debug, Clone, Copy)]
pub struct PrintContext<'a> {
    config: &'a FormatConfig,
    source: &'a SourceFile,
}

impl<'a> PrintContext<'a> {
    pub fn new(config: &'a FormatConfig, source: &'a SourceFile) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &'a FormatConfig {
        self.config
    }

    pub fn source(&self) -> &'a SourceFile {
        self.source
    }
}

/// Turns source text into a [`SourceFile`]
pub trait SourceParser: Send + Sync {
    fn parse(&self, text: &str, config: &FormatConfig) -> FormatResult<SourceFile>;
}

/// Renders a single comment
pub trait CommentPrinter: Send + Sync {
    fn print_comment(&self, path: &CommentPath<'_>, ctx: &PrintContext<'_>) -> Doc;
}

/// Parser and comment printer used by a [`Formatter`](crate::Formatter)
#[derive(Clone)]
pub struct Plugin {
    pub parser: Arc<dyn SourceParser>,
    pub printer: Arc<dyn CommentPrinter>,
}

impl Plugin {
    pub fn new(parser: Arc<dyn SourceParser>, printer: Arc<dyn CommentPrinter>) -> Self {
        Self { parser, printer }
    }

    /// The plain strict-grammar plugin
    pub fn strict() -> Self {
        Self::new(Arc::new(StrictParser), Arc::new(DefaultCommentPrinter))
    }
}

impl Default for Plugin {
    fn default() -> Self {
        Self::strict()
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin").finish_non_exhaustive()
    }
}

/// The strict-grammar parser
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictParser;

impl SourceParser for StrictParser {
    fn parse(&self, text: &str, _config: &FormatConfig) -> FormatResult<SourceFile> {
        // Step 1: Tokenize with comments
        let mut lexer = Lexer::new(text);
        let (tokens, lex_diags) = lexer.tokenize_with_comments();
        if !lex_diags.is_empty() {
            return Err(FormatError::Syntax(lex_diags));
        }

        // Step 2: Collect comments from token stream
        let mut collector = CommentCollector::new();
        collector.collect_from_tokens(&tokens, text);
        let comments = collector.into_comments();

        // Step 3: Parse (the parser skips comment tokens)
        let mut parser = Parser::new(tokens, text);
        let (program, parse_diags) = parser.parse();
        if !parse_diags.is_empty() {
            return Err(FormatError::Syntax(parse_diags));
        }

        Ok(SourceFile {
            program,
            comments,
            text: text.to_string(),
            extensions: Extensions::new(),
        })
    }
}

/// Prints comments exactly as written
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCommentPrinter;

impl CommentPrinter for DefaultCommentPrinter {
    fn print_comment(&self, path: &CommentPath<'_>, _ctx: &PrintContext<'_>) -> Doc {
        Doc::text(path.comment.text.clone())
    }
}
