//! Formatter core - configuration and entry point

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::plugin::Plugin;
use crate::visitor::FormatVisitor;

/// Formatter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Number of spaces per indentation level (default: 2)
    pub indent_size: usize,
    /// Indent with tabs instead of spaces (default: false)
    pub use_tabs: bool,
    /// Maximum line width before breaking (default: 80)
    pub max_width: usize,
    /// Prefer single quotes for strings (default: false)
    pub single_quote: bool,
    /// Whether to add trailing commas in multi-line constructs (default: true)
    pub trailing_commas: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_size: 2,
            use_tabs: false,
            max_width: 80,
            single_quote: false,
            trailing_commas: true,
        }
    }
}

impl FormatConfig {
    /// Create config with custom indent size
    pub fn with_indent_size(mut self, size: usize) -> Self {
        self.indent_size = size;
        self
    }

    /// Create config with custom max width
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    pub fn with_use_tabs(mut self, enabled: bool) -> Self {
        self.use_tabs = enabled;
        self
    }

    pub fn with_single_quote(mut self, enabled: bool) -> Self {
        self.single_quote = enabled;
        self
    }

    /// Create config with trailing commas setting
    pub fn with_trailing_commas(mut self, enabled: bool) -> Self {
        self.trailing_commas = enabled;
        self
    }

    /// Reject values the printer cannot honour
    pub fn validate(&self) -> Result<(), FormatError> {
        if !(1..=16).contains(&self.indent_size) {
            return Err(FormatError::InvalidConfig(format!(
                "indent_size must be between 1 and 16, got {}",
                self.indent_size
            )));
        }
        if self.max_width < 20 {
            return Err(FormatError::InvalidConfig(format!(
                "max_width must be at least 20, got {}",
                self.max_width
            )));
        }
        Ok(())
    }

    /// One level of indentation
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_size)
        }
    }
}

/// Formatting failure
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{}", describe_syntax(.0))]
    Syntax(Vec<Diagnostic>),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Plugin(Box<dyn std::error::Error + Send + Sync>),
}

fn describe_syntax(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => "syntax error".to_string(),
        [only] => format!("syntax error at {}", only),
        [first, rest @ ..] => format!("syntax error at {} (and {} more)", first, rest.len()),
    }
}

/// Result of formatting
pub type FormatResult<T = String> = Result<T, FormatError>;

/// The main formatter
#[derive(Debug, Clone)]
pub struct Formatter {
    config: FormatConfig,
    plugin: Plugin,
}

impl Formatter {
    pub fn new(config: FormatConfig) -> Self {
        Self {
            config,
            plugin: Plugin::strict(),
        }
    }

    /// Replace the parser and comment printer
    pub fn with_plugin(mut self, plugin: Plugin) -> Self {
        self.plugin = plugin;
        self
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Format source code, returning the formatted string or the failure
    pub fn format(&self, source: &str) -> FormatResult {
        self.config.validate()?;

        let file = self.plugin.parser.parse(source, &self.config)?;

        let mut visitor = FormatVisitor::new(&self.config, &file, self.plugin.printer.as_ref());
        visitor.visit_program(&file.program);

        Ok(visitor.into_output())
    }

    /// Whether `source` is already formatted
    pub fn check(&self, source: &str) -> FormatResult<bool> {
        Ok(self.format(source)? == source)
    }
}
