//! Status output on stderr, gated by verbosity

use crate::discovery::display_path;
use asfmt_formatter::FormatConfig;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

/// Verbosity level for status output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Suppress all non-error output
    Quiet,
    /// Normal output (default)
    #[default]
    Normal,
    /// Detailed output with configuration and timings
    Verbose,
}

/// Counters for the final summary
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub changed: usize,
    pub unchanged: usize,
    pub errors: usize,
}

pub struct Reporter {
    verbosity: Verbosity,
    progress: bool,
}

impl Reporter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            progress: true,
        }
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    /// Progress bar over `total` files; hidden when quiet or disabled
    pub fn progress_bar(&self, total: usize) -> ProgressBar {
        if self.is_quiet() || !self.progress || total == 0 {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "{bar:40.cyan/blue} {percent}% || {pos}/{len} Files || formatting '{msg}'",
        ) {
            pb.set_style(style.progress_chars("█░"));
        }
        pb
    }

    pub fn no_files(&self) {
        if !self.is_quiet() {
            eprintln!("{}", "No AssemblyScript files found".yellow());
        }
    }

    /// Verbose: print the configuration of the first file and the file count
    pub fn configuration(&self, config: &FormatConfig, source: Option<&Path>, files: usize) {
        if !self.is_verbose() {
            return;
        }
        eprintln!("{}", "Configuration:".bold());
        eprintln!("  indent_size: {}", config.indent_size);
        eprintln!("  use_tabs: {}", config.use_tabs);
        eprintln!("  max_width: {}", config.max_width);
        eprintln!("  single_quote: {}", config.single_quote);
        eprintln!("  trailing_commas: {}", config.trailing_commas);
        if let Some(path) = source {
            eprintln!("  config_file: {}", display_path(path));
        }
        eprintln!("Processing {} file(s)...", files);
        eprintln!();
    }

    /// A file that could not be processed; shown at every verbosity
    pub fn file_error(&self, path: &Path, error: &dyn Display) {
        eprintln!(
            "{} {}: {}",
            "[error]".red().bold(),
            display_path(path),
            error.to_string().red()
        );
    }

    /// Verbose: per-file outcome and timing
    pub fn file_timing(&self, path: &Path, status: &str, elapsed: Duration) {
        if self.is_verbose() {
            eprintln!(
                "{} {} ({:.2}ms)",
                display_path(path),
                status.dimmed(),
                elapsed.as_secs_f64() * 1000.0
            );
        }
    }

    /// Write mode: one line per rewritten file
    pub fn formatted(&self, path: &Path) {
        if self.verbosity == Verbosity::Normal {
            eprintln!("Formatted: {}", display_path(path));
        }
    }

    /// Check mode result
    pub fn check_result(&self, unformatted: &[&Path]) {
        if self.is_quiet() {
            return;
        }
        if unformatted.is_empty() {
            eprintln!("{}", "Perfect code style!".green().bold());
            return;
        }
        eprintln!(
            "{}",
            "Code style issues found in the following files:"
                .yellow()
                .bold()
        );
        for path in unformatted {
            eprintln!("- '{}'", display_path(path));
        }
    }

    /// Totals after write or stdout mode
    pub fn summary(&self, summary: Summary, total: Duration) {
        if self.is_quiet() {
            return;
        }
        if summary.changed > 0 && self.verbosity == Verbosity::Normal {
            eprintln!("Formatted {} file(s)", summary.changed);
        }
        if self.is_verbose() {
            eprintln!();
            eprintln!(
                "Summary: {} changed, {} unchanged, {} errors",
                summary.changed.to_string().green(),
                summary.unchanged,
                if summary.errors > 0 {
                    summary.errors.to_string().red().bold()
                } else {
                    summary.errors.to_string().normal()
                }
            );
            eprintln!("Total time: {:.2}ms", total.as_secs_f64() * 1000.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_hidden_when_quiet() {
        assert!(Reporter::new(Verbosity::Quiet).progress_bar(3).is_hidden());
        assert!(Reporter::new(Verbosity::Normal)
            .with_progress(false)
            .progress_bar(3)
            .is_hidden());
        assert!(Reporter::new(Verbosity::Normal).progress_bar(0).is_hidden());
    }

    #[test]
    fn test_default_verbosity() {
        assert_eq!(Verbosity::default(), Verbosity::Normal);
        assert!(!Reporter::new(Verbosity::Normal).is_verbose());
    }
}
