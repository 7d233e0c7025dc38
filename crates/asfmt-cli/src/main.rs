use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod discovery;
mod reporter;

use reporter::Verbosity;

/// Opinionated formatter for AssemblyScript.
///
/// Formats AssemblyScript sources, keeping decorators such as `@inline`,
/// `@global` or `@lazy` exactly where they were written.
///
/// EXAMPLES:
///     asfmt assembly/index.ts          Print the formatted file
///     asfmt assembly --write           Format every .ts file in place
///     asfmt "assembly/**/*.ts" --check Check formatting in CI
///
/// ENVIRONMENT VARIABLES:
///     ASFMT_INDENT_SIZE, ASFMT_MAX_WIDTH, ASFMT_USE_TABS,
///     ASFMT_SINGLE_QUOTE, ASFMT_TRAILING_COMMAS   Formatting options
///     ASFMT_NO_PROGRESS  Set to '1' to hide the progress bar
///     NO_COLOR           Set to disable colored output
#[derive(Parser, Debug)]
#[command(name = "asfmt")]
#[command(version)]
struct Cli {
    /// Files, directories or glob patterns to format
    #[arg(required = true, value_name = "INPUT")]
    inputs: Vec<String>,
    /// Edit files in place
    #[arg(long, short = 'w', conflicts_with = "check")]
    write: bool,
    /// Check if the given files are formatted
    #[arg(long, short = 'c')]
    check: bool,
    /// Configuration file used instead of the nearest .asfmt.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Indentation size in spaces (default: 2)
    #[arg(long)]
    indent_size: Option<usize>,
    /// Maximum line width (default: 80)
    #[arg(long)]
    max_width: Option<usize>,
    /// Enable or disable indenting with tabs
    #[arg(long, value_name = "BOOL")]
    use_tabs: Option<bool>,
    /// Enable or disable single quotes
    #[arg(long, value_name = "BOOL")]
    single_quote: Option<bool>,
    /// Enable or disable trailing commas
    #[arg(long, value_name = "BOOL")]
    trailing_commas: Option<bool>,
    /// Verbose output with configuration and timing information
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    verbose: bool,
    /// Suppress non-error output
    #[arg(long, short = 'q')]
    quiet: bool,
    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    no_color: bool,
    /// Hide the progress bar
    #[arg(long, env = "ASFMT_NO_PROGRESS")]
    no_progress: bool,
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    fn mode(&self) -> commands::fmt::Mode {
        if self.check {
            commands::fmt::Mode::Check
        } else if self.write {
            commands::fmt::Mode::Write
        } else {
            commands::fmt::Mode::Stdout
        }
    }

    fn into_args(self) -> commands::fmt::FmtArgs {
        commands::fmt::FmtArgs {
            mode: self.mode(),
            verbosity: self.verbosity(),
            progress: !self.no_progress,
            config_path: self.config,
            overrides: asfmt_config::FormatOptions {
                indent_size: self.indent_size,
                use_tabs: self.use_tabs,
                max_width: self.max_width,
                single_quote: self.single_quote,
                trailing_commas: self.trailing_commas,
            },
            inputs: self.inputs,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    match commands::fmt::run(cli.into_args()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::from(commands::fmt::EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_mode_is_stdout() {
        let cli = Cli::parse_from(["asfmt", "index.ts"]);
        assert_eq!(cli.mode(), commands::fmt::Mode::Stdout);
        assert_eq!(cli.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from(["asfmt", "-c", "-q", "assembly"]);
        assert_eq!(cli.mode(), commands::fmt::Mode::Check);
        assert_eq!(cli.verbosity(), Verbosity::Quiet);

        let cli = Cli::parse_from(["asfmt", "-w", "-v", "a.ts", "b.ts"]);
        assert_eq!(cli.mode(), commands::fmt::Mode::Write);
        assert_eq!(cli.verbosity(), Verbosity::Verbose);
        assert_eq!(cli.inputs, vec!["a.ts", "b.ts"]);
    }

    #[test]
    fn test_write_conflicts_with_check() {
        assert!(Cli::try_parse_from(["asfmt", "-w", "-c", "a.ts"]).is_err());
    }

    #[test]
    fn test_input_required() {
        assert!(Cli::try_parse_from(["asfmt"]).is_err());
    }

    #[test]
    fn test_overrides_only_set_flags() {
        let args = Cli::parse_from([
            "asfmt",
            "--indent-size",
            "4",
            "--single-quote",
            "true",
            "--trailing-commas",
            "false",
            "a.ts",
        ])
        .into_args();
        assert_eq!(args.overrides.indent_size, Some(4));
        assert_eq!(args.overrides.single_quote, Some(true));
        assert_eq!(args.overrides.trailing_commas, Some(false));
        assert_eq!(args.overrides.use_tabs, None);
        assert_eq!(args.overrides.max_width, None);
    }

    #[test]
    fn test_boolean_flags_can_disable() {
        let args = Cli::parse_from([
            "asfmt",
            "--use-tabs",
            "false",
            "--single-quote",
            "false",
            "a.ts",
        ])
        .into_args();
        assert_eq!(args.overrides.use_tabs, Some(false));
        assert_eq!(args.overrides.single_quote, Some(false));

        assert!(Cli::try_parse_from(["asfmt", "--use-tabs", "sometimes", "a.ts"]).is_err());
    }
}
