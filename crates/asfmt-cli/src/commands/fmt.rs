//! asfmt formatting command

use anyhow::{Context, Result};
use asfmt_config::{ConfigLoader, FormatOptions, ResolvedConfig};
use asfmt_formatter::Pipeline;
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use crate::discovery::{collect_files, display_path};
use crate::reporter::{Reporter, Summary, Verbosity};

/// Exit status when `--check` finds unformatted files
pub const EXIT_UNFORMATTED: u8 = 1;
/// Exit status when any file could not be processed
pub const EXIT_ERROR: u8 = 2;

/// What to do with formatted output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Print formatted sources to stdout
    Stdout,
    /// Rewrite changed files in place
    Write,
    /// Report files that are not formatted
    Check,
}

/// Arguments for the fmt command
pub struct FmtArgs {
    pub inputs: Vec<String>,
    pub mode: Mode,
    pub config_path: Option<PathBuf>,
    pub overrides: FormatOptions,
    pub verbosity: Verbosity,
    pub progress: bool,
}

/// Result of processing one file
struct FileReport {
    path: PathBuf,
    outcome: Result<Formatted>,
    elapsed: Duration,
}

#[derive(Debug)]
struct Formatted {
    output: String,
    changed: bool,
}

/// Run the fmt command
pub fn run(args: FmtArgs) -> Result<ExitCode> {
    let start_time = Instant::now();
    let reporter = Reporter::new(args.verbosity).with_progress(args.progress);

    let files = collect_files(&args.inputs)?;
    if files.is_empty() {
        reporter.no_files();
        return Ok(ExitCode::SUCCESS);
    }

    let mut loader = ConfigLoader::new().with_overrides(args.overrides);
    if let Some(path) = &args.config_path {
        loader = loader.with_config_file(path);
    }
    let configs = files
        .iter()
        .map(|file| {
            loader.resolve_for_file(file).with_context(|| {
                format!("Failed to resolve configuration for {}", display_path(file))
            })
        })
        .collect::<Result<Vec<ResolvedConfig>>>()?;

    if let Some(first) = configs.first() {
        reporter.configuration(&first.format, first.project_file.as_deref(), files.len());
    }

    let progress = match args.mode {
        Mode::Stdout => reporter.progress_bar(0),
        Mode::Write | Mode::Check => reporter.progress_bar(files.len()),
    };
    let reports: Vec<FileReport> = files
        .par_iter()
        .zip(configs.par_iter())
        .map(|(path, resolved)| {
            let file_start = Instant::now();
            let outcome = process_file(path, resolved, args.mode);
            progress.set_message(display_path(path));
            progress.inc(1);
            FileReport {
                path: path.clone(),
                outcome,
                elapsed: file_start.elapsed(),
            }
        })
        .collect();
    progress.finish_and_clear();

    let mut summary = Summary::default();
    let mut unformatted = Vec::new();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for report in &reports {
        match &report.outcome {
            Ok(formatted) => {
                if formatted.changed {
                    summary.changed += 1;
                } else {
                    summary.unchanged += 1;
                }
                let status = match (args.mode, formatted.changed) {
                    (Mode::Check, true) => "would reformat",
                    (Mode::Write, true) => "formatted",
                    (Mode::Stdout, true) => "changed",
                    (_, false) => "unchanged",
                };
                reporter.file_timing(&report.path, status, report.elapsed);

                match args.mode {
                    Mode::Stdout => {
                        out.write_all(formatted.output.as_bytes())
                            .context("Failed to write to stdout")?;
                    }
                    Mode::Write if formatted.changed => reporter.formatted(&report.path),
                    Mode::Check if formatted.changed => unformatted.push(report.path.as_path()),
                    _ => {}
                }
            }
            Err(e) => {
                summary.errors += 1;
                reporter.file_error(&report.path, &format!("{:#}", e));
            }
        }
    }
    out.flush().context("Failed to write to stdout")?;

    if args.mode == Mode::Check {
        reporter.check_result(&unformatted);
    } else {
        reporter.summary(summary, start_time.elapsed());
    }

    Ok(if summary.errors > 0 {
        ExitCode::from(EXIT_ERROR)
    } else if !unformatted.is_empty() {
        ExitCode::from(EXIT_UNFORMATTED)
    } else {
        ExitCode::SUCCESS
    })
}

/// Format one file, rewriting it in write mode when it changed
fn process_file(path: &Path, resolved: &ResolvedConfig, mode: Mode) -> Result<Formatted> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", display_path(path)))?;

    let output = Pipeline::new(resolved.format.clone()).transform(&source)?;
    let changed = output != source;

    if mode == Mode::Write && changed {
        std::fs::write(path, &output)
            .with_context(|| format!("Failed to write {}", display_path(path)))?;
    }

    Ok(Formatted { output, changed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use asfmt_formatter::FormatConfig;
    use std::fs;
    use tempfile::TempDir;

    fn resolved() -> ResolvedConfig {
        ResolvedConfig {
            format: FormatConfig::default(),
            project_file: None,
        }
    }

    #[test]
    fn test_process_file_write_only_when_changed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.ts");
        fs::write(&path, "@inline function f(): void {}\n").unwrap();

        let formatted = process_file(&path, &resolved(), Mode::Write).unwrap();
        assert!(!formatted.changed);

        fs::write(&path, "@inline function f():void{}").unwrap();
        let formatted = process_file(&path, &resolved(), Mode::Write).unwrap();
        assert!(formatted.changed);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "@inline function f(): void {}\n"
        );
    }

    #[test]
    fn test_process_file_check_leaves_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.ts");
        fs::write(&path, "let x=1").unwrap();

        let formatted = process_file(&path, &resolved(), Mode::Check).unwrap();

        assert!(formatted.changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), "let x=1");
    }

    #[test]
    fn test_process_file_reports_syntax_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.ts");
        fs::write(&path, "@lazy\nlet x = ;").unwrap();

        let err = process_file(&path, &resolved(), Mode::Stdout).unwrap_err();

        assert!(err.to_string().contains("2:9"));
    }
}
