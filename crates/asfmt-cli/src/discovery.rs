//! Source discovery - expand CLI inputs into AssemblyScript files

use anyhow::{bail, Context, Result};
use ignore::gitignore::GitignoreBuilder;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Per-directory ignore file, gitignore syntax
pub const IGNORE_FILE: &str = ".asfmtignore";

const SOURCE_EXTENSION: &str = "ts";
const ALWAYS_SKIPPED: &[&str] = &["node_modules"];

/// Expand inputs into a sorted, de-duplicated list of files
///
/// - Existing files are taken as given
/// - Directories are walked recursively for `*.ts` files
/// - Anything else containing `*`, `?` or `[` is matched as a glob below
///   its literal directory prefix, which must exist
pub fn collect_files(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            files.push(path.to_path_buf());
        } else if path.is_dir() {
            files.extend(walk(path, None)?);
        } else if is_glob(input) {
            let (base, pattern) = split_glob(input);
            if !base.is_dir() {
                bail!("No such directory: {}", display_path(&base));
            }
            files.extend(walk(&base, Some(&pattern))?);
        } else {
            bail!("No such file or directory: {}", input);
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn walk(root: &Path, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .add_custom_ignore_filename(IGNORE_FILE)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| ALWAYS_SKIPPED.contains(&name)))
        });

    let matcher = match pattern {
        Some(pattern) => {
            let mut glob = GitignoreBuilder::new(root);
            glob.add_line(None, pattern)
                .with_context(|| format!("Invalid glob pattern: {}", pattern))?;
            Some(glob.build()?)
        }
        None => None,
    };

    Ok(builder
        .build()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION))
        .filter(|path| {
            matcher
                .as_ref()
                .map_or(true, |glob| glob.matched(path, false).is_ignore())
        })
        .collect())
}

fn is_glob(input: &str) -> bool {
    // gitignore patterns have no brace expansion
    input.chars().any(|c| matches!(c, '*' | '?' | '['))
}

/// Split a glob into the literal directory prefix and the rest,
/// anchored at that directory
fn split_glob(input: &str) -> (PathBuf, String) {
    let mut base = if input.starts_with('/') {
        PathBuf::from("/")
    } else {
        PathBuf::new()
    };
    let mut rest = Vec::new();
    for part in input.split('/').filter(|p| !p.is_empty()) {
        if rest.is_empty() && !is_glob(part) {
            base.push(part);
        } else {
            rest.push(part);
        }
    }
    if base.as_os_str().is_empty() {
        base.push(".");
    }
    (base, format!("/{}", rest.join("/")))
}

/// Path as shown to the user, without a leading `./`
pub fn display_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    s.strip_prefix("./").unwrap_or(&s).to_owned()
}
