//! Configuration Loader
//!
//! Resolves the formatter configuration for a source file by merging every
//! layer with proper precedence.

use crate::options::FormatOptions;
use crate::{ConfigError, ConfigResult};
use asfmt_host::{FormatConfig, FormatError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the per-project configuration file
pub const PROJECT_CONFIG_FILE: &str = ".asfmt.toml";

/// Configuration loader
///
/// Merges configuration layers with proper precedence:
/// 1. Global config (`<config_dir>/asfmt/config.toml`) - lowest priority
/// 2. Nearest `.asfmt.toml`, or the file given with `--config`
/// 3. Environment variables (`ASFMT_*`)
/// 4. CLI flags - highest priority
pub struct ConfigLoader {
    /// Global config path; `None` means the platform default
    global_config_path: Option<PathBuf>,

    /// Loaded global layer
    global: Option<FormatOptions>,

    /// Loaded environment layer
    env: Option<FormatOptions>,

    /// Explicit project file replacing the upward search
    config_file: Option<PathBuf>,

    /// CLI flags
    overrides: FormatOptions,

    /// Nearest project file for each directory already visited
    project_files: HashMap<PathBuf, Option<PathBuf>>,

    /// Parsed project files
    parsed: HashMap<PathBuf, FormatOptions>,
}

/// Configuration for one file
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Effective formatter settings
    pub format: FormatConfig,

    /// Project file that contributed, if any
    pub project_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
            global: None,
            env: None,
            config_file: None,
            overrides: FormatOptions::default(),
            project_files: HashMap::new(),
            parsed: HashMap::new(),
        }
    }

    /// Read the global layer from `path` instead of the platform location
    pub fn with_global_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self.global = None;
        self
    }

    /// Use `path` for every file instead of searching for `.asfmt.toml`
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Highest-priority settings, usually from CLI flags
    pub fn with_overrides(mut self, overrides: FormatOptions) -> Self {
        self.overrides = overrides;
        self
    }

    /// Resolve the configuration for a source file
    pub fn resolve_for_file(&mut self, file: &Path) -> ConfigResult<ResolvedConfig> {
        let dir = match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        self.resolve_for_directory(dir)
    }

    /// Resolve the configuration for files in `dir`
    pub fn resolve_for_directory(&mut self, dir: &Path) -> ConfigResult<ResolvedConfig> {
        let mut options = self.global_options()?.clone();

        let project_file = match self.config_file.clone() {
            Some(path) => Some(path),
            None => self.find_project_file(dir)?,
        };
        if let Some(path) = &project_file {
            options.merge(self.project_options(path)?);
        }

        options.merge(self.env_options()?);
        options.merge(&self.overrides);

        let format = options.apply(FormatConfig::default());
        format
            .validate()
            .map_err(|e| ConfigError::ValidationError {
                origin: project_file.clone(),
                reason: match e {
                    FormatError::InvalidConfig(reason) => reason,
                    other => other.to_string(),
                },
            })?;

        Ok(ResolvedConfig {
            format,
            project_file,
        })
    }

    /// Find the nearest `.asfmt.toml` by walking up from `dir`
    fn find_project_file(&mut self, dir: &Path) -> ConfigResult<Option<PathBuf>> {
        let start = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir()?.join(dir)
        };

        let mut visited = Vec::new();
        let mut current = Some(start.as_path());
        let found = loop {
            let Some(candidate) = current else {
                break None;
            };
            if let Some(cached) = self.project_files.get(candidate) {
                break cached.clone();
            }
            visited.push(candidate.to_path_buf());

            let config_path = candidate.join(PROJECT_CONFIG_FILE);
            if config_path.is_file() {
                break Some(config_path);
            }
            current = candidate.parent();
        };

        for dir in visited {
            self.project_files.insert(dir, found.clone());
        }
        Ok(found)
    }

    fn project_options(&mut self, path: &Path) -> ConfigResult<&FormatOptions> {
        if !self.parsed.contains_key(path) {
            let options = FormatOptions::load_from_file(path)?;
            self.parsed.insert(path.to_path_buf(), options);
        }
        self.parsed
            .get(path)
            .ok_or_else(|| ConfigError::NotFound(path.to_path_buf()))
    }

    /// Load the global layer once; a missing file is an empty layer
    fn global_options(&mut self) -> ConfigResult<&FormatOptions> {
        if self.global.is_none() {
            let path = match &self.global_config_path {
                Some(path) => Some(path.clone()),
                None => Self::global_config_path(),
            };
            let options = match path {
                Some(path) if path.exists() => FormatOptions::load_from_file(&path)?,
                _ => FormatOptions::default(),
            };
            self.global = Some(options);
        }
        Ok(self.global.get_or_insert_with(FormatOptions::default))
    }

    fn env_options(&mut self) -> ConfigResult<&FormatOptions> {
        if self.env.is_none() {
            self.env = Some(FormatOptions::from_env()?);
        }
        Ok(self.env.get_or_insert_with(FormatOptions::default))
    }

    /// Platform global config file (`<config_dir>/asfmt/config.toml`)
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("asfmt").join("config.toml"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(PROJECT_CONFIG_FILE);
        fs::write(&config_path, content).unwrap();
        config_path
    }

    fn isolated_loader(temp: &TempDir) -> ConfigLoader {
        ConfigLoader::new().with_global_config_path(temp.path().join("no-global.toml"))
    }

    #[test]
    #[serial]
    fn test_find_config_in_parent() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config_file(temp_dir.path(), "indent_size = 4\n");
        let sub_dir = temp_dir.path().join("assembly").join("util");
        fs::create_dir_all(&sub_dir).unwrap();

        let mut loader = isolated_loader(&temp_dir);
        let resolved = loader.resolve_for_file(&sub_dir.join("math.ts")).unwrap();

        assert_eq!(resolved.format.indent_size, 4);
        assert_eq!(resolved.project_file, Some(config_path.clone()));
        assert_eq!(
            loader.project_files.get(&sub_dir),
            Some(&Some(config_path))
        );
    }

    #[test]
    #[serial]
    fn test_nearest_config_wins() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(temp_dir.path(), "indent_size = 4\nsingle_quote = true\n");
        let inner = temp_dir.path().join("inner");
        fs::create_dir(&inner).unwrap();
        create_config_file(&inner, "indent_size = 8\n");

        let mut loader = isolated_loader(&temp_dir);
        let outer = loader.resolve_for_directory(temp_dir.path()).unwrap();
        let nested = loader.resolve_for_directory(&inner).unwrap();

        assert_eq!(outer.format.indent_size, 4);
        assert_eq!(nested.format.indent_size, 8);
        // The nearest file replaces outer files entirely
        assert!(!nested.format.single_quote);
    }

    #[test]
    #[serial]
    fn test_cached_directory_is_not_reread() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config_file(temp_dir.path(), "max_width = 100\n");

        let mut loader = isolated_loader(&temp_dir);
        let first = loader.resolve_for_directory(temp_dir.path()).unwrap();
        fs::write(&config_path, "max_width = 120\n").unwrap();
        let second = loader.resolve_for_directory(temp_dir.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    #[serial]
    fn test_invalid_merged_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config_file(temp_dir.path(), "indent_size = 0\n");

        let mut loader = isolated_loader(&temp_dir);
        let err = loader.resolve_for_directory(temp_dir.path()).unwrap_err();

        match err {
            ConfigError::ValidationError { origin, reason } => {
                assert_eq!(origin, Some(config_path));
                assert!(reason.contains("indent_size"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
