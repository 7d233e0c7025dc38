//! asfmt Configuration System
//!
//! Resolves the [`FormatConfig`] used for each source file.
//!
//! # Configuration Hierarchy
//!
//! Settings are merged in the following order (later overrides earlier):
//! 1. Global config (`<config_dir>/asfmt/config.toml`)
//! 2. Nearest `.asfmt.toml`, searched upward from the file's directory
//! 3. Environment variables (`ASFMT_*`)
//! 4. CLI flags
//!
//! # Example
//!
//! ```no_run
//! use asfmt_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let resolved = loader.resolve_for_file(Path::new("assembly/index.ts")).unwrap();
//! println!("indent: {}", resolved.format.indent_size);
//! ```

pub mod loader;
pub mod options;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid configuration{}: {reason}", describe_origin(.origin))]
    ValidationError {
        origin: Option<PathBuf>,
        reason: String,
    },
}

fn describe_origin(origin: &Option<PathBuf>) -> String {
    match origin {
        Some(path) => format!(" in {}", path.display()),
        None => String::new(),
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use asfmt_host::FormatConfig;
pub use loader::{ConfigLoader, ResolvedConfig, PROJECT_CONFIG_FILE};
pub use options::FormatOptions;
