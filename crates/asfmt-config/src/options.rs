//! Partial formatter settings
//!
//! Every configuration layer (global file, project file, environment, CLI)
//! produces a [`FormatOptions`] where unset fields defer to the layer below.

use crate::{ConfigError, ConfigResult};
use asfmt_host::FormatConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Formatter settings from one configuration layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct FormatOptions {
    /// Spaces per indentation level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_size: Option<usize>,

    /// Indent with tabs instead of spaces
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_tabs: Option<bool>,

    /// Maximum line width before lists break
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<usize>,

    /// Prefer single-quoted strings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_quote: Option<bool>,

    /// Trailing commas in broken lists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_commas: Option<bool>,
}

impl FormatOptions {
    /// Load options from a TOML file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })
    }

    /// Options from the `ASFMT_*` environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Options from `ASFMT_*` variables supplied by `lookup`
    ///
    /// Example: `ASFMT_INDENT_SIZE=4`, `ASFMT_SINGLE_QUOTE=true`
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            indent_size: lookup("ASFMT_INDENT_SIZE")
                .map(|v| parse_usize("ASFMT_INDENT_SIZE", &v))
                .transpose()?,
            use_tabs: lookup("ASFMT_USE_TABS")
                .map(|v| parse_bool("ASFMT_USE_TABS", &v))
                .transpose()?,
            max_width: lookup("ASFMT_MAX_WIDTH")
                .map(|v| parse_usize("ASFMT_MAX_WIDTH", &v))
                .transpose()?,
            single_quote: lookup("ASFMT_SINGLE_QUOTE")
                .map(|v| parse_bool("ASFMT_SINGLE_QUOTE", &v))
                .transpose()?,
            trailing_commas: lookup("ASFMT_TRAILING_COMMAS")
                .map(|v| parse_bool("ASFMT_TRAILING_COMMAS", &v))
                .transpose()?,
        })
    }

    /// Merge another layer into this one
    /// Other options take precedence for set values
    pub fn merge(&mut self, other: &FormatOptions) {
        if other.indent_size.is_some() {
            self.indent_size = other.indent_size;
        }
        if other.use_tabs.is_some() {
            self.use_tabs = other.use_tabs;
        }
        if other.max_width.is_some() {
            self.max_width = other.max_width;
        }
        if other.single_quote.is_some() {
            self.single_quote = other.single_quote;
        }
        if other.trailing_commas.is_some() {
            self.trailing_commas = other.trailing_commas;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply set values on top of `base`
    pub fn apply(&self, base: FormatConfig) -> FormatConfig {
        let mut config = base;
        if let Some(size) = self.indent_size {
            config = config.with_indent_size(size);
        }
        if let Some(tabs) = self.use_tabs {
            config = config.with_use_tabs(tabs);
        }
        if let Some(width) = self.max_width {
            config = config.with_max_width(width);
        }
        if let Some(single) = self.single_quote {
            config = config.with_single_quote(single);
        }
        if let Some(commas) = self.trailing_commas {
            config = config.with_trailing_commas(commas);
        }
        config
    }
}

fn parse_usize(field: &str, value: &str) -> ConfigResult<usize> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: format!("expected a non-negative integer, got '{}'", value),
    })
}

fn parse_bool(field: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected true or false, got '{}'", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_partial_options() {
        let options: FormatOptions = toml::from_str("indent_size = 4\n").unwrap();
        assert_eq!(options.indent_size, Some(4));
        assert_eq!(options.use_tabs, None);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<FormatOptions, _> = toml::from_str("indent = 4\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_env_lookup() {
        let options = FormatOptions::from_lookup(lookup(&[
            ("ASFMT_MAX_WIDTH", "100"),
            ("ASFMT_SINGLE_QUOTE", "yes"),
            ("ASFMT_TRAILING_COMMAS", "0"),
        ]))
        .unwrap();
        assert_eq!(
            options,
            FormatOptions {
                max_width: Some(100),
                single_quote: Some(true),
                trailing_commas: Some(false),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_env_bad_value() {
        let err = FormatOptions::from_lookup(lookup(&[("ASFMT_USE_TABS", "sometimes")]))
            .unwrap_err();
        assert!(err.to_string().contains("ASFMT_USE_TABS"));

        let err = FormatOptions::from_lookup(lookup(&[("ASFMT_INDENT_SIZE", "-2")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = FormatOptions {
            indent_size: Some(2),
            use_tabs: Some(true),
            ..Default::default()
        };
        base.merge(&FormatOptions {
            indent_size: Some(8),
            ..Default::default()
        });
        assert_eq!(base.indent_size, Some(8));
        assert_eq!(base.use_tabs, Some(true));
    }

    #[test]
    fn test_apply_keeps_unset_fields() {
        let config = FormatOptions {
            single_quote: Some(true),
            ..Default::default()
        }
        .apply(FormatConfig::default());
        assert_eq!(config, FormatConfig::default().with_single_quote(true));
        assert!(FormatOptions::default().is_empty());
    }
}
