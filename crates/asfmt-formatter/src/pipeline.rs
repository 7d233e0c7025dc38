//! Per-file round trip: locate, encode, host format, decode

use std::sync::OnceLock;

use asfmt_host::{FormatConfig, Formatter, Plugin};
use rayon::prelude::*;

use crate::error::{TransformError, TransformResult};
use crate::marker::{decode, Marker};
use crate::plugin::decorator_plugin;

/// Decorator plugin over the strict host, built once per process
fn default_plugin() -> &'static Plugin {
    static PLUGIN: OnceLock<Plugin> = OnceLock::new();
    PLUGIN.get_or_init(|| decorator_plugin(&Plugin::strict()))
}

/// Formatter for superset sources with a fixed configuration
#[derive(Debug, Clone)]
pub struct Pipeline {
    formatter: Formatter,
}

impl Pipeline {
    pub fn new(config: FormatConfig) -> Self {
        Self {
            formatter: Formatter::new(config).with_plugin(default_plugin().clone()),
        }
    }

    /// Pipeline over a custom host parser and printer
    pub fn with_host(config: FormatConfig, host: &Plugin) -> Self {
        Self {
            formatter: Formatter::new(config).with_plugin(decorator_plugin(host)),
        }
    }

    pub fn config(&self) -> &FormatConfig {
        self.formatter.config()
    }

    /// Format `source`, keeping every decorator where it was written
    pub fn transform(&self, source: &str) -> TransformResult {
        let formatted = self.formatter.format(source)?;

        // The marker is a pure function of the source, so it can be
        // rebuilt here to check the printer removed every sentinel
        let Ok(marker) = Marker::for_source(source) else {
            return Ok(formatted);
        };
        let output = decode(&formatted, &marker);
        if let Some(offset) = marker.find_in(&output) {
            return Err(TransformError::SentinelLeak { offset });
        }
        Ok(output)
    }

    /// Whether `source` is already formatted
    pub fn check_formatted(&self, source: &str) -> TransformResult<bool> {
        Ok(self.transform(source)? == source)
    }

    /// Format many sources in parallel; each result is independent
    pub fn transform_batch<S>(&self, sources: &[S]) -> Vec<TransformResult>
    where
        S: AsRef<str> + Sync,
    {
        sources
            .par_iter()
            .map(|source| self.transform(source.as_ref()))
            .collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(FormatConfig::default())
    }
}

/// Format a superset source
pub fn transform(source: &str, config: &FormatConfig) -> TransformResult {
    Pipeline::new(config.clone()).transform(source)
}

/// Whether `transform(source, config)` would leave `source` unchanged
pub fn check_formatted(source: &str, config: &FormatConfig) -> TransformResult<bool> {
    Pipeline::new(config.clone()).check_formatted(source)
}
