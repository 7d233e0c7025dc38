//! CLI command implementations

pub mod fmt;
