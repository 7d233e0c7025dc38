//! asfmt decorator-preserving formatter
//!
//! Formats AssemblyScript sources with the strict host formatter while
//! keeping decorators in positions the host grammar rejects. Decorators are
//! located with a superset parser, hidden in marker comments for the host
//! parse, and printed back verbatim by a comment printer override.

pub mod error;
pub mod locator;
pub mod marker;
mod pipeline;
pub mod plugin;
pub mod superset;

pub use error::{TransformError, TransformResult};
pub use locator::{locate, DecoratorRange};
pub use marker::{decode, encode, EncodedSource, Marker};
pub use pipeline::{check_formatted, transform, Pipeline};
pub use plugin::{decorator_plugin, DecoratorParser, MarkerPrinter};

pub use asfmt_host::{FormatConfig, FormatError};
