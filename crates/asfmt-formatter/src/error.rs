//! Transformation error types

use asfmt_host::{FormatError, Span};
use thiserror::Error;

pub type TransformResult<T = String> = Result<T, TransformError>;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("could not derive a sentinel absent from the source after {attempts} attempts")]
    SentinelCollision { attempts: u32 },

    #[error("decorator at {}..{} contains '*/' and cannot be carried in a comment: {text}", .span.start, .span.end)]
    UnencodableDecorator { span: Span, text: String },

    #[error("sentinel left in formatted output at offset {offset}")]
    SentinelLeak { offset: usize },

    #[error(transparent)]
    Host(FormatError),
}

impl TransformError {
    /// Whether the host rejected the input itself (syntax or configuration)
    pub fn is_host_error(&self) -> bool {
        matches!(self, TransformError::Host(_))
    }
}

impl From<FormatError> for TransformError {
    /// Unwraps our own errors that travelled through the host as plugin errors
    fn from(error: FormatError) -> Self {
        match error {
            FormatError::Plugin(inner) => match inner.downcast::<TransformError>() {
                Ok(transform) => *transform,
                Err(other) => TransformError::Host(FormatError::Plugin(other)),
            },
            other => TransformError::Host(other),
        }
    }
}

impl From<TransformError> for FormatError {
    fn from(error: TransformError) -> Self {
        match error {
            TransformError::Host(host) => host,
            other => FormatError::Plugin(Box::new(other)),
        }
    }
}
