//! Error types for text encoding.

use thiserror::Error;

/// Errors that can occur while encoding a value to PostgreSQL text format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The value does not support the coercion an encoder requires.
    #[error("cannot encode {got} value as {wanted}")]
    Coerce {
        wanted: &'static str,
        got: &'static str,
    },

    /// An array or identifier encoder received a value of the wrong shape.
    #[error("expected an array value, got {0}")]
    ExpectedArray(&'static str),

    /// Array nesting exceeded the supported depth.
    #[error("array nesting deeper than {limit} levels")]
    TooDeep { limit: usize },

    /// Internal two-phase contract violation. Always an engine bug, never
    /// caused by input data.
    #[error("encoder contract violation: {0}")]
    Contract(&'static str),
}

impl EncodeError {
    /// Create a coercion error for the given target type.
    pub(crate) fn coerce(wanted: &'static str, got: &'static str) -> Self {
        Self::Coerce { wanted, got }
    }
}

/// Result type alias for encode operations.
pub type EncodeResult<T> = Result<T, EncodeError>;
