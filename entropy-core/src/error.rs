//! Error types for entropy coding operations.
//!
//! This module provides a comprehensive error type covering the three error
//! kinds the coders can raise: invalid construction parameters, malformed
//! coded streams, and I/O failures from the underlying bit sink/source.

use std::io;
use thiserror::Error;

/// The main error type for entropy coding operations.
#[derive(Debug, Error)]
pub enum EntropyError {
    /// I/O error from the underlying bit sink/source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unexpected end of stream while reading bits or a header.
    #[error("unexpected end of stream: expected {expected} more bit(s)")]
    UnexpectedEof {
        /// Number of bits that were expected but not available.
        expected: u32,
    },

    /// A constructor argument was out of range or otherwise unusable.
    #[error("invalid parameter: {message}")]
    InvalidParameter {
        /// Description of the invalid parameter.
        message: String,
    },

    /// A coded stream failed validation (header, frequency, or code).
    #[error("invalid stream: {message}")]
    InvalidStream {
        /// Description of the validation failure.
        message: String,
    },

    /// The codec tag byte does not map to any known codec.
    #[error("unsupported codec tag: {tag}")]
    UnsupportedCodec {
        /// The unrecognized tag byte.
        tag: u8,
    },
}

/// Result type alias for entropy coding operations.
pub type Result<T> = std::result::Result<T, EntropyError>;

impl EntropyError {
    /// Create an unexpected-EOF error.
    pub fn unexpected_eof(expected: u32) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create an invalid-parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create an invalid-stream error.
    pub fn invalid_stream(message: impl Into<String>) -> Self {
        Self::InvalidStream {
            message: message.into(),
        }
    }

    /// Create an unsupported-codec error.
    pub fn unsupported_codec(tag: u8) -> Self {
        Self::UnsupportedCodec { tag }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EntropyError::invalid_stream("bad alphabet header");
        assert!(err.to_string().contains("bad alphabet header"));

        let err = EntropyError::unsupported_codec(42);
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        let err: EntropyError = io_err.into();
        assert!(matches!(err, EntropyError::Io(_)));
    }
}
