//! Error types for the Kyozai library.
//!
//! All fallible operations in this crate return [`Result`], with
//! [`KyozaiError`] as the single error type. "Nothing matched" conditions are
//! never errors; they are signalled with `Option` at the API surface, and
//! errors are reserved for true failures such as unreadable storage,
//! malformed persisted data, or embedding-service failures outside the
//! degrade path.

use std::io;

use thiserror::Error;

/// The main error type for Kyozai operations.
#[derive(Error, Debug)]
pub enum KyozaiError {
    /// I/O errors (file operations, store access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Analysis-related errors (tokenization, invalid tokenizer parameters)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Index-related errors
    #[error("Index error: {0}")]
    Index(String),

    /// Vector-store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Embedding-service errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Serialization/deserialization of persisted data
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Generic anyhow error from external collaborators
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`KyozaiError`].
pub type Result<T> = std::result::Result<T, KyozaiError>;

impl KyozaiError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        KyozaiError::Analysis(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        KyozaiError::Index(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        KyozaiError::Storage(msg.into())
    }

    /// Create a new embedding error.
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        KyozaiError::Embedding(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        KyozaiError::SerializationError(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        KyozaiError::InvalidArgument(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KyozaiError::analysis("bad tokenizer");
        assert_eq!(err.to_string(), "Analysis error: bad tokenizer");

        let err = KyozaiError::storage("store unreachable");
        assert_eq!(err.to_string(), "Storage error: store unreachable");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: KyozaiError = io_err.into();
        assert!(matches!(err, KyozaiError::Io(_)));
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: KyozaiError = anyhow::anyhow!("external failure").into();
        assert!(matches!(err, KyozaiError::Anyhow(_)));
    }
}
