use thiserror::Error;

/// Storage-specific error types.
///
/// Record-level problems (a malformed line, an out-of-range position) are
/// skipped during load and surface only as diagnostics; the variants here are
/// the file-level failures that callers must handle.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A single record failed to parse. Used internally by the line parsers;
    /// loaders catch it, log it, and skip the line.
    #[error("Invalid record '{line}': {message}")]
    InvalidRecord { line: String, message: String },
}

impl StorageError {
    /// Create a new invalid-record error.
    pub fn invalid_record(line: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            line: line.into(),
            message: message.into(),
        }
    }
}

/// Specialized result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
