//! Error types for LED link operations.

/// Result type alias for LED link operations.
pub type Result<T> = std::result::Result<T, LedError>;

/// Errors that can occur while talking to the LED strip.
#[derive(Debug, thiserror::Error)]
pub enum LedError {
    /// The serial port could not be opened.
    #[error("Could not open LED link on {port}: {message}")]
    OpenFailed { port: String, message: String },

    /// Writing a command frame to the link failed.
    #[error("LED link write failed: {message}")]
    WriteFailed { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedError {
    /// Create a new open-failed error.
    pub fn open_failed(port: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OpenFailed {
            port: port.into(),
            message: message.into(),
        }
    }

    /// Create a new write-failed error.
    pub fn write_failed(message: impl Into<String>) -> Self {
        Self::WriteFailed {
            message: message.into(),
        }
    }
}
