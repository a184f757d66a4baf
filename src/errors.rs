//! Error handling for the spudlog pipeline
//!
//! Producers never see these errors: a failed `log()` call degrades to a
//! dropped event. They surface on the consumer side (decoding, sink I/O),
//! from configuration loading, and from the reader used by `spud dump`.

use thiserror::Error;

/// Main error type for the logging pipeline
#[derive(Error, Debug)]
pub enum LogError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O operation failed: {operation} - {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode log event: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("Failed to decode log event: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("Truncated frame: expected {expected} bytes, {available} available")]
    TruncatedFrame { expected: usize, available: usize },

    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("A consumer is already attached to this session")]
    ConsumerTaken,

    #[error("Session is closed")]
    SessionClosed,

    #[error("Invalid severity: {value}")]
    InvalidSeverity { value: String },
}

/// Type alias for Result with LogError
pub type LogResult<T> = Result<T, LogError>;

impl LogError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create an invalid severity error
    pub fn invalid_severity(value: impl Into<String>) -> Self {
        Self::InvalidSeverity {
            value: value.into(),
        }
    }

    /// True for errors caused by malformed bytes rather than the environment
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            LogError::Decode(_) | LogError::TruncatedFrame { .. } | LogError::FrameTooLarge { .. }
        )
    }
}

impl From<figment::Error> for LogError {
    fn from(err: figment::Error) -> Self {
        LogError::config(err.to_string())
    }
}
