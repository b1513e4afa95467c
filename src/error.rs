//! Centralized error types for chatcell.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the chatcell library.
#[derive(Error, Debug)]
pub enum ChatCellError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified conversation file does not exist.
    #[error("Conversation file not found: {0}")]
    FileNotFound(PathBuf),

    /// The conversation file could not be decoded.
    #[error("Invalid conversation file '{path}': {reason}")]
    InvalidConversation { path: PathBuf, reason: String },

    /// An attachment descriptor was rejected at construction time.
    #[error("Invalid attachment: {0}")]
    InvalidAttachment(String),

    /// A timestamp could not be interpreted.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Convenience alias for `Result<T, ChatCellError>`.
pub type Result<T> = std::result::Result<T, ChatCellError>;

impl ChatCellError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
