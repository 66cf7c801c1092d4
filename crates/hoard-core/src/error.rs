//! Error types for hoard.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Request validation errors
    #[error("Path validation failed: {0}")]
    PathValidation(String),

    #[error("Key validation failed: {0}")]
    KeyValidation(String),

    // Cache directory errors
    #[error("Ownership change exited with code {exit_code}: {message}")]
    Permission { exit_code: i32, message: String },

    // Archive errors
    #[error("Archive codec error: {0}")]
    Codec(String),

    // Infrastructure errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    // Generic
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the error was caused by an invalid request rather than by I/O.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::PathValidation(_) | Error::KeyValidation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
